//! Hyperlane bridge adapter for the Span Routes protocol.
//!
//! Fulfillment notifications produced on remote chains reach this chain as
//! Hyperlane messages; fulfillments recorded here are relayed out the same
//! way. The adapter exposes the uniform prover surface (`prove`,
//! `fetch_fee`, `challenge`) to the portal and implements Hyperlane's
//! recipient interface (`handle`, `ism` and their account-metas queries)
//! toward the mailbox.
//!
//! Proof records live at `[b"proof", intent_hash]` under this program and
//! are what the portal's settlement path reads. Inbound messages are only
//! accepted from whitelisted remote senders, via the mailbox's process
//! authority, and pay their own record rent from a program-owned payer PDA.

use anchor_lang::prelude::*;
use span_svm_std::prover;

declare_id!("Bdd9H1vff8w4guoAvZdDLr54rmYP6GoA9yP7PifHXyTU");

pub mod hyperlane;
pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod hyper_prover {
    use super::*;

    /// One-time setup: fee schedule, fee collector, and the remote senders
    /// whose messages `handle` will accept.
    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Whitelists another remote sender; only the config owner may call
    /// this.
    pub fn add_sender(ctx: Context<AddSender>, args: AddSenderArgs) -> Result<()> {
        instructions::add_sender(ctx, args)
    }

    /// Dispatches a batch of fulfillment pairs to the source chain via the
    /// Hyperlane mailbox. Only the portal's dispatcher may call this.
    pub fn prove(ctx: Context<Prove>, args: prover::ProveArgs) -> Result<()> {
        prove_intent(ctx, args)
    }

    /// Returns the fee a `prove` call with these arguments would charge.
    pub fn fetch_fee(ctx: Context<FetchFee>, args: prover::ProveArgs) -> Result<u64> {
        instructions::fetch_fee(ctx, args)
    }

    /// Clears a proof record whose destination does not match the intent it
    /// claims to prove. Permissionless; rent goes to the caller.
    pub fn challenge(ctx: Context<Challenge>, args: prover::ChallengeArgs) -> Result<()> {
        challenge_intent_proof(ctx, args)
    }

    /// Hyperlane message delivery. Writes one proof record per pair in the
    /// payload; callable only by the mailbox's process authority.
    #[instruction(discriminator = &hyperlane::HANDLE_DISCRIMINATOR)]
    pub fn handle<'info>(
        ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle(ctx, origin, sender, payload)
    }

    /// Account discovery for `handle`, queried by the relayer before
    /// delivery.
    #[instruction(discriminator = &hyperlane::HANDLE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn handle_account_metas(
        ctx: Context<HandleAccountMetas>,
        origin: u32,
        sender: [u8; 32],
        payload: Vec<u8>,
    ) -> Result<()> {
        instructions::handle_account_metas(ctx, origin, sender, payload)
    }

    /// Names the interchain security module that validates messages for
    /// this recipient.
    #[instruction(discriminator = &hyperlane::INTERCHAIN_SECURITY_MODULE_DISCRIMINATOR)]
    pub fn ism(ctx: Context<Ism>) -> Result<()> {
        instructions::ism(ctx)
    }

    /// Account discovery for `ism`.
    #[instruction(discriminator = &hyperlane::INTERCHAIN_SECURITY_MODULE_ACCOUNT_METAS_DISCRIMINATOR)]
    pub fn ism_account_metas(ctx: Context<IsmAccountMetas>) -> Result<()> {
        instructions::ism_account_metas(ctx)
    }
}
