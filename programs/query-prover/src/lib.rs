//! State-query bridge adapter for the Span Routes protocol.
//!
//! Where the Hyperlane adapter pushes fulfillment notifications from the
//! destination chain, this adapter pulls: it asks a query router for a
//! verified read of a remote portal's fulfillment records and writes proof
//! records here once the attested result comes back. Useful when the
//! destination chain has no messaging lane toward this one, or when a
//! fulfillment notification was missed and needs to be recovered.
//!
//! Proof records land at `[b"proof", intent_hash]` under this program, the
//! same shape every adapter produces, so the portal's settlement path is
//! indifferent to which adapter proved an intent.

use anchor_lang::prelude::*;
use span_svm_std::prover;

declare_id!("2KutYVSgraxo9nQesLiTNG38fyXZPjfUaCHCxofSmu4c");

pub mod instructions;
pub mod reader;
pub mod state;

use instructions::*;

#[program]
pub mod query_prover {
    use super::*;

    /// One-time setup: fee schedule, fee collector, and the remote portals
    /// whose records this adapter will accept reads of.
    pub fn init(ctx: Context<Init>, args: InitArgs) -> Result<()> {
        instructions::init(ctx, args)
    }

    /// Requests a verified read of a remote portal's fulfillment records.
    /// Permissionless; the caller pays the query fee.
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

    /// Router callback delivering an attested query result. Writes one
    /// proof record per reported pair; callable only by the router's
    /// process authority.
    #[instruction(discriminator = &reader::RESOLVE_DISCRIMINATOR)]
    pub fn resolve<'info>(
        ctx: Context<'_, '_, '_, 'info, Resolve<'info>>,
        target: [u8; 32],
        result: Vec<u8>,
    ) -> Result<()> {
        instructions::resolve(ctx, target, result)
    }
}
