//! Same-chain prover adapter for the Span Routes protocol.
//!
//! When an intent's source and destination are both this chain, no bridge
//! is involved: the portal's dispatcher hands the fulfillment pairs straight
//! to this program, which writes the proof records the settlement path
//! reads. Relaying is free, so `fetch_fee` always quotes zero.

use anchor_lang::prelude::*;
use span_svm_std::prover;

declare_id!("GQ7xobzQi9YzV8emyFCYgGvhgCK84VwZet59uGH3RxX8");

pub mod instructions;
pub mod state;

use instructions::*;

#[program]
pub mod local_prover {
    use super::*;

    /// Records fulfillment pairs directly, one proof record per pair. Only
    /// accepted from the portal's dispatcher, and only for intents whose
    /// source chain is this chain.
    pub fn prove<'info>(
        ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
        args: prover::ProveArgs,
    ) -> Result<()> {
        prove_intent(ctx, args)
    }

    /// Same-chain proving has no relay cost; the quote is always zero.
    pub fn fetch_fee(ctx: Context<FetchFee>, args: prover::ProveArgs) -> Result<u64> {
        instructions::fetch_fee(ctx, args)
    }

    /// Clears a proof record whose destination does not match the intent it
    /// claims to prove. Permissionless; rent goes to the caller.
    pub fn challenge(ctx: Context<Challenge>, args: prover::ChallengeArgs) -> Result<()> {
        challenge_intent_proof(ctx, args)
    }
}
