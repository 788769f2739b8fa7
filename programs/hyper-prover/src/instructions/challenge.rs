use anchor_lang::prelude::*;
use span_svm_std::prover::{challenge_proof, ChallengeArgs, Proof};

use crate::instructions::HyperProverError;

#[derive(Accounts)]
pub struct Challenge<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
}

/// Removes a proof record whose recorded destination contradicts the
/// intent's true destination, re-derived here from the intent's public
/// fields. Anyone may call this; the record's rent goes to the caller.
pub fn challenge_intent_proof(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
    let ChallengeArgs {
        destination,
        route_hash,
        reward_hash,
    } = args;
    let intent_hash = span_svm_std::intent_hash(destination, &route_hash, &reward_hash);

    require!(
        ctx.accounts.proof.key() == Proof::pda(&intent_hash, &crate::ID).0,
        HyperProverError::InvalidProof
    );

    challenge_proof(
        &ctx.accounts.proof,
        &ctx.accounts.payer,
        &intent_hash,
        destination,
    )?;

    Ok(())
}
