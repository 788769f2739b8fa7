use anchor_lang::prelude::*;
use span_svm_std::prover::{challenge_proof, ChallengeArgs, Proof};

use crate::instructions::QueryProverError;

#[derive(Accounts)]
pub struct Challenge<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub proof: UncheckedAccount<'info>,
}

pub fn challenge_intent_proof(ctx: Context<Challenge>, args: ChallengeArgs) -> Result<()> {
    let ChallengeArgs {
        destination,
        route_hash,
        reward_hash,
    } = args;
    let intent_hash = span_svm_std::intent_hash(destination, &route_hash, &reward_hash);

    require!(
        ctx.accounts.proof.key() == Proof::pda(&intent_hash, &crate::ID).0,
        QueryProverError::InvalidProof
    );

    challenge_proof(
        &ctx.accounts.proof,
        &ctx.accounts.payer,
        &intent_hash,
        destination,
    )?;

    Ok(())
}
