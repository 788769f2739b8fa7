use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;
use span_svm_std::prover::{IntentAlreadyProven, IntentProven, Proof, ProveArgs, PROOF_SEED};
use span_svm_std::{Bytes32, CHAIN_ID};

use crate::instructions::LocalProverError;
use crate::state::ProofAccount;

#[event_cpi]
#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    #[account(address = portal::state::dispatcher_pda().0 @ LocalProverError::InvalidPortalDispatcher)]
    pub portal_dispatcher: Signer<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    pub system_program: Program<'info, System>,
}

/// Records fulfillment pairs for intents settled entirely on this chain.
/// The fulfillment was observed here too, so every record carries this
/// chain's id as its destination.
pub fn prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
    args: ProveArgs,
) -> Result<()> {
    let ProveArgs {
        source,
        intent_hashes_claimants,
        ..
    } = args;

    require!(source == CHAIN_ID, LocalProverError::InvalidSource);
    require!(
        ctx.remaining_accounts.len() == intent_hashes_claimants.len(),
        LocalProverError::InvalidProof
    );

    ctx.remaining_accounts
        .iter()
        .zip(Vec::from(intent_hashes_claimants))
        .try_for_each(|(proof, pair)| mark_intent_hash_proven(&ctx, proof, pair))
}

fn mark_intent_hash_proven<'info>(
    ctx: &Context<'_, '_, '_, 'info, Prove<'info>>,
    proof: &AccountInfo<'info>,
    pair: (Bytes32, Bytes32),
) -> Result<()> {
    let (intent_hash, claimant) = pair;

    let (proof_pda, bump) = Proof::pda(&intent_hash, &crate::ID);
    require!(proof.key == &proof_pda, LocalProverError::InvalidProof);

    let Some(claimant_pubkey) = claimant.claimant_pubkey() else {
        return Ok(());
    };

    if Proof::try_from_account_info(proof)?.is_some() {
        emit_cpi!(IntentAlreadyProven::new(intent_hash));
        return Ok(());
    }

    let signer_seeds = [PROOF_SEED, intent_hash.as_ref(), &[bump]];

    ProofAccount::from(Proof::new(CHAIN_ID, claimant_pubkey)).init(
        proof,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &[&signer_seeds],
    )?;

    emit_cpi!(IntentProven::new(intent_hash, claimant, CHAIN_ID));

    Ok(())
}
