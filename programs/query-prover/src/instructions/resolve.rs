use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;
use span_svm_std::message::IntentHashesClaimants;
use span_svm_std::prover::{self, IntentAlreadyProven, IntentProven, PROOF_SEED};
use span_svm_std::Bytes32;

use crate::instructions::QueryProverError;
use crate::reader::process_authority_pda;
use crate::state::{pda_payer_pda, Config, ProofAccount, PDA_PAYER_SEED};

#[event_cpi]
#[derive(Accounts)]
pub struct Resolve<'info> {
    #[account(address = process_authority_pda().0 @ QueryProverError::InvalidProcessAuthority)]
    pub process_authority: Signer<'info>,
    #[account(address = Config::pda().0 @ QueryProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(mut)]
    pub pda_payer: UncheckedAccount<'info>,
}

/// Callback from the query router delivering an attested read result. The
/// body is the queried chain's id followed by the `(intent_hash, claimant)`
/// pairs its portal reported, remaining accounts aligned pairwise.
///
/// A zero claimant means the remote portal had no fulfillment record for
/// that hash; the whole result is rejected so the requester re-queries once
/// fulfillment has actually happened.
pub fn resolve<'info>(
    ctx: Context<'_, '_, '_, 'info, Resolve<'info>>,
    target: [u8; 32],
    result: Vec<u8>,
) -> Result<()> {
    require!(
        ctx.accounts.config.is_trusted_portal(&target.into()),
        QueryProverError::UntrustedPortal
    );

    let (queried_chain, pairs) = IntentHashesClaimants::from_prefixed_bytes(&result)
        .ok_or(QueryProverError::InvalidData)?;
    require!(
        ctx.remaining_accounts.len() == pairs.len(),
        QueryProverError::InvalidProof
    );

    Vec::from(pairs)
        .into_iter()
        .zip(ctx.remaining_accounts)
        .try_for_each(|((intent_hash, claimant), proof)| {
            record_pair(&ctx, queried_chain, intent_hash, claimant, proof)
        })
}

fn record_pair<'info>(
    ctx: &Context<'_, '_, '_, 'info, Resolve<'info>>,
    queried_chain: u64,
    intent_hash: Bytes32,
    claimant: Bytes32,
    proof: &AccountInfo<'info>,
) -> Result<()> {
    let (proof_pda, bump) = prover::Proof::pda(&intent_hash, &crate::ID);
    require!(proof.key() == proof_pda, QueryProverError::InvalidProof);

    require!(
        claimant != Bytes32::ZERO,
        QueryProverError::IntentNotFulfilled
    );
    let Some(claimant_pubkey) = claimant.claimant_pubkey() else {
        return Ok(());
    };

    if prover::Proof::try_from_account_info(proof)?.is_some() {
        emit_cpi!(IntentAlreadyProven::new(intent_hash));
        return Ok(());
    }

    let proof_signer_seeds = [PROOF_SEED, intent_hash.as_ref(), &[bump]];
    let (pda_payer_pda, payer_bump) = pda_payer_pda();
    require!(
        ctx.accounts.pda_payer.key() == pda_payer_pda,
        QueryProverError::InvalidPdaPayer
    );
    let pda_payer_signer_seeds = [PDA_PAYER_SEED, &[payer_bump]];

    ProofAccount::from(prover::Proof::new(queried_chain, claimant_pubkey)).init(
        proof,
        &ctx.accounts.pda_payer,
        &ctx.accounts.system_program,
        &[&pda_payer_signer_seeds, &proof_signer_seeds],
    )?;

    emit_cpi!(IntentProven::new(intent_hash, claimant, queried_chain));

    Ok(())
}
