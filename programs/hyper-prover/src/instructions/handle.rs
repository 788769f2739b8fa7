use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;
use span_svm_std::message::IntentHashesClaimants;
use span_svm_std::prover::{self, IntentAlreadyProven, IntentProven, PROOF_SEED};
use span_svm_std::Bytes32;

use crate::hyperlane::process_authority_pda;
use crate::instructions::HyperProverError;
use crate::state::{pda_payer_pda, Config, ProofAccount, PDA_PAYER_SEED};

#[event_cpi]
#[derive(Accounts)]
pub struct Handle<'info> {
    #[account(address = process_authority_pda().0 @ HyperProverError::InvalidProcessAuthority)]
    pub process_authority: Signer<'info>,
    #[account(address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(mut)]
    pub pda_payer: UncheckedAccount<'info>,
}

/// Processes an inbound Hyperlane message carrying fulfillment pairs and
/// writes one proof record per pair, remaining accounts aligned pairwise
/// with the message body.
///
/// Delivery must not fail on individual pairs: a pair whose claimant has no
/// representation on this chain is skipped, and a pair already recorded
/// emits `IntentAlreadyProven` instead of erroring, since the whole message
/// would otherwise be undeliverable forever.
pub fn handle<'info>(
    ctx: Context<'_, '_, '_, 'info, Handle<'info>>,
    origin: u32,
    sender: [u8; 32],
    payload: Vec<u8>,
) -> Result<()> {
    require!(
        ctx.accounts.config.is_whitelisted(&sender.into()),
        HyperProverError::InvalidSender,
    );

    let pairs = IntentHashesClaimants::from_bytes(&payload)
        .ok_or(HyperProverError::InvalidData)?;
    require!(
        ctx.remaining_accounts.len() == pairs.len(),
        HyperProverError::InvalidProof
    );

    let destination_chain = domain_to_chain(origin);

    Vec::from(pairs)
        .into_iter()
        .zip(ctx.remaining_accounts)
        .try_for_each(|((intent_hash, claimant), proof)| {
            record_pair(&ctx, destination_chain, intent_hash, claimant, proof)
        })
}

fn domain_to_chain(domain: u32) -> u64 {
    domain.into()
}

fn record_pair<'info>(
    ctx: &Context<'_, '_, '_, 'info, Handle<'info>>,
    destination_chain: u64,
    intent_hash: Bytes32,
    claimant: Bytes32,
    proof: &AccountInfo<'info>,
) -> Result<()> {
    let (proof_pda, bump) = prover::Proof::pda(&intent_hash, &crate::ID);
    require!(proof.key() == proof_pda, HyperProverError::InvalidProof);

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
        HyperProverError::InvalidPdaPayer
    );
    let pda_payer_signer_seeds = [PDA_PAYER_SEED, &[payer_bump]];

    ProofAccount::from(prover::Proof::new(destination_chain, claimant_pubkey)).init(
        proof,
        &ctx.accounts.pda_payer,
        &ctx.accounts.system_program,
        &[&pda_payer_signer_seeds, &proof_signer_seeds],
    )?;

    emit_cpi!(IntentProven::new(intent_hash, claimant, destination_chain));

    Ok(())
}
