use std::iter;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use span_svm_std::message::IntentHashesClaimants;
use span_svm_std::prover::{self, PROVE_DISCRIMINATOR};
use span_svm_std::Bytes32;

use crate::events::IntentProveRequested;
use crate::instructions::PortalError;
use crate::state::{dispatcher_pda, FulfillMarker, DISPATCHER_SEED};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct ProveArgs {
    pub prover: Pubkey,
    pub source_chain: u64,
    pub intent_hashes: Vec<Bytes32>,
    pub data: Vec<u8>,
    pub fee: u64,
}

#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    /// CHECK: address is validated
    #[account(executable, address = args.prover @ PortalError::InvalidProver)]
    pub prover: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ PortalError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
}

/// Relays the claimants of fulfilled intents back toward the source chain
/// through the chosen prover.
///
/// The first remaining account per intent hash is its fulfill marker; the
/// claimant each marker recorded is what gets relayed. Whatever accounts
/// follow are handed through to the prover untouched, along with `data` and
/// the relay `fee` the caller is offering.
pub fn prove_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Prove<'info>>,
    args: ProveArgs,
) -> Result<()> {
    let ProveArgs {
        prover,
        source_chain,
        intent_hashes,
        data,
        fee,
    } = args;

    require!(
        ctx.remaining_accounts.len() >= intent_hashes.len(),
        PortalError::InvalidFulfillMarker
    );
    let (marker_accounts, prover_accounts) = ctx.remaining_accounts.split_at(intent_hashes.len());

    let pairs = intent_hashes
        .iter()
        .zip(marker_accounts)
        .map(|(intent_hash, marker)| {
            require!(
                marker.key() == FulfillMarker::pda(intent_hash).0,
                PortalError::InvalidFulfillMarker
            );
            let marker = FulfillMarker::try_from_account_info(marker)?
                .ok_or(PortalError::InvalidFulfillMarker)?;

            Ok((*intent_hash, Bytes32::from(marker.claimant)))
        })
        .collect::<Result<Vec<_>>>()?;

    invoke_prover_prove(
        &ctx,
        prover::ProveArgs::new(source_chain, IntentHashesClaimants::new(pairs), data, fee),
        prover_accounts,
    )?;

    emit!(IntentProveRequested::new(intent_hashes, prover, source_chain));

    Ok(())
}

fn invoke_prover_prove<'info>(
    ctx: &Context<'_, '_, '_, 'info, Prove<'info>>,
    args: prover::ProveArgs,
    prover_accounts: &[AccountInfo<'info>],
) -> Result<()> {
    let ix_data: Vec<_> = PROVE_DISCRIMINATOR
        .into_iter()
        .chain(args.try_to_vec()?)
        .collect();

    let (_, bump) = dispatcher_pda();
    let signer_seeds = [DISPATCHER_SEED, &[bump]];

    let account_metas = prover_accounts.iter().map(|account| AccountMeta {
        pubkey: account.key(),
        is_signer: account.is_signer,
        is_writable: account.is_writable,
    });
    let account_infos = prover_accounts.iter().map(ToAccountInfo::to_account_info);

    let ix = Instruction::new_with_bytes(
        ctx.accounts.prover.key(),
        &ix_data,
        iter::once(AccountMeta::new_readonly(
            ctx.accounts.dispatcher.key(),
            true,
        ))
        .chain(account_metas)
        .collect(),
    );

    invoke_signed(
        &ix,
        iter::once(ctx.accounts.dispatcher.to_account_info())
            .chain(account_infos)
            .collect::<Vec<_>>()
            .as_slice(),
        &[&signer_seeds],
    )
    .map_err(Into::into)
}
