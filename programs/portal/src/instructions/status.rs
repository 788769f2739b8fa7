use anchor_lang::prelude::*;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface::TokenAccount;
use anchor_spl::{token, token_2022};
use span_svm_std::Bytes32;

use crate::instructions::PortalError;
use crate::state::{vault_pda, IntentStatus, SettledMarker, SettlementKind};
use crate::types::{self, Reward};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct IntentStatusArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: IntentStatusArgs)]
pub struct QueryIntentStatus<'info> {
    /// CHECK: address is validated
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    pub settled_marker: UncheckedAccount<'info>,
}

/// Computes the reward status from the settled marker and the vault's live
/// balances. Nothing here is cached: a vault balance manipulated outside
/// `fund` is reflected immediately, which closes the stale-flag exploit.
///
/// Remaining accounts carry the vault ATA for each reward mint, in the
/// canonical (sorted, deduplicated) mint order.
pub fn query_intent_status<'info>(
    ctx: Context<'_, '_, '_, 'info, QueryIntentStatus<'info>>,
    args: IntentStatusArgs,
) -> Result<IntentStatus> {
    let IntentStatusArgs {
        destination,
        route_hash,
        reward,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());

    require!(
        ctx.accounts.vault.key() == vault_pda(&intent_hash).0,
        PortalError::InvalidVault
    );
    require!(
        ctx.accounts.settled_marker.key() == SettledMarker::pda(&intent_hash).0,
        PortalError::InvalidSettledMarker
    );

    if let Some(marker) = SettledMarker::try_from_account_info(&ctx.accounts.settled_marker)? {
        return Ok(match marker.kind {
            SettlementKind::Withdrawn => IntentStatus::Claimed,
            SettlementKind::Refunded => IntentStatus::Refunded,
        });
    }

    funding_status(&ctx, &reward)
}

fn funding_status<'info>(
    ctx: &Context<'_, '_, '_, 'info, QueryIntentStatus<'info>>,
    reward: &Reward,
) -> Result<IntentStatus> {
    let reward_token_amounts = reward.token_amounts()?;
    require!(
        ctx.remaining_accounts.len() == reward_token_amounts.len(),
        PortalError::InvalidAta
    );

    let native_balance = ctx.accounts.vault.lamports();
    let mut any_balance = native_balance > 0;
    let mut complete = native_balance >= reward.native_amount;

    for (ata, (mint, amount)) in ctx.remaining_accounts.iter().zip(&reward_token_amounts) {
        let balance = vault_ata_balance(ctx.accounts.vault.key, ata, mint)?;

        any_balance |= balance > 0;
        complete &= balance >= *amount;
    }

    Ok(match (complete, any_balance) {
        (true, _) => IntentStatus::Funded,
        (false, true) => IntentStatus::PartiallyFunded,
        (false, false) => IntentStatus::Unfunded,
    })
}

fn vault_ata_balance(vault: &Pubkey, ata: &AccountInfo<'_>, mint: &Pubkey) -> Result<u64> {
    let expected = [token::ID, token_2022::ID]
        .iter()
        .map(|program_id| get_associated_token_address_with_program_id(vault, mint, program_id))
        .any(|derived| derived == *ata.key);
    require!(expected, PortalError::InvalidAta);

    if ata.data_is_empty() {
        return Ok(0);
    }

    Ok(TokenAccount::try_deserialize(&mut &ata.try_borrow_data()?[..])?.amount)
}
