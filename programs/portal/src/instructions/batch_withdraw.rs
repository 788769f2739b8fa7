use anchor_lang::prelude::*;
use anchor_spl::{token, token_2022};
use span_svm_std::Bytes32;

use crate::instructions::withdraw::{SettleWithdraw, WithdrawArgs};
use crate::instructions::PortalError;
use crate::types::{Reward, TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BatchWithdrawEntry {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct BatchWithdrawArgs {
    pub entries: Vec<BatchWithdrawEntry>,
}

#[derive(Accounts)]
#[instruction(args: BatchWithdrawArgs)]
pub struct BatchWithdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Settles several proven intents in one transaction. Each entry's accounts
/// follow in the remaining accounts: claimant, vault, proof, settled marker,
/// then one `(from, to, mint)` triple per reward mint.
///
/// The batch is atomic. One entry failing, including an entry that was
/// already settled, rolls back every withdrawal in the transaction.
pub fn batch_withdraw_intents<'info>(
    ctx: Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
    args: BatchWithdrawArgs,
) -> Result<()> {
    let mut accounts = ctx.remaining_accounts;

    for entry in args.entries {
        let token_account_count =
            entry.reward.token_amounts()?.len() * TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
        let entry_len = ENTRY_HEADER_LEN + token_account_count;
        require!(
            accounts.len() >= entry_len,
            PortalError::InvalidTokenTransferAccounts
        );

        let (entry_accounts, rest) = accounts.split_at(entry_len);
        accounts = rest;

        settle_entry(&ctx, entry, entry_accounts)?;
    }

    require!(
        accounts.is_empty(),
        PortalError::InvalidTokenTransferAccounts
    );

    Ok(())
}

const ENTRY_HEADER_LEN: usize = 4;

fn settle_entry<'info>(
    ctx: &Context<'_, '_, '_, 'info, BatchWithdraw<'info>>,
    entry: BatchWithdrawEntry,
    entry_accounts: &[AccountInfo<'info>],
) -> Result<()> {
    let [claimant, vault, proof, settled_marker] = &entry_accounts[..ENTRY_HEADER_LEN] else {
        return Err(PortalError::InvalidTokenTransferAccounts.into());
    };

    SettleWithdraw {
        payer: &ctx.accounts.payer.to_account_info(),
        claimant,
        vault,
        proof,
        settled_marker,
        token_accounts: &entry_accounts[ENTRY_HEADER_LEN..],
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        system_program: &ctx.accounts.system_program,
    }
    .settle(WithdrawArgs {
        destination: entry.destination,
        route_hash: entry.route_hash,
        reward: entry.reward,
    })
}
