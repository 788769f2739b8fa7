use std::collections::BTreeSet;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::token_interface;
use anchor_spl::{token, token_2022};
use span_svm_std::prover::Proof;
use span_svm_std::Bytes32;

use crate::events::IntentRefunded;
use crate::instructions::withdraw::{mark_settled, require_unsettled};
use crate::instructions::PortalError;
use crate::state::{vault_pda, SettlementKind, VAULT_SEED};
use crate::types::{self, Reward, TokenTransferAccounts, VecTokenTransferAccounts};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct RefundArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: RefundArgs)]
pub struct Refund<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: validated against `args.reward.creator`
    #[account(mut)]
    pub creator: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub vault: UncheckedAccount<'info>,
    /// CHECK: address is validated
    pub proof: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub settled_marker: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub system_program: Program<'info, System>,
}

/// Returns everything in the vault to the reward's creator once the claim
/// window has expired. A valid proof record naming a claimant blocks the
/// refund permanently; the claimant keeps the right to withdraw at leisure.
pub fn refund_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Refund<'info>>,
    args: RefundArgs,
) -> Result<()> {
    let RefundArgs {
        destination,
        route_hash,
        reward,
    } = args;
    let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
    let (vault_pda, bump) = vault_pda(&intent_hash);
    let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

    require!(ctx.accounts.vault.key() == vault_pda, PortalError::InvalidVault);
    require!(
        ctx.accounts.creator.key() == reward.creator,
        PortalError::InvalidCreator
    );
    require!(
        ctx.accounts.proof.key() == Proof::pda(&intent_hash, &reward.prover).0,
        PortalError::InvalidProof
    );
    require_unsettled(&ctx.accounts.settled_marker, &intent_hash)?;
    require!(
        reward.deadline <= Clock::get()?.unix_timestamp,
        PortalError::DeadlineNotReached
    );
    require_unclaimed(&ctx.accounts.proof, destination)?;

    let token_accounts: VecTokenTransferAccounts<'info> = ctx.remaining_accounts.try_into()?;
    let token_accounts = token_accounts.into_inner();
    validate_token_accounts(&ctx, &token_accounts, &reward)?;

    mark_settled(
        &ctx.accounts.settled_marker,
        &ctx.accounts.payer,
        &ctx.accounts.system_program,
        &intent_hash,
        SettlementKind::Refunded,
    )?;

    token_accounts
        .into_iter()
        .try_for_each(|accounts| refund_token(&ctx, accounts, &[&vault_seeds]))?;
    refund_native(&ctx, &[&vault_seeds])?;

    emit!(IntentRefunded::new(intent_hash, reward.creator));

    Ok(())
}

/// A proof whose recorded destination matches is a live claim and blocks the
/// refund. A record for a different destination is stale and ignored here;
/// `challenge_intent_proof` on the prover can reclaim its rent.
fn require_unclaimed(proof: &AccountInfo<'_>, destination: u64) -> Result<()> {
    match Proof::try_from_account_info(proof)? {
        Some(record)
            if record.destination == destination && record.claimant != Pubkey::default() =>
        {
            Err(PortalError::IntentNotClaimed.into())
        }
        _ => Ok(()),
    }
}

fn validate_token_accounts<'info>(
    ctx: &Context<'_, '_, '_, 'info, Refund<'info>>,
    token_accounts: &[TokenTransferAccounts<'info>],
    reward: &Reward,
) -> Result<()> {
    let mints = token_accounts
        .iter()
        .map(|accounts| accounts.mint.key())
        .collect::<BTreeSet<_>>();
    let reward_token_amounts = reward.token_amounts()?;

    require!(
        mints.len() == token_accounts.len() && mints.iter().eq(reward_token_amounts.keys()),
        PortalError::InvalidMint
    );

    token_accounts.iter().try_for_each(|accounts| {
        let vault_ata = get_associated_token_address_with_program_id(
            ctx.accounts.vault.key,
            accounts.mint.key,
            accounts.token_program_id(),
        );

        require!(accounts.from.key() == vault_ata, PortalError::InvalidAta);
        require!(
            accounts.to_data()?.owner == reward.creator,
            PortalError::InvalidCreatorToken
        );

        Ok(())
    })
}

/// Empties and closes the vault ATA so its rent also comes back to the
/// creator's side of the ledger.
fn refund_token<'info>(
    ctx: &Context<'_, '_, '_, 'info, Refund<'info>>,
    accounts: TokenTransferAccounts<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let token_program = accounts.token_program(
        &ctx.accounts.token_program,
        &ctx.accounts.token_2022_program,
    )?;

    let balance = accounts.from_data()?.amount;
    if balance > 0 {
        accounts.transfer_with_signer(&token_program, &ctx.accounts.vault, signer_seeds, balance)?;
    }

    token_interface::close_account(CpiContext::new_with_signer(
        token_program.to_account_info(),
        token_interface::CloseAccount {
            account: accounts.from.to_account_info(),
            destination: ctx.accounts.creator.to_account_info(),
            authority: ctx.accounts.vault.to_account_info(),
        },
        signer_seeds,
    ))
}

fn refund_native<'info>(
    ctx: &Context<'_, '_, '_, 'info, Refund<'info>>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    match ctx.accounts.vault.lamports() {
        0 => Ok(()),
        amount => invoke_signed(
            &system_instruction::transfer(
                &ctx.accounts.vault.key(),
                &ctx.accounts.creator.key(),
                amount,
            ),
            &[
                ctx.accounts.vault.to_account_info(),
                ctx.accounts.creator.to_account_info(),
                ctx.accounts.system_program.to_account_info(),
            ],
            signer_seeds,
        )
        .map_err(Into::into),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use span_svm_std::prover;

    fn account_info<'a>(
        key: &'a Pubkey,
        lamports: &'a mut u64,
        data: &'a mut Vec<u8>,
        owner: &'a Pubkey,
    ) -> AccountInfo<'a> {
        AccountInfo::new(key, false, false, lamports, data, owner, false, 0)
    }

    fn proof_bytes(destination: u64, claimant: Pubkey) -> Vec<u8> {
        [0u8; 8]
            .into_iter()
            .chain(prover::Proof::new(destination, claimant).try_to_vec().unwrap())
            .collect()
    }

    #[test]
    fn live_claim_blocks_refund() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = proof_bytes(10, Pubkey::new_unique());
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert_eq!(
            require_unclaimed(&proof, 10).unwrap_err(),
            Error::from(PortalError::IntentNotClaimed)
        );
    }

    #[test]
    fn stale_destination_record_does_not_block() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = proof_bytes(11, Pubkey::new_unique());
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert!(require_unclaimed(&proof, 10).is_ok());
    }

    #[test]
    fn zero_claimant_record_does_not_block() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = proof_bytes(10, Pubkey::default());
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert!(require_unclaimed(&proof, 10).is_ok());
    }

    #[test]
    fn absent_record_does_not_block() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = vec![];
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert!(require_unclaimed(&proof, 10).is_ok());
    }
}
