use std::collections::BTreeSet;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;
use anchor_spl::associated_token::get_associated_token_address_with_program_id;
use anchor_spl::{token, token_2022};
use span_svm_std::account::AccountExt;
use span_svm_std::prover::Proof;
use span_svm_std::Bytes32;

use crate::events::IntentWithdrawn;
use crate::instructions::PortalError;
use crate::state::{
    vault_pda, SettledMarker, SettlementKind, SETTLED_MARKER_SEED, VAULT_SEED,
};
use crate::types::{self, Reward, TokenTransferAccounts, VecTokenTransferAccounts};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct WithdrawArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward: Reward,
}

#[derive(Accounts)]
#[instruction(args: WithdrawArgs)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: validated against the live proof record
    #[account(mut)]
    pub claimant: UncheckedAccount<'info>,
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

pub fn withdraw_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Withdraw<'info>>,
    args: WithdrawArgs,
) -> Result<()> {
    SettleWithdraw {
        payer: &ctx.accounts.payer.to_account_info(),
        claimant: &ctx.accounts.claimant.to_account_info(),
        vault: &ctx.accounts.vault.to_account_info(),
        proof: &ctx.accounts.proof.to_account_info(),
        settled_marker: &ctx.accounts.settled_marker.to_account_info(),
        token_accounts: ctx.remaining_accounts,
        token_program: &ctx.accounts.token_program,
        token_2022_program: &ctx.accounts.token_2022_program,
        system_program: &ctx.accounts.system_program,
    }
    .settle(args)
}

/// One withdrawal, with its accounts already sliced out. `withdraw` uses it
/// directly; `batch_withdraw` walks its remaining accounts and builds one
/// per entry.
pub(crate) struct SettleWithdraw<'a, 'info> {
    pub payer: &'a AccountInfo<'info>,
    pub claimant: &'a AccountInfo<'info>,
    pub vault: &'a AccountInfo<'info>,
    pub proof: &'a AccountInfo<'info>,
    pub settled_marker: &'a AccountInfo<'info>,
    pub token_accounts: &'a [AccountInfo<'info>],
    pub token_program: &'a Program<'info, token::Token>,
    pub token_2022_program: &'a Program<'info, token_2022::Token2022>,
    pub system_program: &'a Program<'info, System>,
}

impl<'info> SettleWithdraw<'_, 'info> {
    pub(crate) fn settle(self, args: WithdrawArgs) -> Result<()> {
        let WithdrawArgs {
            destination,
            route_hash,
            reward,
        } = args;
        let intent_hash = types::intent_hash(destination, &route_hash, &reward.hash());
        let (vault_pda, bump) = vault_pda(&intent_hash);
        let vault_seeds = [VAULT_SEED, intent_hash.as_ref(), &[bump]];

        require!(self.vault.key() == vault_pda, PortalError::InvalidVault);
        require!(
            self.proof.key() == Proof::pda(&intent_hash, &reward.prover).0,
            PortalError::InvalidProof
        );
        require_unsettled(self.settled_marker, &intent_hash)?;

        // the claimant is re-read from the proof record here, at call time,
        // so a challenge that lands first wins over a racing withdrawal
        validate_claim(self.proof, self.claimant.key, destination)?;

        let token_accounts: VecTokenTransferAccounts<'info> = self.token_accounts.try_into()?;
        let token_accounts = token_accounts.into_inner();
        self.validate_token_accounts(&token_accounts, &reward)?;
        self.require_funded(&token_accounts, &reward)?;

        // terminal state first; every transfer below is an external call
        mark_settled(
            self.settled_marker,
            self.payer,
            self.system_program,
            &intent_hash,
            SettlementKind::Withdrawn,
        )?;

        token_accounts
            .into_iter()
            .try_for_each(|accounts| self.drain_token(accounts, &[&vault_seeds]))?;
        self.drain_native(&[&vault_seeds])?;

        emit!(IntentWithdrawn::new(intent_hash, self.claimant.key()));

        Ok(())
    }

    fn validate_token_accounts(
        &self,
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
                self.vault.key,
                accounts.mint.key,
                accounts.token_program_id(),
            );

            require!(accounts.from.key() == vault_ata, PortalError::InvalidAta);
            require!(
                accounts.to_data()?.owner == self.claimant.key(),
                PortalError::InvalidClaimantToken
            );

            Ok(())
        })
    }

    /// Withdrawal only proceeds from the `Funded` state, judged by actual
    /// vault balances at call time.
    fn require_funded(
        &self,
        token_accounts: &[TokenTransferAccounts<'info>],
        reward: &Reward,
    ) -> Result<()> {
        require!(
            self.vault.lamports() >= reward.native_amount,
            PortalError::IntentNotFunded
        );

        let reward_token_amounts = reward.token_amounts()?;
        token_accounts.iter().try_for_each(|accounts| {
            let required = reward_token_amounts
                .get(accounts.mint.key)
                .ok_or(PortalError::InvalidMint)?;
            require!(
                accounts.from_data()?.amount >= *required,
                PortalError::IntentNotFunded
            );

            Ok(())
        })
    }

    fn drain_token(
        &self,
        accounts: TokenTransferAccounts<'info>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let token_program =
            accounts.token_program(self.token_program, self.token_2022_program)?;

        // the vault's entire balance, not the nominal reward amount
        accounts.transfer_with_signer(
            &token_program,
            self.vault,
            signer_seeds,
            accounts.from_data()?.amount,
        )
    }

    fn drain_native(&self, signer_seeds: &[&[&[u8]]]) -> Result<()> {
        match self.vault.lamports() {
            0 => Ok(()),
            amount => invoke_signed(
                &system_instruction::transfer(&self.vault.key(), &self.claimant.key(), amount),
                &[
                    self.vault.to_account_info(),
                    self.claimant.to_account_info(),
                    self.system_program.to_account_info(),
                ],
                signer_seeds,
            )
            .map_err(Into::into),
        }
    }
}

/// Entitlement to withdraw is a live proof record naming this claimant for
/// this destination; anything else, including a zeroed record, denies it.
fn validate_claim(proof: &AccountInfo<'_>, claimant: &Pubkey, destination: u64) -> Result<()> {
    match Proof::try_from_account_info(proof)? {
        Some(record)
            if record.claimant == *claimant
                && record.claimant != Pubkey::default()
                && record.destination == destination =>
        {
            Ok(())
        }
        _ => Err(PortalError::IntentNotClaimed.into()),
    }
}

/// Fails with the terminal state the intent is already in, if any. Runs
/// before any balance check so a drained vault still reports "already
/// withdrawn" or "already refunded" instead of "not funded".
pub(crate) fn require_unsettled(
    settled_marker: &AccountInfo<'_>,
    intent_hash: &Bytes32,
) -> Result<()> {
    require!(
        settled_marker.key() == SettledMarker::pda(intent_hash).0,
        PortalError::InvalidSettledMarker
    );

    match SettledMarker::try_from_account_info(settled_marker)? {
        Some(existing) => Err(match existing.kind {
            SettlementKind::Withdrawn => PortalError::IntentAlreadyWithdrawn.into(),
            SettlementKind::Refunded => PortalError::IntentAlreadyRefunded.into(),
        }),
        None => Ok(()),
    }
}

/// Writes the terminal marker for an intent.
pub(crate) fn mark_settled<'info>(
    settled_marker: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    intent_hash: &Bytes32,
    kind: SettlementKind,
) -> Result<()> {
    require_unsettled(settled_marker, intent_hash)?;

    let (_, bump) = SettledMarker::pda(intent_hash);
    let signer_seeds = [SETTLED_MARKER_SEED, intent_hash.as_ref(), &[bump]];

    SettledMarker::new(kind).init(settled_marker, payer, system_program, &[&signer_seeds])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_info<'a>(
        key: &'a Pubkey,
        lamports: &'a mut u64,
        data: &'a mut Vec<u8>,
        owner: &'a Pubkey,
    ) -> AccountInfo<'a> {
        AccountInfo::new(key, false, false, lamports, data, owner, false, 0)
    }

    fn marker_bytes(kind: SettlementKind) -> Vec<u8> {
        [0u8; 8]
            .into_iter()
            .chain(SettledMarker::new(kind).try_to_vec().unwrap())
            .collect()
    }

    fn proof_bytes(destination: u64, claimant: Pubkey) -> Vec<u8> {
        [0u8; 8]
            .into_iter()
            .chain(Proof::new(destination, claimant).try_to_vec().unwrap())
            .collect()
    }

    #[test]
    fn settled_intent_reports_which_terminal_state() {
        let intent_hash: Bytes32 = [5u8; 32].into();
        let key = SettledMarker::pda(&intent_hash).0;
        let owner = crate::ID;

        for (kind, expected) in [
            (SettlementKind::Withdrawn, PortalError::IntentAlreadyWithdrawn),
            (SettlementKind::Refunded, PortalError::IntentAlreadyRefunded),
        ] {
            let mut lamports = 0;
            let mut data = marker_bytes(kind);
            let marker = account_info(&key, &mut lamports, &mut data, &owner);

            assert_eq!(
                require_unsettled(&marker, &intent_hash).unwrap_err(),
                Error::from(expected)
            );
        }
    }

    #[test]
    fn unsettled_intent_passes() {
        let intent_hash: Bytes32 = [5u8; 32].into();
        let key = SettledMarker::pda(&intent_hash).0;
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = vec![];
        let marker = account_info(&key, &mut lamports, &mut data, &owner);

        assert!(require_unsettled(&marker, &intent_hash).is_ok());
    }

    #[test]
    fn wrong_marker_address_fails() {
        let intent_hash: Bytes32 = [5u8; 32].into();
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = vec![];
        let marker = account_info(&key, &mut lamports, &mut data, &owner);

        assert_eq!(
            require_unsettled(&marker, &intent_hash).unwrap_err(),
            Error::from(PortalError::InvalidSettledMarker)
        );
    }

    #[test]
    fn claim_requires_matching_live_proof() {
        let claimant = Pubkey::new_unique();
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = proof_bytes(10, claimant);
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert!(validate_claim(&proof, &claimant, 10).is_ok());
        assert_eq!(
            validate_claim(&proof, &claimant, 11).unwrap_err(),
            Error::from(PortalError::IntentNotClaimed)
        );
        assert_eq!(
            validate_claim(&proof, &Pubkey::new_unique(), 10).unwrap_err(),
            Error::from(PortalError::IntentNotClaimed)
        );
    }

    #[test]
    fn zero_claimant_proof_entitles_no_one() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = proof_bytes(10, Pubkey::default());
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert_eq!(
            validate_claim(&proof, &Pubkey::default(), 10).unwrap_err(),
            Error::from(PortalError::IntentNotClaimed)
        );
    }

    #[test]
    fn missing_proof_blocks_claim() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = vec![];
        let proof = account_info(&key, &mut lamports, &mut data, &owner);

        assert_eq!(
            validate_claim(&proof, &Pubkey::new_unique(), 10).unwrap_err(),
            Error::from(PortalError::IntentNotClaimed)
        );
    }
}
