use anchor_lang::prelude::*;
use anchor_spl::associated_token::{self, get_associated_token_address_with_program_id};
use anchor_spl::token_interface::TokenAccount;
use anchor_spl::{token, token_2022};
use derive_new::new;

use crate::instructions::PortalError;
use crate::types::TokenTransferAccounts;

/// Moves tokens from a funder toward a PDA-owned destination, one mint at a
/// time, creating the destination ATA on first use. `fund` points it at an
/// intent's vault, `fulfill` at the executor.
#[derive(new)]
pub struct TokenFunding<'a, 'info> {
    payer: &'a Signer<'info>,
    funder: &'a Signer<'info>,
    fundee: AccountInfo<'info>,
    token_program: &'a Program<'info, token::Token>,
    token_2022_program: &'a Program<'info, token_2022::Token2022>,
    associated_token_program: &'a Program<'info, associated_token::AssociatedToken>,
    system_program: &'a Program<'info, System>,
}

impl<'info> TokenFunding<'_, 'info> {
    /// Tops the fundee's ATA up toward `requested`, moving at most what the
    /// funder holds, and reports whether the balance now covers the request.
    /// Coverage is judged by what actually landed, not by what was sent.
    pub fn top_up(&self, accounts: &TokenTransferAccounts<'info>, requested: u64) -> Result<bool> {
        let token_program = accounts.token_program(self.token_program, self.token_2022_program)?;
        let held = self.fundee_ata(accounts, &token_program)?.amount;
        let available = accounts.from_data()?.amount;

        requested
            .checked_sub(held)
            .map(|missing| missing.min(available))
            .filter(|&amount| amount > 0)
            .map(|amount| accounts.transfer(&token_program, self.funder, amount))
            .transpose()?;

        Ok(accounts.to_data()?.amount >= requested)
    }

    fn fundee_ata(
        &self,
        accounts: &TokenTransferAccounts<'info>,
        token_program: &AccountInfo<'info>,
    ) -> Result<TokenAccount> {
        let expected = get_associated_token_address_with_program_id(
            self.fundee.key,
            accounts.mint.key,
            accounts.token_program_id(),
        );
        require!(expected == *accounts.to.key, PortalError::InvalidAta);

        if accounts.to.data_is_empty() {
            associated_token::create(CpiContext::new(
                self.associated_token_program.to_account_info(),
                associated_token::Create {
                    payer: self.payer.to_account_info(),
                    associated_token: accounts.to.to_account_info(),
                    authority: self.fundee.to_account_info(),
                    mint: accounts.mint.to_account_info(),
                    system_program: self.system_program.to_account_info(),
                    token_program: token_program.to_account_info(),
                },
            ))?;
        }

        TokenAccount::try_deserialize(&mut &accounts.to.try_borrow_data()?[..])
    }
}
