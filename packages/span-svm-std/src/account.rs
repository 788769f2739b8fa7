use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::solana_program::system_instruction;

/// One-shot account initialization for marker and record accounts.
///
/// Initialization fails when the account is already owned and populated,
/// which is what makes marker accounts usable as exactly-once guards:
/// the second `init` on the same address is the duplicate-operation signal.
pub trait AccountExt: AccountSerialize + AccountDeserialize + Owner + Space {
    fn init<'info>(
        self,
        account: &AccountInfo<'info>,
        payer: &AccountInfo<'info>,
        system_program: &Program<'info, System>,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let program_id = Self::owner();
        let data_len = 8 + Self::INIT_SPACE;
        let min_balance = Rent::get()?.minimum_balance(data_len);

        require!(
            account.data_is_empty() && *account.owner != program_id,
            anchor_lang::error::ErrorCode::ConstraintZero
        );

        match account.lamports() {
            0 => create_account(
                account,
                payer,
                system_program,
                signer_seeds,
                min_balance,
                data_len,
                &program_id,
            )?,
            // the address was pre-funded; top it up and claim it in place
            balance => claim_funded_account(
                account,
                payer,
                system_program,
                signer_seeds,
                min_balance.saturating_sub(balance),
                data_len,
                &program_id,
            )?,
        }

        self.try_serialize(&mut &mut account.try_borrow_mut_data()?[..])?;

        Ok(())
    }
}

fn create_account<'info>(
    account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    signer_seeds: &[&[&[u8]]],
    min_balance: u64,
    data_len: usize,
    program_id: &Pubkey,
) -> Result<()> {
    invoke_signed(
        &system_instruction::create_account(
            &payer.key(),
            &account.key(),
            min_balance,
            data_len as u64,
            program_id,
        ),
        &[
            payer.to_account_info(),
            account.to_account_info(),
            system_program.to_account_info(),
        ],
        signer_seeds,
    )
    .map_err(Into::into)
}

fn claim_funded_account<'info>(
    account: &AccountInfo<'info>,
    payer: &AccountInfo<'info>,
    system_program: &Program<'info, System>,
    signer_seeds: &[&[&[u8]]],
    missing_balance: u64,
    data_len: usize,
    program_id: &Pubkey,
) -> Result<()> {
    if missing_balance > 0 {
        invoke_signed(
            &system_instruction::transfer(&payer.key(), &account.key(), missing_balance),
            &[
                payer.to_account_info(),
                account.to_account_info(),
                system_program.to_account_info(),
            ],
            signer_seeds,
        )?;
    }

    invoke_signed(
        &system_instruction::allocate(&account.key(), data_len as u64),
        &[account.to_account_info(), system_program.to_account_info()],
        signer_seeds,
    )?;
    invoke_signed(
        &system_instruction::assign(&account.key(), program_id),
        &[account.to_account_info(), system_program.to_account_info()],
        signer_seeds,
    )
    .map_err(Into::into)
}
