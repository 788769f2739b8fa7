use std::collections::BTreeSet;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use anchor_spl::{associated_token, token, token_2022};
use span_svm_std::account::AccountExt;
use span_svm_std::{is_prover, Bytes32, CHAIN_ID};

use crate::events::IntentFulfilled;
use crate::instructions::token_funding::TokenFunding;
use crate::instructions::PortalError;
use crate::state::{executor_pda, FulfillMarker, EXECUTOR_SEED, FULFILL_MARKER_SEED};
use crate::types::{
    self, Calldata, CalldataWithAccounts, Route, VecTokenTransferAccounts,
    TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE,
};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct FulfillArgs {
    pub intent_hash: Bytes32,
    pub route: Route,
    pub reward_hash: Bytes32,
    pub claimant: Pubkey,
}

#[derive(Accounts)]
#[instruction(args: FulfillArgs)]
pub struct Fulfill<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut)]
    pub solver: Signer<'info>,
    /// CHECK: address is validated
    #[account(mut, address = executor_pda().0 @ PortalError::InvalidExecutor)]
    pub executor: UncheckedAccount<'info>,
    /// CHECK: address is validated
    #[account(mut)]
    pub fulfill_marker: UncheckedAccount<'info>,
    pub token_program: Program<'info, token::Token>,
    pub token_2022_program: Program<'info, token_2022::Token2022>,
    pub associated_token_program: Program<'info, associated_token::AssociatedToken>,
    pub system_program: Program<'info, System>,
}

/// Executes an intent's route on this chain and records the claimant who is
/// owed the reward on the source chain.
///
/// Call data arrives as `Calldata` with the account list carried in the
/// transaction's remaining accounts. After execution each call is rewritten
/// to `CalldataWithAccounts`, the form the source chain hashed, and the
/// recomputed intent hash must match the one the solver claims to fulfill.
pub fn fulfill_intent<'info>(
    ctx: Context<'_, '_, '_, 'info, Fulfill<'info>>,
    args: FulfillArgs,
) -> Result<()> {
    let FulfillArgs {
        intent_hash,
        route,
        reward_hash,
        claimant,
    } = args;

    require!(route.portal == crate::ID, PortalError::WrongChain);
    require!(
        Clock::get()?.unix_timestamp <= route.deadline,
        PortalError::DeadlinePassed
    );
    require!(claimant != Pubkey::default(), PortalError::ZeroClaimant);

    let (token_transfer_accounts, call_accounts) = token_transfer_and_call_accounts(&ctx, &route)?;
    fund_executor(&ctx, &route, token_transfer_accounts)?;
    let route = execute_route_calls(ctx.accounts.executor.key, route, call_accounts)?;

    let fulfilled_hash = types::intent_hash(CHAIN_ID, &route.hash(), &reward_hash);
    require!(fulfilled_hash == intent_hash, PortalError::InvalidIntentHash);

    mark_fulfilled(&ctx, &intent_hash, &claimant)?;

    emit!(IntentFulfilled::new(intent_hash, claimant));

    Ok(())
}

fn token_transfer_and_call_accounts<'c, 'info>(
    ctx: &Context<'_, '_, 'c, 'info, Fulfill<'info>>,
    route: &Route,
) -> Result<(VecTokenTransferAccounts<'info>, &'c [AccountInfo<'info>])> {
    let split_index = route.tokens.len() * TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE;
    require!(
        split_index <= ctx.remaining_accounts.len(),
        PortalError::InvalidTokenTransferAccounts
    );
    let (token_transfer_accounts, call_accounts) = ctx.remaining_accounts.split_at(split_index);

    Ok((token_transfer_accounts.try_into()?, call_accounts))
}

/// Stages everything the route spends on the executor. Every route token
/// must land in full and the native value its calls pass on comes from the
/// solver.
fn fund_executor<'info>(
    ctx: &Context<'_, '_, '_, 'info, Fulfill<'info>>,
    route: &Route,
    accounts: VecTokenTransferAccounts<'info>,
) -> Result<()> {
    let route_token_amounts = route.token_amounts()?;
    let funding = TokenFunding::new(
        &ctx.accounts.payer,
        &ctx.accounts.solver,
        ctx.accounts.executor.to_account_info(),
        &ctx.accounts.token_program,
        &ctx.accounts.token_2022_program,
        &ctx.accounts.associated_token_program,
        &ctx.accounts.system_program,
    );

    let mut staged = BTreeSet::new();
    for accounts in accounts.into_inner() {
        let requested = route_token_amounts
            .get(accounts.mint.key)
            .ok_or(PortalError::InvalidMint)?;

        require!(
            funding.top_up(&accounts, *requested)?,
            PortalError::InsufficientFunds
        );
        staged.insert(accounts.mint.key());
    }
    require!(
        staged.iter().eq(route_token_amounts.keys()),
        PortalError::InvalidMint
    );

    match route.native_amount()? {
        0 => Ok(()),
        amount => system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.solver.to_account_info(),
                    to: ctx.accounts.executor.to_account_info(),
                },
            ),
            amount,
        ),
    }
}

fn execute_route_calls(
    executor: &Pubkey,
    mut route: Route,
    call_accounts: &[AccountInfo],
) -> Result<Route> {
    let (_, bump) = executor_pda();
    let signer_seeds = [EXECUTOR_SEED, &[bump]];
    let mut call_accounts = call_accounts.iter();

    route.calls.iter_mut().try_for_each(|call| {
        let calldata = Calldata::try_from_slice(&call.data)?;
        let call_accounts: Vec<_> = call_accounts
            .by_ref()
            .take(calldata.account_count as usize)
            .map(ToAccountInfo::to_account_info)
            .collect();

        execute_route_call(
            executor,
            Pubkey::new_from_array(call.target.into()),
            &calldata.data,
            &call_accounts,
            &signer_seeds,
        )?;

        call.data = CalldataWithAccounts::new(calldata, call_accounts)?.try_to_vec()?;

        Result::Ok(())
    })?;

    Ok(route)
}

fn execute_route_call(
    executor: &Pubkey,
    program_id: Pubkey,
    calldata: &[u8],
    call_accounts: &[AccountInfo],
    signer_seeds: &[&[u8]],
) -> Result<()> {
    require!(!is_prover(&program_id), PortalError::InvalidFulfillTarget);

    let instruction = Instruction::new_with_bytes(
        program_id,
        calldata,
        call_accounts
            .iter()
            .map(|account| AccountMeta {
                pubkey: account.key(),
                is_signer: account.is_signer || account.key() == *executor,
                is_writable: account.is_writable,
            })
            .collect::<Vec<_>>(),
    );

    invoke_signed(&instruction, call_accounts, &[signer_seeds]).map_err(Into::into)
}

fn mark_fulfilled(ctx: &Context<Fulfill>, intent_hash: &Bytes32, claimant: &Pubkey) -> Result<()> {
    let (fulfill_marker, bump) = FulfillMarker::pda(intent_hash);
    require!(
        ctx.accounts.fulfill_marker.key() == fulfill_marker,
        PortalError::InvalidFulfillMarker
    );
    let signer_seeds = [FULFILL_MARKER_SEED, intent_hash.as_ref(), &[bump]];

    FulfillMarker::new(*claimant, bump)
        .init(
            &ctx.accounts.fulfill_marker,
            &ctx.accounts.payer,
            &ctx.accounts.system_program,
            &[&signer_seeds],
        )
        .map_err(|_| PortalError::IntentAlreadyFulfilled.into())
}
