use anchor_lang::prelude::*;
use anchor_lang::system_program;
use span_svm_std::prover::ProveArgs;
use span_svm_std::Bytes32;

use crate::hyperlane;
use crate::instructions::HyperProverError;
use crate::state::{dispatcher_pda, Config, DISPATCHER_SEED};

#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    #[account(address = portal::state::dispatcher_pda().0 @ HyperProverError::InvalidPortalDispatcher)]
    pub portal_dispatcher: Signer<'info>,
    /// CHECK: address is validated
    #[account(address = dispatcher_pda().0 @ HyperProverError::InvalidDispatcher)]
    pub dispatcher: UncheckedAccount<'info>,
    #[account(address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut, address = config.fee_collector @ HyperProverError::InvalidFeeCollector)]
    pub fee_collector: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: Checked in CPI
    #[account(mut)]
    pub outbox_pda: UncheckedAccount<'info>,
    /// CHECK: Checked in CPI
    pub spl_noop_program: UncheckedAccount<'info>,
    pub unique_message: Signer<'info>,
    /// CHECK: Checked in CPI
    #[account(mut)]
    pub dispatched_message_pda: UncheckedAccount<'info>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(executable, address = hyperlane::MAILBOX_ID @ HyperProverError::InvalidMailbox)]
    pub mailbox_program: UncheckedAccount<'info>,
}

/// Relays a batch of fulfillment pairs to the source chain via the Hyperlane
/// mailbox. `data` names the remote prover contract to deliver to; the fee
/// offered must cover this adapter's quote, and exactly the quote is
/// collected.
pub fn prove_intent(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
    let ProveArgs {
        source,
        intent_hashes_claimants,
        data,
        fee,
    } = args;

    let quote = ctx.accounts.config.quote(intent_hashes_claimants.len())?;
    require!(fee >= quote, HyperProverError::InsufficientFee);
    collect_fee(&ctx, quote)?;

    let source_prover: Bytes32 = <[u8; 32]>::try_from(data)
        .map_err(|_| HyperProverError::InvalidData)?
        .into();
    let (_, bump) = dispatcher_pda();
    let signer_seeds = [DISPATCHER_SEED, &[bump]];

    hyperlane::dispatch_msg(
        &ctx,
        chain_to_domain(source)?,
        source_prover,
        intent_hashes_claimants.to_bytes(),
        &signer_seeds,
    )
}

fn collect_fee(ctx: &Context<Prove>, quote: u64) -> Result<()> {
    match quote {
        0 => Ok(()),
        quote => system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.payer.to_account_info(),
                    to: ctx.accounts.fee_collector.to_account_info(),
                },
            ),
            quote,
        ),
    }
}

// Hyperlane domain ids coincide with the chain ids this protocol uses, so
// the conversion is a checked narrowing and nothing more.
fn chain_to_domain(chain: u64) -> Result<u32> {
    chain
        .try_into()
        .map_err(|_| HyperProverError::ChainIdTooLarge.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_to_domain_narrows() {
        assert_eq!(chain_to_domain(10).unwrap(), 10);
        assert_eq!(chain_to_domain(u32::MAX as u64).unwrap(), u32::MAX);
        assert!(chain_to_domain(u32::MAX as u64 + 1).is_err());
    }
}
