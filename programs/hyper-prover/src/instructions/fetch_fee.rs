use anchor_lang::prelude::*;
use span_svm_std::prover::ProveArgs;

use crate::instructions::HyperProverError;
use crate::state::Config;

#[derive(Accounts)]
pub struct FetchFee<'info> {
    #[account(address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
}

/// Quotes what a `prove` call with these arguments will charge, so callers
/// can size the fee they attach. Fails the same way `prove` would when the
/// source chain does not fit the transport's domain space.
pub fn fetch_fee(ctx: Context<FetchFee>, args: ProveArgs) -> Result<u64> {
    u32::try_from(args.source).map_err(|_| HyperProverError::ChainIdTooLarge)?;

    ctx.accounts
        .config
        .quote(args.intent_hashes_claimants.len())
}
