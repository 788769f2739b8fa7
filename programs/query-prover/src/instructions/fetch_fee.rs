use anchor_lang::prelude::*;
use span_svm_std::prover::ProveArgs;

use crate::instructions::prove::validated_query_target;
use crate::instructions::QueryProverError;
use crate::state::Config;

#[derive(Accounts)]
pub struct FetchFee<'info> {
    #[account(address = Config::pda().0 @ QueryProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
}

/// Quotes what a `prove` call with these arguments will charge. Malformed or
/// oversized query targets fail here the same way they would in `prove`.
pub fn fetch_fee(ctx: Context<FetchFee>, args: ProveArgs) -> Result<u64> {
    validated_query_target(&args.data)?;

    ctx.accounts
        .config
        .quote(args.intent_hashes_claimants.len())
}
