use anchor_lang::prelude::*;
use span_svm_std::Bytes32;

use crate::instructions::HyperProverError;
use crate::state::Config;

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct AddSenderArgs {
    pub sender: Bytes32,
}

#[derive(Accounts)]
pub struct AddSender<'info> {
    #[account(address = config.owner @ HyperProverError::InvalidOwner)]
    pub owner: Signer<'info>,
    #[account(mut, address = Config::pda().0 @ HyperProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
}

/// Whitelists another remote sender. Adding one that is already listed is a
/// no-op rather than an error.
pub fn add_sender(ctx: Context<AddSender>, args: AddSenderArgs) -> Result<()> {
    ctx.accounts.config.add_sender(args.sender)
}
