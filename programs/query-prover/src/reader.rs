use anchor_lang::prelude::borsh::{BorshDeserialize, BorshSerialize};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;
use anchor_lang::system_program;
use span_svm_std::Bytes32;

use crate::instructions::Prove;

#[cfg(feature = "mainnet")]
pub const QUERY_ROUTER_ID: Pubkey = pubkey!("3xWKJ4nFYpabueCZsjhU8MBA8Hssu6ihtKdGxy3JvVx3");
#[cfg(not(feature = "mainnet"))]
pub const QUERY_ROUTER_ID: Pubkey = pubkey!("GE1WXrnXaRXAEytdVDEs69fedtjypgwTADWUzhY8hNnG");

/// Discriminator of this program's `resolve` instruction, which the router
/// invokes to deliver verified query results.
pub const RESOLVE_DISCRIMINATOR: [u8; 8] = [246, 150, 236, 206, 108, 63, 58, 10];

/// The only signer the router uses when delivering results to this program.
pub fn process_authority_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"query_router",
            b"-",
            b"process_authority",
            b"-",
            crate::ID.as_ref(),
        ],
        &QUERY_ROUTER_ID,
    )
}

// The router's instructions copied from their code.
// Even though we are only using RequestQuery, it
// is critical to keep the rest because borsh serialization
// is dependent on the enum variant order.
#[derive(BorshSerialize, BorshDeserialize)]
#[allow(dead_code)]
pub enum QueryRouterInstruction {
    Init,
    RequestQuery(RequestQuery),
    CancelQuery(Pubkey),
    GetQueryStatus(Pubkey),
    TransferOwnership(Option<Pubkey>),
    ClaimFees,
}

/// A verified-read request: ask `target_chain` for the fulfillment state
/// `target` holds for `query_data`, and call back into the requester's
/// `resolve` with the attested result.
#[derive(BorshSerialize, BorshDeserialize)]
pub struct RequestQuery {
    pub requester: Pubkey,
    pub target_chain: u32,
    pub target: [u8; 32],
    pub query_data: Vec<u8>,
    pub callback_discriminator: [u8; 8],
}

pub fn dispatch_query(
    ctx: &Context<Prove>,
    target_chain: u32,
    target: Bytes32,
    query_data: Vec<u8>,
    signer_seeds: &[&[u8]],
) -> Result<()> {
    let request = QueryRouterInstruction::RequestQuery(RequestQuery {
        requester: ctx.accounts.requester.key(),
        target_chain,
        target: target.into(),
        query_data,
        callback_discriminator: RESOLVE_DISCRIMINATOR,
    });
    let ix = Instruction {
        program_id: QUERY_ROUTER_ID,
        accounts: vec![
            AccountMeta::new(ctx.accounts.query_state_pda.key(), false),
            AccountMeta::new_readonly(ctx.accounts.requester.key(), true),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new(ctx.accounts.payer.key(), true),
            AccountMeta::new_readonly(ctx.accounts.unique_query.key(), true),
        ],
        data: request.try_to_vec()?,
    };

    invoke_signed(
        &ix,
        &[
            ctx.accounts.query_state_pda.to_account_info(),
            ctx.accounts.requester.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
            ctx.accounts.payer.to_account_info(),
            ctx.accounts.unique_query.to_account_info(),
        ],
        &[signer_seeds],
    )
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_authority_pda_deterministic() {
        assert_eq!(process_authority_pda(), process_authority_pda());
        assert_ne!(process_authority_pda().0, crate::ID);
    }
}
