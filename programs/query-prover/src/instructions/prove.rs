use anchor_lang::prelude::*;
use anchor_lang::system_program;
use span_svm_std::prover::ProveArgs;
use span_svm_std::{Bytes32, CHAIN_ID};

use crate::instructions::QueryProverError;
use crate::reader;
use crate::state::{requester_pda, Config, REQUESTER_SEED};

#[derive(Accounts)]
#[instruction(args: ProveArgs)]
pub struct Prove<'info> {
    /// CHECK: address is validated
    #[account(address = requester_pda().0 @ QueryProverError::InvalidRequester)]
    pub requester: UncheckedAccount<'info>,
    #[account(address = Config::pda().0 @ QueryProverError::InvalidConfig)]
    pub config: Account<'info, Config>,
    /// CHECK: address is validated
    #[account(mut, address = config.fee_collector @ QueryProverError::InvalidFeeCollector)]
    pub fee_collector: UncheckedAccount<'info>,
    #[account(mut)]
    pub payer: Signer<'info>,
    /// CHECK: Checked in CPI
    #[account(mut)]
    pub query_state_pda: UncheckedAccount<'info>,
    pub unique_query: Signer<'info>,
    pub system_program: Program<'info, System>,
    /// CHECK: address is validated
    #[account(executable, address = reader::QUERY_ROUTER_ID @ QueryProverError::InvalidRouter)]
    pub router_program: UncheckedAccount<'info>,
}

/// Requests a verified read of a remote portal's fulfillment records for a
/// batch of intent hashes. The attested result arrives later through
/// `resolve`, which is where proof records get written.
///
/// This adapter pulls instead of pushes, so nothing here depends on local
/// fulfill markers and the call is permissionless: whoever pays the query
/// fee may request a read. `data` names the chain to query and the portal
/// on it, as an 8-byte big-endian chain id followed by a 32-byte address.
pub fn prove_intent(ctx: Context<Prove>, args: ProveArgs) -> Result<()> {
    let ProveArgs {
        source,
        intent_hashes_claimants,
        data,
        fee,
    } = args;

    require!(source == CHAIN_ID, QueryProverError::InvalidData);

    let (target_domain, target_portal) = validated_query_target(&data)?;
    require!(
        ctx.accounts.config.is_trusted_portal(&target_portal),
        QueryProverError::UntrustedPortal
    );

    let quote = ctx.accounts.config.quote(intent_hashes_claimants.len())?;
    require!(fee >= quote, QueryProverError::InsufficientFee);
    collect_fee(&ctx, quote)?;

    let query_data: Vec<u8> = intent_hashes_claimants
        .intent_hashes()
        .flat_map(|intent_hash| *intent_hash)
        .collect();

    let (_, bump) = requester_pda();
    let signer_seeds = [REQUESTER_SEED, &[bump]];

    reader::dispatch_query(&ctx, target_domain, target_portal, query_data, &signer_seeds)
}

/// Parses and narrows the query target so `prove` and `fetch_fee` reject
/// the same inputs.
pub(crate) fn validated_query_target(data: &[u8]) -> Result<(u32, Bytes32)> {
    let (chain, portal) = parse_query_target(data)?;

    Ok((chain_to_router_domain(chain)?, portal))
}

fn parse_query_target(data: &[u8]) -> Result<(u64, Bytes32)> {
    if data.len() != 8 + 32 {
        return Err(QueryProverError::InvalidData.into());
    }

    let chain = u64::from_be_bytes(data[..8].try_into().expect("slice is 8 bytes"));
    let portal: Bytes32 = <[u8; 32]>::try_from(&data[8..])
        .expect("slice is 32 bytes")
        .into();

    Ok((chain, portal))
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

// The router's domain ids coincide with the chain ids this protocol uses.
fn chain_to_router_domain(chain: u64) -> Result<u32> {
    chain
        .try_into()
        .map_err(|_| QueryProverError::ChainIdTooLarge.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_target_roundtrip() {
        let data: Vec<u8> = 8453u64
            .to_be_bytes()
            .into_iter()
            .chain([7u8; 32])
            .collect();

        let (chain, portal) = parse_query_target(&data).unwrap();
        assert_eq!(chain, 8453);
        assert_eq!(portal, Bytes32::from([7u8; 32]));
    }

    #[test]
    fn parse_query_target_wrong_length_fails() {
        assert!(parse_query_target(&[0u8; 39]).is_err());
        assert!(parse_query_target(&[0u8; 41]).is_err());
    }

    #[test]
    fn chain_to_router_domain_narrows() {
        assert_eq!(chain_to_router_domain(10).unwrap(), 10);
        assert!(chain_to_router_domain(u32::MAX as u64 + 1).is_err());
    }

    #[test]
    fn validated_query_target_rejects_oversized_chain() {
        let data: Vec<u8> = (u32::MAX as u64 + 1)
            .to_be_bytes()
            .into_iter()
            .chain([7u8; 32])
            .collect();

        assert!(validated_query_target(&data).is_err());
    }
}
