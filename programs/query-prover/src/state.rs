use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;
use span_svm_std::Bytes32;

use crate::instructions::QueryProverError;

pub const REQUESTER_SEED: &[u8] = b"requester";
pub const CONFIG_SEED: &[u8] = b"config";
pub const PDA_PAYER_SEED: &[u8] = b"pda_payer";
const MAX_TRUSTED_PORTALS: usize = 20;

#[account]
#[derive(InitSpace)]
pub struct ProofAccount(pub span_svm_std::prover::Proof);

impl AccountExt for ProofAccount {}

impl From<span_svm_std::prover::Proof> for ProofAccount {
    fn from(proof: span_svm_std::prover::Proof) -> Self {
        Self(proof)
    }
}

/// Signer under which this program requests queries from the router; the
/// router attributes results to it.
pub fn requester_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REQUESTER_SEED], &crate::ID)
}

/// Rent payer for proof records created while resolving query results.
pub fn pda_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_PAYER_SEED], &crate::ID)
}

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub fee_collector: Pubkey,
    pub base_fee: u64,
    pub fee_per_query: u64,
    #[max_len(MAX_TRUSTED_PORTALS)]
    pub trusted_portals: Vec<Bytes32>,
}

impl Config {
    pub fn new(
        fee_collector: Pubkey,
        base_fee: u64,
        fee_per_query: u64,
        trusted_portals: Vec<Bytes32>,
    ) -> Result<Self> {
        if trusted_portals.len() > MAX_TRUSTED_PORTALS {
            return Err(QueryProverError::TooManyTrustedPortals.into());
        }

        Ok(Self {
            fee_collector,
            base_fee,
            fee_per_query,
            trusted_portals,
        })
    }

    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }

    pub fn is_trusted_portal(&self, portal: &Bytes32) -> bool {
        self.trusted_portals.contains(portal)
    }

    /// Price of reading `query_count` fulfillment entries from a remote
    /// chain through the router.
    pub fn quote(&self, query_count: usize) -> Result<u64> {
        self.fee_per_query
            .checked_mul(query_count as u64)
            .and_then(|query_fees| query_fees.checked_add(self.base_fee))
            .ok_or(QueryProverError::FeeOverflow.into())
    }
}

impl AccountExt for Config {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdas_deterministic() {
        assert_eq!(requester_pda(), requester_pda());
        assert_eq!(pda_payer_pda(), pda_payer_pda());
        assert_eq!(Config::pda(), Config::pda());
        assert_ne!(requester_pda().0, pda_payer_pda().0);
    }

    #[test]
    fn config_new_too_many_portals() {
        let trusted_portals = vec![[0u8; 32].into(); MAX_TRUSTED_PORTALS + 1];

        assert!(Config::new(Pubkey::new_unique(), 0, 0, trusted_portals).is_err());
    }

    #[test]
    fn config_trusted_portal_membership() {
        let portal_1: Bytes32 = [1u8; 32].into();
        let stranger: Bytes32 = [9u8; 32].into();

        let config = Config::new(Pubkey::new_unique(), 0, 0, vec![portal_1]).unwrap();

        assert!(config.is_trusted_portal(&portal_1));
        assert!(!config.is_trusted_portal(&stranger));
    }

    #[test]
    fn quote_scales_with_query_count() {
        let config = Config::new(Pubkey::new_unique(), 50, 10, vec![]).unwrap();

        assert_eq!(config.quote(0).unwrap(), 50);
        assert_eq!(config.quote(4).unwrap(), 90);
    }

    #[test]
    fn quote_overflow_fails() {
        let config = Config::new(Pubkey::new_unique(), 1, u64::MAX, vec![]).unwrap();

        assert!(config.quote(2).is_err());
    }
}
