use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;
use span_svm_std::Bytes32;

use crate::instructions::HyperProverError;

pub const DISPATCHER_SEED: &[u8] = b"dispatcher";
pub const CONFIG_SEED: &[u8] = b"config";
pub const PDA_PAYER_SEED: &[u8] = b"pda_payer";
const MAX_WHITELIST_LEN: usize = 20;

#[account]
#[derive(InitSpace)]
pub struct ProofAccount(pub span_svm_std::prover::Proof);

impl AccountExt for ProofAccount {}

impl From<span_svm_std::prover::Proof> for ProofAccount {
    fn from(proof: span_svm_std::prover::Proof) -> Self {
        Self(proof)
    }
}

pub fn dispatcher_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], &crate::ID)
}

/// Rent payer for proof records created while handling inbound messages;
/// no external payer signs those transactions.
pub fn pda_payer_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PDA_PAYER_SEED], &crate::ID)
}

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub owner: Pubkey,
    pub fee_collector: Pubkey,
    pub base_fee: u64,
    pub fee_per_pair: u64,
    #[max_len(MAX_WHITELIST_LEN)]
    pub whitelisted_senders: Vec<Bytes32>,
}

impl Config {
    pub fn new(
        owner: Pubkey,
        fee_collector: Pubkey,
        base_fee: u64,
        fee_per_pair: u64,
        whitelisted_senders: Vec<Bytes32>,
    ) -> Result<Self> {
        if whitelisted_senders.len() > MAX_WHITELIST_LEN {
            return Err(HyperProverError::TooManyWhitelistedSenders.into());
        }

        Ok(Self {
            owner,
            fee_collector,
            base_fee,
            fee_per_pair,
            whitelisted_senders,
        })
    }

    pub fn add_sender(&mut self, sender: Bytes32) -> Result<()> {
        if self.whitelisted_senders.contains(&sender) {
            return Ok(());
        }
        if self.whitelisted_senders.len() == MAX_WHITELIST_LEN {
            return Err(HyperProverError::TooManyWhitelistedSenders.into());
        }

        self.whitelisted_senders.push(sender);

        Ok(())
    }

    pub fn pda() -> (Pubkey, u8) {
        Pubkey::find_program_address(&[CONFIG_SEED], &crate::ID)
    }

    pub fn is_whitelisted(&self, sender: &Bytes32) -> bool {
        self.whitelisted_senders.contains(sender)
    }

    /// Price of relaying `pair_count` pairs through this adapter.
    pub fn quote(&self, pair_count: usize) -> Result<u64> {
        self.fee_per_pair
            .checked_mul(pair_count as u64)
            .and_then(|pair_fees| pair_fees.checked_add(self.base_fee))
            .ok_or(HyperProverError::FeeOverflow.into())
    }
}

impl AccountExt for Config {}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_fee: u64, fee_per_pair: u64) -> Config {
        Config::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            base_fee,
            fee_per_pair,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn pdas_deterministic() {
        assert_eq!(dispatcher_pda(), dispatcher_pda());
        assert_eq!(pda_payer_pda(), pda_payer_pda());
        assert_eq!(Config::pda(), Config::pda());
        assert_ne!(dispatcher_pda().0, pda_payer_pda().0);
    }

    #[test]
    fn config_new_too_many_senders() {
        let whitelisted_senders = vec![[0u8; 32].into(); MAX_WHITELIST_LEN + 1];

        assert!(Config::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0,
            0,
            whitelisted_senders
        )
        .is_err());
    }

    #[test]
    fn config_is_whitelisted() {
        let sender_1: Bytes32 = [1u8; 32].into();
        let sender_2: Bytes32 = [2u8; 32].into();
        let stranger: Bytes32 = [3u8; 32].into();

        let mut config = config(0, 0);
        config.add_sender(sender_1).unwrap();
        config.add_sender(sender_2).unwrap();

        assert!(config.is_whitelisted(&sender_1));
        assert!(config.is_whitelisted(&sender_2));
        assert!(!config.is_whitelisted(&stranger));
    }

    #[test]
    fn add_sender_is_idempotent_and_bounded() {
        let sender: Bytes32 = [1u8; 32].into();
        let mut config = config(0, 0);

        config.add_sender(sender).unwrap();
        config.add_sender(sender).unwrap();
        assert_eq!(config.whitelisted_senders.len(), 1);

        for i in 1..MAX_WHITELIST_LEN {
            config.add_sender([i as u8 + 1; 32].into()).unwrap();
        }
        assert!(config.add_sender([0xffu8; 32].into()).is_err());
    }

    #[test]
    fn quote_scales_with_pair_count() {
        let config = config(100, 7);

        assert_eq!(config.quote(0).unwrap(), 100);
        assert_eq!(config.quote(3).unwrap(), 121);
    }

    #[test]
    fn quote_overflow_fails() {
        let config = config(1, u64::MAX);

        assert!(config.quote(2).is_err());
    }
}
