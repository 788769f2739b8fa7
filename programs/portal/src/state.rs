use anchor_lang::prelude::*;
use derive_new::new;
use span_svm_std::account::AccountExt;
use span_svm_std::Bytes32;

pub const VAULT_SEED: &[u8] = b"vault";
pub const SETTLED_MARKER_SEED: &[u8] = b"settled_marker";
pub const FULFILL_MARKER_SEED: &[u8] = b"fulfill_marker";
pub const EXECUTOR_SEED: &[u8] = b"executor";
pub const DISPATCHER_SEED: &[u8] = b"dispatcher";

/// Escrow address for one intent: deterministic in the portal id and the
/// intent hash, so any party derives it from public fields alone.
pub fn vault_pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, intent_hash.as_ref()], &crate::ID)
}

pub fn executor_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EXECUTOR_SEED], &crate::ID)
}

/// Signer under which the portal calls into prover programs; provers accept
/// `prove` only from this authority.
pub fn dispatcher_pda() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DISPATCHER_SEED], &crate::ID)
}

/// Reward lifecycle, derived on demand. The funded states come from live
/// vault balances, the terminal states from the settled marker; none of it
/// is a stored flag that could go stale.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentStatus {
    Unfunded,
    PartiallyFunded,
    Funded,
    Claimed,
    Refunded,
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementKind {
    Withdrawn,
    Refunded,
}

/// Terminal marker for an intent's vault. Written exactly once, before any
/// funds leave the vault; its existence is what makes withdraw and refund
/// mutually exclusive and unrepeatable.
#[account]
#[derive(InitSpace, new, Debug)]
pub struct SettledMarker {
    pub kind: SettlementKind,
}

impl AccountExt for SettledMarker {}

impl SettledMarker {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[SETTLED_MARKER_SEED, intent_hash.as_ref()], &crate::ID)
    }

    pub fn try_from_account_info(account: &AccountInfo<'_>) -> Result<Option<Self>> {
        account
            .data
            .borrow()
            .get(8..)
            .map(Self::try_from_slice)
            .transpose()
            .map_err(Into::into)
    }
}

/// Destination-side record of who fulfilled an intent. Initialized exactly
/// once per intent hash; re-fulfillment fails instead of overwriting.
#[account]
#[derive(InitSpace, new, Debug)]
pub struct FulfillMarker {
    pub claimant: Pubkey,
    pub bump: u8,
}

impl AccountExt for FulfillMarker {}

impl FulfillMarker {
    pub fn pda(intent_hash: &Bytes32) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[FULFILL_MARKER_SEED, intent_hash.as_ref()], &crate::ID)
    }

    pub fn try_from_account_info(account: &AccountInfo<'_>) -> Result<Option<Self>> {
        account
            .data
            .borrow()
            .get(8..)
            .map(Self::try_from_slice)
            .transpose()
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_pda_deterministic() {
        let intent_hash: Bytes32 = [6u8; 32].into();

        assert_eq!(vault_pda(&intent_hash), vault_pda(&intent_hash));
        assert_ne!(vault_pda(&intent_hash).0, vault_pda(&[7u8; 32].into()).0);
    }

    #[test]
    fn marker_pdas_are_scoped_by_seed() {
        let intent_hash: Bytes32 = [6u8; 32].into();

        let vault = vault_pda(&intent_hash).0;
        let settled = SettledMarker::pda(&intent_hash).0;
        let fulfill = FulfillMarker::pda(&intent_hash).0;

        assert_ne!(vault, settled);
        assert_ne!(vault, fulfill);
        assert_ne!(settled, fulfill);
    }

    #[test]
    fn settled_marker_roundtrip() {
        let marker = SettledMarker::new(SettlementKind::Refunded);
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0;
        let mut data = [0u8; 8]
            .into_iter()
            .chain(marker.try_to_vec().unwrap())
            .collect::<Vec<_>>();

        let account = AccountInfo::new(
            &key,
            false,
            false,
            &mut lamports,
            &mut data,
            &owner,
            false,
            0,
        );

        let loaded = SettledMarker::try_from_account_info(&account)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.kind, SettlementKind::Refunded);
    }
}
