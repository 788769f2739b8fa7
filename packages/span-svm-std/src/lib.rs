use anchor_lang::prelude::*;
use derive_more::Deref;
use tiny_keccak::{Hasher, Keccak};

pub mod account;
pub mod message;
pub mod prover;

#[cfg(feature = "mainnet")]
pub const CHAIN_ID: u64 = 1399811149;
#[cfg(not(feature = "mainnet"))]
pub const CHAIN_ID: u64 = 1399811150;

const PROVERS: [Pubkey; 3] = [
    pubkey!("Bdd9H1vff8w4guoAvZdDLr54rmYP6GoA9yP7PifHXyTU"),
    pubkey!("GQ7xobzQi9YzV8emyFCYgGvhgCK84VwZet59uGH3RxX8"),
    pubkey!("2KutYVSgraxo9nQesLiTNG38fyXZPjfUaCHCxofSmu4c"),
];

/// Route calls must never land on a prover, which would let a forged
/// fulfillment write its own proof record.
pub fn is_prover(program_id: &Pubkey) -> bool {
    PROVERS.contains(program_id)
}

/// Anchor's event CPI authority for a program.
pub fn event_authority_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"__event_authority"], program_id)
}

/// Canonical 32-byte identifier. Addresses, hashes and remote chain
/// identifiers are always carried in this width; narrower external encodings
/// are widened on the way in and narrowed with explicit checks on the way out.
#[derive(
    AnchorSerialize, AnchorDeserialize, InitSpace, Deref, Clone, Copy, Debug, Default, PartialEq,
    Eq,
)]
pub struct Bytes32([u8; 32]);

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(bytes)
    }
}

impl From<Bytes32> for [u8; 32] {
    fn from(bytes: Bytes32) -> Self {
        bytes.0
    }
}

impl From<Pubkey> for Bytes32 {
    fn from(pubkey: Pubkey) -> Self {
        Bytes32(pubkey.to_bytes())
    }
}

impl PartialEq<Pubkey> for Bytes32 {
    fn eq(&self, pubkey: &Pubkey) -> bool {
        self.0 == pubkey.to_bytes()
    }
}

impl IntoIterator for Bytes32 {
    type Item = u8;
    type IntoIter = std::array::IntoIter<u8, 32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Bytes32 {
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    /// Widens a 20-byte EVM address into its canonical left-padded form.
    pub fn from_evm_address(address: [u8; 20]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[12..].copy_from_slice(&address);
        Bytes32(bytes)
    }

    /// Narrows back to a 20-byte EVM address. Fails when the value does not
    /// fit, rather than truncating.
    pub fn to_evm_address(&self) -> Option<[u8; 20]> {
        if self.0[..12] != [0u8; 12] {
            return None;
        }

        let mut address = [0u8; 20];
        address.copy_from_slice(&self.0[12..]);
        Some(address)
    }

    /// Interprets the identifier as a claimant account on this chain.
    ///
    /// Left-padded values are foreign-VM addresses and the zero identifier is
    /// never a payable account; neither is representable here.
    pub fn claimant_pubkey(&self) -> Option<Pubkey> {
        if self.0[..12] == [0u8; 12] {
            return None;
        }

        Some(Pubkey::new_from_array(self.0))
    }
}

/// `H(destination ‖ route_hash ‖ reward_hash)`, the identifier every party
/// derives independently from an intent's public fields.
pub fn intent_hash(destination: u64, route_hash: &Bytes32, reward_hash: &Bytes32) -> Bytes32 {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];

    hasher.update(destination.to_be_bytes().as_slice());
    hasher.update(route_hash.as_ref());
    hasher.update(reward_hash.as_ref());

    hasher.finalize(&mut hash);

    hash.into()
}

/// Serializable version of Solana's `AccountMeta` for cross-chain
/// communication, used to reconstruct account lists on the destination chain
/// during intent fulfillment.
#[derive(AnchorDeserialize, AnchorSerialize, Debug)]
pub struct SerializableAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl From<AccountInfo<'_>> for SerializableAccountMeta {
    fn from(account_info: AccountInfo<'_>) -> Self {
        Self {
            pubkey: account_info.key(),
            is_signer: account_info.is_signer,
            is_writable: account_info.is_writable,
        }
    }
}

impl From<AccountMeta> for SerializableAccountMeta {
    fn from(account_meta: AccountMeta) -> Self {
        Self {
            pubkey: account_meta.pubkey,
            is_signer: account_meta.is_signer,
            is_writable: account_meta.is_writable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_hash_deterministic() {
        let route_hash = [7u8; 32].into();
        let reward_hash = [9u8; 32].into();

        let hash_1 = intent_hash(1000, &route_hash, &reward_hash);
        let hash_2 = intent_hash(1000, &route_hash, &reward_hash);

        assert_eq!(hash_1, hash_2);
        assert_ne!(hash_1, intent_hash(1001, &route_hash, &reward_hash));
        assert_ne!(hash_1, intent_hash(1000, &reward_hash, &route_hash));
    }

    #[test]
    fn evm_address_widening_roundtrip() {
        let address = [0xabu8; 20];
        let wide = Bytes32::from_evm_address(address);

        assert_eq!(wide.as_ref()[..12], [0u8; 12]);
        assert_eq!(wide.to_evm_address(), Some(address));
    }

    #[test]
    fn evm_address_narrowing_fails_loudly() {
        let wide: Bytes32 = [1u8; 32].into();

        assert_eq!(wide.to_evm_address(), None);
    }

    #[test]
    fn claimant_pubkey_native() {
        let claimant: Bytes32 = Pubkey::new_unique().into();

        assert_eq!(
            claimant.claimant_pubkey(),
            Some(Pubkey::new_from_array(claimant.into()))
        );
    }

    #[test]
    fn claimant_pubkey_unrepresentable() {
        assert_eq!(Bytes32::ZERO.claimant_pubkey(), None);
        assert_eq!(
            Bytes32::from_evm_address([0x11u8; 20]).claimant_pubkey(),
            None
        );
    }
}
