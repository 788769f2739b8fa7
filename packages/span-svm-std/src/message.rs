use anchor_lang::prelude::*;
use derive_more::Deref;

use crate::Bytes32;

const PAIR_LEN: usize = 64;
const CHAIN_PREFIX_LEN: usize = 8;

/// Proof message body: ordered `(intent_hash, claimant)` pairs.
///
/// The wire form is the plain concatenation of fixed 64-byte pairs so that
/// every bridge adapter, on every chain, produces and parses the exact same
/// bytes. Adapters whose transport does not authenticate the origin chain
/// prefix the body with an 8-byte big-endian chain id.
#[derive(AnchorSerialize, AnchorDeserialize, Deref, Clone, Debug, PartialEq, Eq)]
pub struct IntentHashesClaimants(Vec<(Bytes32, Bytes32)>);

impl IntentHashesClaimants {
    pub fn new(pairs: Vec<(Bytes32, Bytes32)>) -> Self {
        Self(pairs)
    }

    pub fn intent_hashes(&self) -> impl Iterator<Item = &Bytes32> {
        self.0.iter().map(|(intent_hash, _)| intent_hash)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0
            .iter()
            .flat_map(|(intent_hash, claimant)| {
                intent_hash.into_iter().chain(claimant.into_iter())
            })
            .collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() % PAIR_LEN != 0 {
            return None;
        }

        let pairs = bytes
            .chunks_exact(PAIR_LEN)
            .map(|pair| {
                let intent_hash = <[u8; 32]>::try_from(&pair[..32]).expect("chunk is 64 bytes");
                let claimant = <[u8; 32]>::try_from(&pair[32..]).expect("chunk is 64 bytes");

                (intent_hash.into(), claimant.into())
            })
            .collect();

        Some(Self(pairs))
    }

    pub fn to_prefixed_bytes(&self, chain_id: u64) -> Vec<u8> {
        chain_id
            .to_be_bytes()
            .into_iter()
            .chain(self.to_bytes())
            .collect()
    }

    pub fn from_prefixed_bytes(bytes: &[u8]) -> Option<(u64, Self)> {
        if bytes.len() < CHAIN_PREFIX_LEN {
            return None;
        }

        let (prefix, body) = bytes.split_at(CHAIN_PREFIX_LEN);
        let chain_id = u64::from_be_bytes(prefix.try_into().expect("prefix is 8 bytes"));

        Self::from_bytes(body).map(|pairs| (chain_id, pairs))
    }
}

impl From<IntentHashesClaimants> for Vec<(Bytes32, Bytes32)> {
    fn from(pairs: IntentHashesClaimants) -> Self {
        pairs.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> IntentHashesClaimants {
        IntentHashesClaimants::new(vec![
            ([1u8; 32].into(), [2u8; 32].into()),
            ([3u8; 32].into(), [4u8; 32].into()),
        ])
    }

    #[test]
    fn codec_is_exact_inverse() {
        let encoded = pairs().to_bytes();

        assert_eq!(encoded.len(), 128);
        assert_eq!(&encoded[..32], &[1u8; 32]);
        assert_eq!(&encoded[32..64], &[2u8; 32]);
        assert_eq!(IntentHashesClaimants::from_bytes(&encoded), Some(pairs()));
    }

    #[test]
    fn empty_body_decodes_to_no_pairs() {
        assert_eq!(
            IntentHashesClaimants::from_bytes(&[]),
            Some(IntentHashesClaimants::new(vec![]))
        );
    }

    #[test]
    fn truncated_body_is_rejected() {
        let mut encoded = pairs().to_bytes();
        encoded.pop();

        assert_eq!(IntentHashesClaimants::from_bytes(&encoded), None);
    }

    #[test]
    fn prefixed_codec_carries_chain_id() {
        let encoded = pairs().to_prefixed_bytes(1399811150);

        assert_eq!(encoded.len(), 8 + 128);
        assert_eq!(
            IntentHashesClaimants::from_prefixed_bytes(&encoded),
            Some((1399811150, pairs()))
        );
    }

    #[test]
    fn prefixed_codec_rejects_short_input() {
        assert_eq!(IntentHashesClaimants::from_prefixed_bytes(&[0u8; 7]), None);
    }
}
