use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_error::ProgramError;
use anchor_lang::system_program;
use derive_new::new;

use crate::message::IntentHashesClaimants;
use crate::Bytes32;

pub const PROOF_SEED: &[u8] = b"proof";
pub const PROVE_DISCRIMINATOR: [u8; 8] = [52, 246, 26, 161, 211, 170, 86, 215];

/// Record that an intent was fulfilled, keyed by intent hash under the
/// owning prover program. `destination` is the chain the fulfillment was
/// observed on; a record whose destination does not match the intent's true
/// destination is invalid and subject to [`challenge_proof`].
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Default, new, Debug, PartialEq, Eq)]
pub struct Proof {
    pub destination: u64,
    pub claimant: Pubkey,
}

impl Proof {
    pub fn pda(intent_hash: &Bytes32, prover: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[PROOF_SEED, intent_hash.as_ref()], prover)
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

/// The uniform prove call every bridge adapter accepts. `data` carries
/// adapter-specific configuration (e.g. the remote prover address) and `fee`
/// is the payment supplied for the dispatch; adapters reject calls paying
/// less than their own quote.
#[derive(AnchorSerialize, AnchorDeserialize, new)]
pub struct ProveArgs {
    pub source: u64,
    pub intent_hashes_claimants: IntentHashesClaimants,
    pub data: Vec<u8>,
    pub fee: u64,
}

/// Identifies the proof record to challenge by the intent's public fields,
/// so the prover can re-derive the true intent hash itself.
#[derive(AnchorSerialize, AnchorDeserialize, new)]
pub struct ChallengeArgs {
    pub destination: u64,
    pub route_hash: Bytes32,
    pub reward_hash: Bytes32,
}

#[event]
#[derive(new)]
pub struct IntentProven {
    intent_hash: Bytes32,
    claimant: Bytes32,
    destination: u64,
}

#[event]
#[derive(new)]
pub struct IntentAlreadyProven {
    intent_hash: Bytes32,
}

#[event]
#[derive(new)]
pub struct ProofChallenged {
    intent_hash: Bytes32,
    recorded_destination: u64,
    expected_destination: u64,
}

/// Clears a proof record whose recorded destination does not match the
/// intent's true destination. Anyone may call this through a prover's
/// `challenge` instruction; a missing or matching record is a no-op, so the
/// operation is idempotent. Returns whether a record was cleared.
pub fn challenge_proof<'info>(
    proof: &AccountInfo<'info>,
    rent_recipient: &AccountInfo<'info>,
    intent_hash: &Bytes32,
    expected_destination: u64,
) -> Result<bool> {
    let recorded = match Proof::try_from_account_info(proof)? {
        None => return Ok(false),
        Some(recorded) if recorded.destination == expected_destination => return Ok(false),
        Some(recorded) => recorded,
    };

    close_record_account(proof, rent_recipient)?;

    emit!(ProofChallenged::new(
        *intent_hash,
        recorded.destination,
        expected_destination,
    ));

    Ok(true)
}

fn close_record_account<'info>(
    account: &AccountInfo<'info>,
    rent_recipient: &AccountInfo<'info>,
) -> Result<()> {
    let balance = account.lamports();
    let recipient_balance = rent_recipient.lamports();

    **account.try_borrow_mut_lamports()? = 0;
    **rent_recipient.try_borrow_mut_lamports()? = recipient_balance
        .checked_add(balance)
        .ok_or(ProgramError::ArithmeticOverflow)?;

    account.assign(&system_program::ID);
    account.realloc(0, false).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_pda_deterministic() {
        let intent_hash: Bytes32 = [42u8; 32].into();
        let prover = Pubkey::new_from_array([123u8; 32]);

        let (pda_1, bump_1) = Proof::pda(&intent_hash, &prover);
        let (pda_2, bump_2) = Proof::pda(&intent_hash, &prover);

        assert_eq!((pda_1, bump_1), (pda_2, bump_2));
        assert_ne!(pda_1, Proof::pda(&[43u8; 32].into(), &prover).0);
        assert_ne!(
            pda_1,
            Proof::pda(&intent_hash, &Pubkey::new_from_array([124u8; 32])).0
        );
    }

    #[test]
    fn proof_from_empty_account_is_none() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = vec![];

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

        assert_eq!(Proof::try_from_account_info(&account).unwrap(), None);
    }

    #[test]
    fn proof_from_initialized_account() {
        let proof = Proof::new(1399811150, Pubkey::new_unique());
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = [0u8; 8]
            .into_iter()
            .chain(proof.try_to_vec().unwrap())
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

        assert_eq!(Proof::try_from_account_info(&account).unwrap(), Some(proof));
    }
}
