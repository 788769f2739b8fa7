use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token};
use anchor_spl::token_2022::{self, Token2022};
use anchor_spl::token_interface::{transfer_checked, Mint, TokenAccount};
use itertools::Itertools;
use span_svm_std::{Bytes32, SerializableAccountMeta};
use tiny_keccak::{Hasher, Keccak};

use crate::instructions::PortalError;

pub use span_svm_std::intent_hash;

pub const TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE: usize = 3;

/// The unit of settlement: what must happen on the destination chain
/// (`route`) and what is paid out on this chain for proving it (`reward`).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Intent {
    pub destination: u64,
    pub route: Route,
    pub reward: Reward,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Route {
    pub salt: Bytes32,
    pub deadline: i64,
    pub portal: Bytes32,
    pub tokens: Vec<TokenAmount>,
    pub calls: Vec<Call>,
}

impl Route {
    /// Keccak-256 of the Borsh encoding. All identifier fields are already
    /// canonical 32-byte values, so logically equal routes hash identically
    /// no matter which external encoding they arrived in.
    pub fn hash(&self) -> Bytes32 {
        keccak_of_encoding(self.try_to_vec().expect("failed to serialize Route"))
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }

    pub fn native_amount(&self) -> Result<u64> {
        self.calls.iter().try_fold(0u64, |total, call| {
            total
                .checked_add(call.value)
                .ok_or(PortalError::TokenAmountOverflow.into())
        })
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Reward {
    pub deadline: i64,
    pub creator: Pubkey,
    pub prover: Pubkey,
    pub native_amount: u64,
    pub tokens: Vec<TokenAmount>,
}

impl Reward {
    pub fn hash(&self) -> Bytes32 {
        keccak_of_encoding(self.try_to_vec().expect("failed to serialize Reward"))
    }

    pub fn token_amounts(&self) -> Result<BTreeMap<Pubkey, u64>> {
        token_amounts(&self.tokens)
    }
}

fn keccak_of_encoding(encoded: Vec<u8>) -> Bytes32 {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];

    hasher.update(&encoded);
    hasher.finalize(&mut hash);

    hash.into()
}

/// Aggregates a token list into canonical (ordered, deduplicated) per-mint
/// totals. Funding and withdrawal both work off this map, never off the raw
/// list, so duplicate entries cannot double-count.
fn token_amounts(tokens: &[TokenAmount]) -> Result<BTreeMap<Pubkey, u64>> {
    tokens
        .iter()
        .try_fold(BTreeMap::<Pubkey, u64>::new(), |mut result, token| {
            let entry = result.entry(token.token).or_default();
            *entry = entry
                .checked_add(token.amount)
                .ok_or(PortalError::TokenAmountOverflow)?;

            Ok(result)
        })
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct TokenAmount {
    pub token: Pubkey,
    pub amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Call {
    pub target: Bytes32,
    pub data: Vec<u8>,
    pub value: u64,
}

/// Minimal calldata that fits the instruction size limit. The account list a
/// call needs is carried in the transaction and re-attached during fulfill;
/// `account_count` says how many of the trailing accounts belong to it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct Calldata {
    pub data: Vec<u8>,
    pub account_count: u8,
}

/// Complete calldata as hashed into the route on the source chain: the
/// instruction bytes plus the account metadata they execute against.
#[derive(AnchorSerialize, AnchorDeserialize, Debug)]
pub struct CalldataWithAccounts {
    pub calldata: Calldata,
    pub accounts: Vec<SerializableAccountMeta>,
}

impl CalldataWithAccounts {
    pub fn new<T>(calldata: Calldata, accounts: Vec<T>) -> Result<Self>
    where
        T: Into<SerializableAccountMeta>,
    {
        require!(
            accounts.len() == calldata.account_count as usize,
            PortalError::InvalidCalldata,
        );

        Ok(Self {
            calldata,
            accounts: accounts.into_iter().map(Into::into).collect(),
        })
    }
}

pub struct VecTokenTransferAccounts<'info>(Vec<TokenTransferAccounts<'info>>);

impl<'info> TryFrom<&[AccountInfo<'info>]> for VecTokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: &[AccountInfo<'info>]) -> Result<Self> {
        accounts
            .iter()
            .chunks(TOKEN_TRANSFER_ACCOUNTS_CHUNK_SIZE)
            .into_iter()
            .map(|chunk| chunk.collect::<Vec<_>>().try_into())
            .collect::<Result<Vec<TokenTransferAccounts>>>()
            .map(Self)
    }
}

impl<'info> VecTokenTransferAccounts<'info> {
    pub fn into_inner(self) -> Vec<TokenTransferAccounts<'info>> {
        self.0
    }
}

/// One `(from, to, mint)` triple from the remaining accounts of a funding or
/// draining instruction.
pub struct TokenTransferAccounts<'info> {
    pub from: AccountInfo<'info>,
    pub to: AccountInfo<'info>,
    pub mint: AccountInfo<'info>,
}

impl<'info> TryFrom<Vec<&AccountInfo<'info>>> for TokenTransferAccounts<'info> {
    type Error = anchor_lang::error::Error;

    fn try_from(accounts: Vec<&AccountInfo<'info>>) -> Result<Self> {
        match accounts.as_slice() {
            [from, to, mint] => {
                // all three must belong to the same token program
                let token_program = mint.owner;
                require!(
                    token_program == from.owner,
                    PortalError::InvalidTokenTransferAccounts
                );
                require!(
                    to.data_is_empty() || token_program == to.owner,
                    PortalError::InvalidTokenTransferAccounts
                );

                Ok(Self {
                    from: from.to_account_info(),
                    to: to.to_account_info(),
                    mint: mint.to_account_info(),
                })
            }
            _ => Err(PortalError::InvalidTokenTransferAccounts.into()),
        }
    }
}

impl<'info> TokenTransferAccounts<'info> {
    pub fn transfer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        match amount {
            0 => Ok(()),
            amount => transfer_checked(
                CpiContext::new(
                    token_program.to_account_info(),
                    anchor_spl::token_interface::TransferChecked {
                        from: self.from.to_account_info(),
                        to: self.to.to_account_info(),
                        mint: self.mint.to_account_info(),
                        authority: authority.to_account_info(),
                    },
                ),
                amount,
                self.mint_data()?.decimals,
            ),
        }
    }

    pub fn transfer_with_signer(
        &self,
        token_program: &AccountInfo<'info>,
        authority: &AccountInfo<'info>,
        signer_seeds: &[&[&[u8]]],
        amount: u64,
    ) -> Result<()> {
        match amount {
            0 => Ok(()),
            amount => transfer_checked(
                CpiContext::new_with_signer(
                    token_program.to_account_info(),
                    anchor_spl::token_interface::TransferChecked {
                        from: self.from.to_account_info(),
                        to: self.to.to_account_info(),
                        mint: self.mint.to_account_info(),
                        authority: authority.to_account_info(),
                    },
                    signer_seeds,
                ),
                amount,
                self.mint_data()?.decimals,
            ),
        }
    }

    pub fn token_program(
        &self,
        token_program: &Program<'info, Token>,
        token_2022_program: &Program<'info, Token2022>,
    ) -> Result<AccountInfo<'info>> {
        let token_program_id = self.token_program_id();

        if *token_program_id == token::ID {
            Ok(token_program.to_account_info())
        } else if *token_program_id == token_2022::ID {
            Ok(token_2022_program.to_account_info())
        } else {
            Err(PortalError::InvalidTokenProgram.into())
        }
    }

    pub fn token_program_id(&self) -> &Pubkey {
        self.mint.owner
    }

    pub fn mint_data(&self) -> Result<Mint> {
        Mint::try_deserialize(&mut &self.mint.try_borrow_data()?[..])
    }

    pub fn from_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.from.try_borrow_data()?[..])
    }

    pub fn to_data(&self) -> Result<TokenAccount> {
        TokenAccount::try_deserialize(&mut &self.to.try_borrow_data()?[..])
    }

    /// Balance actually sitting in `to`, zero when the account does not
    /// exist yet. Funding checks go through this rather than nominal
    /// amounts so fee-on-transfer and rebasing tokens are accounted for.
    pub fn to_balance(&self) -> Result<u64> {
        if self.to.data_is_empty() {
            return Ok(0);
        }

        Ok(self.to_data()?.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reward() -> Reward {
        Reward {
            deadline: 1_700_000_000,
            creator: Pubkey::new_from_array([1u8; 32]),
            prover: Pubkey::new_from_array([2u8; 32]),
            native_amount: 250,
            tokens: vec![
                TokenAmount {
                    token: Pubkey::new_from_array([40u8; 32]),
                    amount: 1000,
                },
                TokenAmount {
                    token: Pubkey::new_from_array([50u8; 32]),
                    amount: 2000,
                },
            ],
        }
    }

    fn route() -> Route {
        Route {
            salt: [1u8; 32].into(),
            deadline: 1_700_000_000,
            portal: [2u8; 32].into(),
            tokens: vec![TokenAmount {
                token: Pubkey::new_from_array([3u8; 32]),
                amount: 100,
            }],
            calls: vec![Call {
                target: [5u8; 32].into(),
                data: vec![1, 2, 3],
                value: 7,
            }],
        }
    }

    #[test]
    fn intent_hash_deterministic() {
        let destination = 1000;
        let route_hash: Bytes32 = [6u8; 32].into();
        let reward = reward();

        let hash_1 = intent_hash(destination, &route_hash, &reward.hash());
        let hash_2 = intent_hash(destination, &route_hash, &reward.hash());

        assert_eq!(hash_1, hash_2);
        assert_ne!(hash_1, intent_hash(destination + 1, &route_hash, &reward.hash()));
    }

    #[test]
    fn route_hash_representation_invariant() {
        // the same logical route built from a widened narrow-chain portal
        // address hashes identically to one built from canonical bytes
        let mut canonical = route();
        canonical.portal = {
            let mut bytes = [0u8; 32];
            bytes[12..].copy_from_slice(&[9u8; 20]);
            bytes.into()
        };

        let mut widened = route();
        widened.portal = Bytes32::from_evm_address([9u8; 20]);

        assert_eq!(canonical.hash(), widened.hash());
    }

    #[test]
    fn empty_lists_hash_to_constant() {
        let route = Route {
            salt: Bytes32::ZERO,
            deadline: 0,
            portal: Bytes32::ZERO,
            tokens: vec![],
            calls: vec![],
        };

        assert_eq!(route.hash(), route.hash());
        assert_ne!(route.hash(), Bytes32::ZERO);
    }

    #[test]
    fn token_amounts_aggregates_duplicates() {
        let reward = Reward {
            tokens: vec![
                TokenAmount {
                    token: Pubkey::new_from_array([3u8; 32]),
                    amount: 100,
                },
                TokenAmount {
                    token: Pubkey::new_from_array([4u8; 32]),
                    amount: 200,
                },
                TokenAmount {
                    token: Pubkey::new_from_array([3u8; 32]),
                    amount: 500,
                },
            ],
            ..reward()
        };

        let amounts = reward.token_amounts().unwrap();
        assert_eq!(amounts.len(), 2);
        assert_eq!(amounts[&Pubkey::new_from_array([3u8; 32])], 600);
        assert_eq!(amounts[&Pubkey::new_from_array([4u8; 32])], 200);
    }

    #[test]
    fn token_amounts_overflow_fails() {
        let reward = Reward {
            tokens: vec![
                TokenAmount {
                    token: Pubkey::new_from_array([3u8; 32]),
                    amount: u64::MAX,
                },
                TokenAmount {
                    token: Pubkey::new_from_array([3u8; 32]),
                    amount: 1,
                },
            ],
            ..reward()
        };

        assert!(reward.token_amounts().is_err());
    }

    #[test]
    fn route_native_amount_sums_call_values() {
        let mut route = route();
        route.calls.push(Call {
            target: [6u8; 32].into(),
            data: vec![],
            value: 13,
        });

        assert_eq!(route.native_amount().unwrap(), 20);
    }

    #[test]
    fn calldata_with_accounts_count_mismatch_fails() {
        let calldata = Calldata {
            data: vec![1, 2, 3],
            account_count: 2,
        };
        let accounts = vec![SerializableAccountMeta {
            pubkey: Pubkey::new_from_array([1u8; 32]),
            is_signer: false,
            is_writable: true,
        }];

        assert!(CalldataWithAccounts::new(calldata, accounts).is_err());
    }

    #[test]
    fn token_transfer_accounts_wrong_chunk_fails() {
        let token_program = anchor_spl::token::ID;
        let key = Pubkey::new_unique();
        let mut lamports = 0;
        let mut data = vec![];

        let account = AccountInfo::new(
            &key,
            false,
            false,
            &mut lamports,
            &mut data,
            &token_program,
            false,
            0,
        );

        assert!(TokenTransferAccounts::try_from(vec![&account, &account]).is_err());
    }

    #[test]
    fn token_transfer_accounts_mismatched_owners_fail() {
        let token_program = anchor_spl::token::ID;
        let other_program = anchor_spl::token_2022::ID;
        let from_key = Pubkey::new_unique();
        let to_key = Pubkey::new_unique();
        let mint_key = Pubkey::new_unique();
        let mut lamports_1 = 0;
        let mut lamports_2 = 0;
        let mut lamports_3 = 0;
        let mut data_1 = vec![];
        let mut data_2 = vec![1, 2, 3];
        let mut data_3 = vec![];

        let from = AccountInfo::new(
            &from_key,
            false,
            false,
            &mut lamports_1,
            &mut data_1,
            &token_program,
            false,
            0,
        );
        let to = AccountInfo::new(
            &to_key,
            false,
            false,
            &mut lamports_2,
            &mut data_2,
            &other_program,
            false,
            0,
        );
        let mint = AccountInfo::new(
            &mint_key,
            false,
            false,
            &mut lamports_3,
            &mut data_3,
            &token_program,
            false,
            0,
        );

        assert!(TokenTransferAccounts::try_from(vec![&from, &to, &mint]).is_err());
    }
}
