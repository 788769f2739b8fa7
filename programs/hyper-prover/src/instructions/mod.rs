use anchor_lang::prelude::*;

mod add_sender;
mod challenge;
mod fetch_fee;
mod handle;
mod handle_account_metas;
mod init;
mod ism;
mod ism_account_metas;
mod prove;

pub use add_sender::*;
pub use challenge::*;
pub use fetch_fee::*;
pub use handle::*;
pub use handle_account_metas::*;
pub use init::*;
pub use ism::*;
pub use ism_account_metas::*;
pub use prove::*;

#[error_code]
pub enum HyperProverError {
    InvalidPortalDispatcher,
    InvalidDispatcher,
    InvalidConfig,
    InvalidProcessAuthority,
    InvalidSender,
    InvalidProof,
    InvalidPdaPayer,
    InvalidData,
    InvalidMailbox,
    InvalidFeeCollector,
    InvalidOwner,
    ChainIdTooLarge,
    InsufficientFee,
    TooManyWhitelistedSenders,
    FeeOverflow,
}
