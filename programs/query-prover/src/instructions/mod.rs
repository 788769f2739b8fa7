use anchor_lang::prelude::*;

mod challenge;
mod fetch_fee;
mod init;
mod prove;
mod resolve;

pub use challenge::*;
pub use fetch_fee::*;
pub use init::*;
pub use prove::*;
pub use resolve::*;

#[error_code]
pub enum QueryProverError {
    InvalidRequester,
    InvalidConfig,
    InvalidProcessAuthority,
    InvalidProof,
    InvalidPdaPayer,
    InvalidData,
    InvalidRouter,
    InvalidFeeCollector,
    UntrustedPortal,
    IntentNotFulfilled,
    ChainIdTooLarge,
    InsufficientFee,
    TooManyTrustedPortals,
    FeeOverflow,
}
