use anchor_lang::prelude::*;

pub mod batch_withdraw;
pub mod fulfill;
pub mod fund;
pub mod prove;
pub mod publish;
pub mod refund;
pub mod status;
pub mod token_funding;
pub mod withdraw;

pub use batch_withdraw::*;
pub use fulfill::*;
pub use fund::*;
pub use prove::*;
pub use publish::*;
pub use refund::*;
pub use status::*;
pub use withdraw::*;

#[error_code]
pub enum PortalError {
    WrongChain,
    InvalidIntentHash,
    DeadlinePassed,
    DeadlineNotReached,
    InsufficientFunds,
    IntentNotFunded,
    IntentNotClaimed,
    IntentAlreadyWithdrawn,
    IntentAlreadyRefunded,
    IntentAlreadyFulfilled,
    ZeroClaimant,
    TokenAmountOverflow,
    InvalidVault,
    InvalidAta,
    InvalidMint,
    InvalidCreator,
    InvalidCreatorToken,
    InvalidClaimantToken,
    InvalidProof,
    InvalidProver,
    InvalidDispatcher,
    InvalidExecutor,
    InvalidFulfillMarker,
    InvalidSettledMarker,
    InvalidFulfillTarget,
    InvalidCalldata,
    InvalidTokenProgram,
    InvalidTokenTransferAccounts,
}
