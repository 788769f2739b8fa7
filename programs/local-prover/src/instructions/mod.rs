use anchor_lang::prelude::*;

mod challenge;
mod fetch_fee;
mod prove;

pub use challenge::*;
pub use fetch_fee::*;
pub use prove::*;

#[error_code]
pub enum LocalProverError {
    InvalidPortalDispatcher,
    InvalidSource,
    InvalidProof,
}
