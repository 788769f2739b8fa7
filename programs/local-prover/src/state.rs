use anchor_lang::prelude::*;
use span_svm_std::account::AccountExt;

#[account]
#[derive(InitSpace)]
pub struct ProofAccount(pub span_svm_std::prover::Proof);

impl AccountExt for ProofAccount {}

impl From<span_svm_std::prover::Proof> for ProofAccount {
    fn from(proof: span_svm_std::prover::Proof) -> Self {
        Self(proof)
    }
}
