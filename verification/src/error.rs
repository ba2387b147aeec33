use tanda_reputation::ReputationError;
use tanda_store::StoreError;
use tanda_types::{FingerprintKind, IdentityId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    /// Malformed input, rejected before any store mutation.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// More than one approved verification already holds this fingerprint —
    /// the uniqueness invariant was broken upstream. Surfaced, never
    /// silently resolved.
    #[error("consistency violation: {kind} fingerprint approved for {identities:?}")]
    Consistency {
        kind: FingerprintKind,
        identities: Vec<IdentityId>,
    },

    /// Infrastructure failure — retryable. Never to be read as
    /// "no duplicate found".
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("reputation error: {0}")]
    Reputation(#[from] ReputationError),
}
