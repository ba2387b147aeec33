use tanda_reputation::ReputationError;
use tanda_store::StoreError;
use tanda_types::{ParticipantId, PoolId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    /// Malformed input, rejected before any store mutation.
    #[error("participant {participant} does not belong to pool {pool}")]
    WrongPool {
        participant: ParticipantId,
        pool: PoolId,
    },

    /// Infrastructure failure — retryable.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("reputation error: {0}")]
    Reputation(#[from] ReputationError),
}
