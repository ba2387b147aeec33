use tanda_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReputationError {
    /// Infrastructure failure — retryable, no event was recorded.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
