//! Round-payment validation for rotating-savings pools.
//!
//! Each round, each active participant either paid or missed. Misses feed
//! the pool audit trail and the reputation ledger; repeated misses expel.

pub mod error;
pub mod validator;

pub use error::PoolError;
pub use validator::{ParticipantOutcome, PaymentOutcome, RoundSummary, RoundValidator};
