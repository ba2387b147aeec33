//! Reputation ledger — turns discrete behavioral events into a bounded,
//! comparable trust score.

pub mod error;
pub mod ledger;

pub use error::ReputationError;
pub use ledger::ReputationLedger;
