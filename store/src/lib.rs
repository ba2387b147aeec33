//! Abstract storage traits for the tanda trust core.
//!
//! Every storage backend (Postgres in production, in-memory for tests and
//! the CLI harness) implements these traits. The engine crates depend only
//! on the traits — they hold no private mutable state beyond the current
//! operation's working set.

pub mod error;
pub mod identity;
pub mod pool;
pub mod reputation;
pub mod submission;

pub use error::StoreError;
pub use identity::{IdentityRecord, IdentityStore, NameMatch};
pub use pool::{
    ParticipantRecord, PaymentRecord, PoolHistoryRecord, PoolStore, RoundOutcomeRecord,
};
pub use reputation::{ReputationEventRecord, ReputationStore};
pub use submission::{SubmissionRecord, SubmissionStore};
