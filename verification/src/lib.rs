//! Duplicate-account arbitration.
//!
//! One real person must not control multiple accounts. The arbiter
//! correlates biometric/document fingerprints and display-name similarity
//! across accounts and turns them into a single pass/reject decision, with
//! automatic blocking on reject.

pub mod arbiter;
pub mod error;
pub mod matcher;
pub mod screener;

pub use arbiter::{Decision, DuplicateArbiter, RejectReason};
pub use error::VerificationError;
pub use matcher::FingerprintMatcher;
pub use screener::{ScreenMatch, SimilarityScreener};
