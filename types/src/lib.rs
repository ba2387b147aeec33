//! Fundamental types for the tanda trust core.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, fingerprints, timestamps, status enums, event
//! kinds, and the tunable trust parameters.

pub mod event;
pub mod fingerprint;
pub mod id;
pub mod params;
pub mod state;
pub mod time;

pub use event::{EventKind, PoolEventKind};
pub use fingerprint::{Fingerprint, FingerprintKind};
pub use id::{IdentityId, ParticipantId, PoolId, SubmissionId};
pub use params::{EventWeights, NameMatchRule, TrustParams};
pub use state::{SubmissionStatus, VerificationStatus};
pub use time::Timestamp;
