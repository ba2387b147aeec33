//! Identity storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tanda_types::{IdentityId, NameMatchRule, VerificationStatus};

/// One registered person-account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: IdentityId,
    pub display_name: String,
    pub verification_status: VerificationStatus,
    /// Set by the Duplicate-Account Arbiter on a confirmed duplicate.
    pub blocked: bool,
    /// Cached aggregate trust score, always re-derivable from the
    /// reputation event log.
    pub trust_score: f64,
    /// Accumulated credit balance, derived by an external system and
    /// carried opaquely here.
    pub credit_balance: u64,
}

/// A display name that matched a similarity lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub identity: IdentityId,
    pub name: String,
    /// Similarity in 0.0..=1.0 (1.0 for exact-rule matches).
    pub score: f64,
}

/// Trait for reading and mutating identity records.
pub trait IdentityStore {
    fn get_identity(&self, id: IdentityId) -> Result<IdentityRecord, StoreError>;

    fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError>;

    /// Set or clear the blocked flag.
    fn set_blocked(&self, id: IdentityId, blocked: bool) -> Result<(), StoreError>;

    /// Persist the cached aggregate trust score.
    fn set_trust_score(&self, id: IdentityId, score: f64) -> Result<(), StoreError>;

    /// Find other identities whose display name matches `name` under `rule`,
    /// excluding `exclude` itself. Results are sorted best score first,
    /// ties broken by lowest identity id.
    fn find_similar_display_names(
        &self,
        name: &str,
        exclude: IdentityId,
        rule: NameMatchRule,
    ) -> Result<Vec<NameMatch>, StoreError>;
}
