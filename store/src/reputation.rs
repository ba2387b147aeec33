//! Reputation event-log storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tanda_types::{EventKind, IdentityId, Timestamp};

/// One immutable reputation event. Never updated or deleted — the aggregate
/// score is always a pure function of the full event history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReputationEventRecord {
    pub identity: IdentityId,
    pub kind: EventKind,
    pub delta: f64,
    pub detail: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// Trait for the append-only reputation event log.
pub trait ReputationStore {
    /// Append one event. Events are never mutated afterwards.
    fn append_reputation_event(&self, event: &ReputationEventRecord) -> Result<(), StoreError>;

    /// Full event history for an identity, in insertion order.
    fn reputation_events(
        &self,
        identity: IdentityId,
    ) -> Result<Vec<ReputationEventRecord>, StoreError>;
}
