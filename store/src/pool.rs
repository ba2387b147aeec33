//! Pool, participant, payment, and pool-history storage traits.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tanda_types::{IdentityId, ParticipantId, PoolEventKind, PoolId, Timestamp};

/// One identity's membership in one pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub pool: PoolId,
    pub identity: IdentityId,
    /// Cleared on expulsion; an inactive participant is excluded from all
    /// future round validation.
    pub active: bool,
    /// Whether this participant has already received a payout.
    pub received_payout: bool,
    /// Ordinal turn position. `None` means frozen/unassigned.
    pub turn_position: Option<u32>,
}

/// A contribution payment for one round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub pool: PoolId,
    pub participant: ParticipantId,
    pub round: u32,
    pub amount_cents: u64,
    pub paid_at: Timestamp,
}

/// One entry in a pool's append-only audit trail, one per consequence
/// applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolHistoryRecord {
    pub pool: PoolId,
    pub identity: IdentityId,
    pub kind: PoolEventKind,
    pub detail: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// The persisted per-participant result of a validated round, replayed on
/// re-validation so the outcome set survives later membership changes
/// (an expelled participant still appears in the round that expelled them).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcomeRecord {
    pub participant: ParticipantId,
    pub identity: IdentityId,
    pub paid: bool,
    pub expelled: bool,
}

/// Trait for pool membership, payments, and the pool audit trail.
pub trait PoolStore {
    fn get_participant(&self, id: ParticipantId) -> Result<ParticipantRecord, StoreError>;

    fn put_participant(&self, record: &ParticipantRecord) -> Result<(), StoreError>;

    /// All active participants of a pool, ascending participant id.
    fn active_participants(&self, pool: PoolId) -> Result<Vec<ParticipantRecord>, StoreError>;

    fn get_payment(
        &self,
        pool: PoolId,
        participant: ParticipantId,
        round: u32,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    fn put_payment(&self, record: &PaymentRecord) -> Result<(), StoreError>;

    fn append_pool_history(&self, record: &PoolHistoryRecord) -> Result<(), StoreError>;

    /// Lifetime count of `kind` entries for one identity in one pool.
    fn count_pool_history(
        &self,
        pool: PoolId,
        identity: IdentityId,
        kind: PoolEventKind,
    ) -> Result<u64, StoreError>;

    fn pool_history(&self, pool: PoolId) -> Result<Vec<PoolHistoryRecord>, StoreError>;

    fn set_participant_active(&self, id: ParticipantId, active: bool) -> Result<(), StoreError>;

    /// Assign or clear (`None` = frozen) a participant's turn position.
    fn set_participant_turn(
        &self,
        id: ParticipantId,
        position: Option<u32>,
    ) -> Result<(), StoreError>;

    /// The recorded outcome set of an already-validated `(pool, round)`,
    /// or `None` when the round has not been validated yet.
    fn validated_round(
        &self,
        pool: PoolId,
        round: u32,
    ) -> Result<Option<Vec<RoundOutcomeRecord>>, StoreError>;

    /// Record that `(pool, round)` has been fully validated, together with
    /// its final outcome set.
    fn mark_round_validated(
        &self,
        pool: PoolId,
        round: u32,
        outcomes: &[RoundOutcomeRecord],
    ) -> Result<(), StoreError>;
}
