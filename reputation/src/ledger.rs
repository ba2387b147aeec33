//! The reputation ledger engine.
//!
//! Events are append-only; the public trust score is a pure function of the
//! full ordered event history plus the configured base. The persisted score
//! is only a cache and is recomputed after every new event.

use crate::error::ReputationError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tanda_store::{IdentityStore, ReputationEventRecord, ReputationStore};
use tanda_types::{EventKind, IdentityId, Timestamp, TrustParams};

/// Round to the 2-decimal precision the public score is persisted at.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Once the lock map grows past this, idle entries (held only by the map)
/// are pruned, so the map stays bounded by in-flight operations rather
/// than growing with every identity ever touched.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// The reputation ledger — stateless over the store apart from the
/// per-identity critical sections.
pub struct ReputationLedger<S> {
    store: Arc<S>,
    params: TrustParams,
    /// One lock per identity, serializing the append → recompute → persist
    /// read-modify-write so concurrent events cannot overwrite each other
    /// with stale sums.
    identity_locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl<S> ReputationLedger<S>
where
    S: ReputationStore + IdentityStore,
{
    pub fn new(store: Arc<S>, params: TrustParams) -> Self {
        Self {
            store,
            params,
            identity_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn params(&self) -> &TrustParams {
        &self.params
    }

    fn lock_for(&self, identity: IdentityId) -> Arc<Mutex<()>> {
        let mut locks = self.identity_locks.lock().unwrap();
        if locks.len() >= LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(identity.as_u64())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Append one event and recompute the identity's score.
    ///
    /// `override_delta` takes precedence over the configured weight table;
    /// `ManualAdjustment` events carry their whole meaning in it. Returns
    /// the new public score.
    pub fn record_event(
        &self,
        identity: IdentityId,
        kind: EventKind,
        override_delta: Option<f64>,
        detail: Option<serde_json::Value>,
    ) -> Result<f64, ReputationError> {
        let delta = override_delta.unwrap_or_else(|| self.params.event_weights.delta_for(kind));

        let guard = self.lock_for(identity);
        let _held = guard.lock().unwrap();

        self.store.append_reputation_event(&ReputationEventRecord {
            identity,
            kind,
            delta,
            detail,
            created_at: Timestamp::now(),
        })?;

        let score = self.recompute_locked(identity)?;
        tracing::debug!(%identity, %kind, delta, score, "reputation event recorded");
        Ok(score)
    }

    /// Recompute and persist the score from the full event history.
    pub fn recompute(&self, identity: IdentityId) -> Result<f64, ReputationError> {
        let guard = self.lock_for(identity);
        let _held = guard.lock().unwrap();
        self.recompute_locked(identity)
    }

    /// The cached public score.
    pub fn score(&self, identity: IdentityId) -> Result<f64, ReputationError> {
        Ok(self.store.get_identity(identity)?.trust_score)
    }

    /// Pure score formula: raw sum → symmetric clamp → base + scaled →
    /// output clamp → 2-decimal round.
    pub fn score_from_deltas<I: IntoIterator<Item = f64>>(&self, deltas: I) -> f64 {
        let p = &self.params;
        let raw: f64 = deltas.into_iter().sum();
        let clamped = raw.clamp(-p.raw_delta_clamp, p.raw_delta_clamp);
        let score = p.score_base + clamped * p.score_scale;
        round2(score.clamp(p.score_min, p.score_max))
    }

    // Caller must hold the identity lock.
    fn recompute_locked(&self, identity: IdentityId) -> Result<f64, ReputationError> {
        let events = self.store.reputation_events(identity)?;
        let score = self.score_from_deltas(events.iter().map(|e| e.delta));
        self.store.set_trust_score(identity, score)?;
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanda_store::{IdentityRecord, StoreError};
    use tanda_store_mem::MemoryStore;
    use tanda_types::VerificationStatus;

    fn ledger_with_identity(id: u64) -> (Arc<MemoryStore>, ReputationLedger<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store
            .put_identity(&IdentityRecord {
                id: IdentityId::new(id),
                display_name: format!("identity-{id}"),
                verification_status: VerificationStatus::Approved,
                blocked: false,
                trust_score: 2.5,
                credit_balance: 0,
            })
            .unwrap();
        let ledger = ReputationLedger::new(store.clone(), TrustParams::platform_defaults());
        (store, ledger)
    }

    #[test]
    fn new_identity_scores_base() {
        let (_store, ledger) = ledger_with_identity(1);
        assert_eq!(ledger.recompute(IdentityId::new(1)).unwrap(), 2.5);
    }

    #[test]
    fn missed_payment_moves_score_by_scaled_delta() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        // 2.50 - 1.5 * 0.2 = 2.20
        let score = ledger
            .record_event(id, EventKind::MissedPayment, None, None)
            .unwrap();
        assert_eq!(score, 2.2);
        assert_eq!(ledger.score(id).unwrap(), 2.2);
    }

    #[test]
    fn override_delta_wins_over_weight_table() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        let score = ledger
            .record_event(id, EventKind::ManualAdjustment, Some(2.0), None)
            .unwrap();
        assert_eq!(score, 2.9); // 2.5 + 2.0 * 0.2
    }

    #[test]
    fn zero_delta_manual_adjustment_is_a_noop_on_score() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        ledger.record_event(id, EventKind::PaidOnTime, None, None).unwrap();
        let before = ledger.score(id).unwrap();
        let after = ledger
            .record_event(id, EventKind::ManualAdjustment, Some(0.0), None)
            .unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn raw_sum_clamped_before_scaling() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        // 20 fraud reports = raw -40, clamps to -10: 2.5 - 10 * 0.2 = 0.5,
        // not the 0.0 an unclamped sum would saturate to.
        for _ in 0..20 {
            ledger.record_event(id, EventKind::FraudReported, None, None).unwrap();
        }
        assert_eq!(ledger.score(id).unwrap(), 0.5);
    }

    #[test]
    fn score_stays_in_output_range() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        for _ in 0..50 {
            ledger.record_event(id, EventKind::PoolCreatedSuccess, None, None).unwrap();
        }
        assert_eq!(ledger.score(id).unwrap(), 4.5); // 2.5 + 10 * 0.2
        ledger
            .record_event(id, EventKind::ManualAdjustment, Some(100.0), None)
            .unwrap();
        assert!(ledger.score(id).unwrap() <= 5.0);
    }

    #[test]
    fn recompute_is_deterministic() {
        let (_store, ledger) = ledger_with_identity(1);
        let id = IdentityId::new(1);
        ledger.record_event(id, EventKind::PaidOnTime, None, None).unwrap();
        ledger.record_event(id, EventKind::PaidLate, None, None).unwrap();
        let a = ledger.recompute(id).unwrap();
        let b = ledger.recompute(id).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn idle_identity_locks_are_pruned() {
        let (_store, ledger) = ledger_with_identity(1);
        for id in 0..(2 * LOCK_PRUNE_THRESHOLD as u64) {
            drop(ledger.lock_for(IdentityId::new(id)));
        }
        assert!(ledger.identity_locks.lock().unwrap().len() <= LOCK_PRUNE_THRESHOLD);
    }

    #[test]
    fn store_outage_surfaces_as_store_error() {
        let (store, ledger) = ledger_with_identity(1);
        store.set_outage(true);
        let err = ledger
            .record_event(IdentityId::new(1), EventKind::PaidOnTime, None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            ReputationError::Store(StoreError::Unavailable(_))
        ));
    }
}
