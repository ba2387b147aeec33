//! Memory store — thread-safe in-memory implementation of every storage
//! trait. Backs the engine tests and the CLI harness.

use crate::trigram::trigram_similarity;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tanda_store::{
    IdentityRecord, IdentityStore, NameMatch, ParticipantRecord, PaymentRecord, PoolHistoryRecord,
    PoolStore, ReputationEventRecord, ReputationStore, RoundOutcomeRecord, StoreError,
    SubmissionRecord, SubmissionStore,
};
use tanda_types::{
    FingerprintKind, IdentityId, NameMatchRule, ParticipantId, PoolEventKind, PoolId,
    SubmissionId, SubmissionStatus, Timestamp,
};

/// A thread-safe in-memory store implementing all storage traits.
pub struct MemoryStore {
    identities: Mutex<HashMap<u64, IdentityRecord>>,
    submissions: Mutex<HashMap<u64, SubmissionRecord>>,
    reputation_events: Mutex<Vec<ReputationEventRecord>>,
    participants: Mutex<HashMap<u64, ParticipantRecord>>,
    payments: Mutex<HashMap<(u64, u64, u32), PaymentRecord>>,
    pool_history: Mutex<Vec<PoolHistoryRecord>>,
    validated_rounds: Mutex<HashMap<(u64, u32), Vec<RoundOutcomeRecord>>>,
    /// When set, every operation fails with `StoreError::Unavailable` —
    /// exercises the retryable-infrastructure-failure path in tests.
    outage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
            submissions: Mutex::new(HashMap::new()),
            reputation_events: Mutex::new(Vec::new()),
            participants: Mutex::new(HashMap::new()),
            payments: Mutex::new(HashMap::new()),
            pool_history: Mutex::new(Vec::new()),
            validated_rounds: Mutex::new(HashMap::new()),
            outage: AtomicBool::new(false),
        }
    }

    /// Simulate an infrastructure outage (or recovery).
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.outage.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MemoryStore {
    fn get_identity(&self, id: IdentityId) -> Result<IdentityRecord, StoreError> {
        self.check_available()?;
        self.identities
            .lock()
            .unwrap()
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))
    }

    fn put_identity(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.identities
            .lock()
            .unwrap()
            .insert(record.id.as_u64(), record.clone());
        Ok(())
    }

    fn set_blocked(&self, id: IdentityId, blocked: bool) -> Result<(), StoreError> {
        self.check_available()?;
        let mut identities = self.identities.lock().unwrap();
        let record = identities
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        record.blocked = blocked;
        Ok(())
    }

    fn set_trust_score(&self, id: IdentityId, score: f64) -> Result<(), StoreError> {
        self.check_available()?;
        let mut identities = self.identities.lock().unwrap();
        let record = identities
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("identity {id}")))?;
        record.trust_score = score;
        Ok(())
    }

    fn find_similar_display_names(
        &self,
        name: &str,
        exclude: IdentityId,
        rule: NameMatchRule,
    ) -> Result<Vec<NameMatch>, StoreError> {
        self.check_available()?;
        let identities = self.identities.lock().unwrap();
        let mut matches: Vec<NameMatch> = identities
            .values()
            .filter(|r| r.id != exclude)
            .filter_map(|r| {
                let score = match rule {
                    NameMatchRule::ExactCaseInsensitive => {
                        if r.display_name.to_lowercase() == name.to_lowercase() {
                            1.0
                        } else {
                            return None;
                        }
                    }
                    NameMatchRule::Fuzzy { threshold } => {
                        let s = trigram_similarity(&r.display_name, name);
                        if s < threshold {
                            return None;
                        }
                        s
                    }
                };
                Some(NameMatch {
                    identity: r.id,
                    name: r.display_name.clone(),
                    score,
                })
            })
            .collect();
        // Best score first, ties by lowest identity id (documented tie-break).
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.identity.cmp(&b.identity))
        });
        Ok(matches)
    }
}

impl SubmissionStore for MemoryStore {
    fn put_submission(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.submissions
            .lock()
            .unwrap()
            .insert(record.id.as_u64(), record.clone());
        Ok(())
    }

    fn get_submission(&self, id: SubmissionId) -> Result<SubmissionRecord, StoreError> {
        self.check_available()?;
        self.submissions
            .lock()
            .unwrap()
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("submission {id}")))
    }

    fn current_submission(
        &self,
        identity: IdentityId,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        self.check_available()?;
        let submissions = self.submissions.lock().unwrap();
        Ok(submissions
            .values()
            .filter(|s| s.identity == identity)
            .max_by_key(|s| (s.created_at, s.id))
            .cloned())
    }

    fn set_submission_status(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut submissions = self.submissions.lock().unwrap();
        let record = submissions
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("submission {id}")))?;
        // Approval admits the record's fingerprints into the approved set,
        // so uniqueness is enforced at this write. Two pending twins can
        // both pass the arbiter's read-side check; only one may approve.
        if status == SubmissionStatus::Approved {
            if let Some(owner) = submissions.values().find(|s| {
                s.status == SubmissionStatus::Approved
                    && s.identity != record.identity
                    && (s.selfie == record.selfie
                        || s.document_front == record.document_front
                        || (record.document_back.is_some()
                            && s.document_back == record.document_back))
            }) {
                return Err(StoreError::Duplicate(format!(
                    "fingerprint already approved for identity {}",
                    owner.identity
                )));
            }
        }
        let record = submissions
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("submission {id}")))?;
        record.status = status;
        record.review_notes = notes.map(str::to_string);
        record.reviewed_at = Some(Timestamp::now());
        Ok(())
    }

    fn approved_identities_by_fingerprint(
        &self,
        kind: FingerprintKind,
        fingerprint: &tanda_types::Fingerprint,
        exclude: IdentityId,
    ) -> Result<Vec<IdentityId>, StoreError> {
        self.check_available()?;
        let submissions = self.submissions.lock().unwrap();
        let mut owners: Vec<IdentityId> = submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Approved)
            .filter(|s| s.identity != exclude)
            .filter(|s| s.fingerprint(kind) == Some(fingerprint))
            .map(|s| s.identity)
            .collect();
        owners.sort();
        owners.dedup();
        Ok(owners)
    }
}

impl ReputationStore for MemoryStore {
    fn append_reputation_event(&self, event: &ReputationEventRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.reputation_events.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn reputation_events(
        &self,
        identity: IdentityId,
    ) -> Result<Vec<ReputationEventRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .reputation_events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.identity == identity)
            .cloned()
            .collect())
    }
}

impl PoolStore for MemoryStore {
    fn get_participant(&self, id: ParticipantId) -> Result<ParticipantRecord, StoreError> {
        self.check_available()?;
        self.participants
            .lock()
            .unwrap()
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("participant {id}")))
    }

    fn put_participant(&self, record: &ParticipantRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.participants
            .lock()
            .unwrap()
            .insert(record.id.as_u64(), record.clone());
        Ok(())
    }

    fn active_participants(&self, pool: PoolId) -> Result<Vec<ParticipantRecord>, StoreError> {
        self.check_available()?;
        let participants = self.participants.lock().unwrap();
        let mut active: Vec<ParticipantRecord> = participants
            .values()
            .filter(|p| p.pool == pool && p.active)
            .cloned()
            .collect();
        active.sort_by_key(|p| p.id);
        Ok(active)
    }

    fn get_payment(
        &self,
        pool: PoolId,
        participant: ParticipantId,
        round: u32,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .payments
            .lock()
            .unwrap()
            .get(&(pool.as_u64(), participant.as_u64(), round))
            .cloned())
    }

    fn put_payment(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.payments.lock().unwrap().insert(
            (
                record.pool.as_u64(),
                record.participant.as_u64(),
                record.round,
            ),
            record.clone(),
        );
        Ok(())
    }

    fn append_pool_history(&self, record: &PoolHistoryRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.pool_history.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn count_pool_history(
        &self,
        pool: PoolId,
        identity: IdentityId,
        kind: PoolEventKind,
    ) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self
            .pool_history
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.pool == pool && h.identity == identity && h.kind == kind)
            .count() as u64)
    }

    fn pool_history(&self, pool: PoolId) -> Result<Vec<PoolHistoryRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .pool_history
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.pool == pool)
            .cloned()
            .collect())
    }

    fn set_participant_active(&self, id: ParticipantId, active: bool) -> Result<(), StoreError> {
        self.check_available()?;
        let mut participants = self.participants.lock().unwrap();
        let record = participants
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("participant {id}")))?;
        record.active = active;
        Ok(())
    }

    fn set_participant_turn(
        &self,
        id: ParticipantId,
        position: Option<u32>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut participants = self.participants.lock().unwrap();
        let record = participants
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("participant {id}")))?;
        record.turn_position = position;
        Ok(())
    }

    fn validated_round(
        &self,
        pool: PoolId,
        round: u32,
    ) -> Result<Option<Vec<RoundOutcomeRecord>>, StoreError> {
        self.check_available()?;
        Ok(self
            .validated_rounds
            .lock()
            .unwrap()
            .get(&(pool.as_u64(), round))
            .cloned())
    }

    fn mark_round_validated(
        &self,
        pool: PoolId,
        round: u32,
        outcomes: &[RoundOutcomeRecord],
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.validated_rounds
            .lock()
            .unwrap()
            .insert((pool.as_u64(), round), outcomes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanda_types::{Fingerprint, VerificationStatus};

    fn identity(id: u64, name: &str) -> IdentityRecord {
        IdentityRecord {
            id: IdentityId::new(id),
            display_name: name.to_string(),
            verification_status: VerificationStatus::Pending,
            blocked: false,
            trust_score: 2.5,
            credit_balance: 0,
        }
    }

    fn submission(id: u64, identity: u64, selfie: &str, status: SubmissionStatus) -> SubmissionRecord {
        SubmissionRecord {
            id: SubmissionId::new(id),
            identity: IdentityId::new(identity),
            selfie: Fingerprint::new(selfie),
            document_front: Fingerprint::new(format!("doc-{id}")),
            document_back: None,
            status,
            review_notes: None,
            created_at: Timestamp::new(1000 + id),
            reviewed_at: None,
        }
    }

    #[test]
    fn put_get_identity() {
        let store = MemoryStore::new();
        store.put_identity(&identity(1, "Ana")).unwrap();
        assert_eq!(store.get_identity(IdentityId::new(1)).unwrap().display_name, "Ana");
    }

    #[test]
    fn identity_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_identity(IdentityId::new(404)),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn fingerprint_lookup_only_sees_approved_and_excludes_self() {
        let store = MemoryStore::new();
        store
            .put_submission(&submission(1, 10, "h1", SubmissionStatus::Approved))
            .unwrap();
        store
            .put_submission(&submission(2, 20, "h1", SubmissionStatus::Pending))
            .unwrap();

        let hits = store
            .approved_identities_by_fingerprint(
                FingerprintKind::Selfie,
                &Fingerprint::new("h1"),
                IdentityId::new(20),
            )
            .unwrap();
        assert_eq!(hits, vec![IdentityId::new(10)]);

        // The owner re-checking its own fingerprint sees nothing.
        let hits = store
            .approved_identities_by_fingerprint(
                FingerprintKind::Selfie,
                &Fingerprint::new("h1"),
                IdentityId::new(10),
            )
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn fingerprint_lookup_orders_by_identity_id() {
        let store = MemoryStore::new();
        store
            .put_submission(&submission(1, 30, "h1", SubmissionStatus::Approved))
            .unwrap();
        store
            .put_submission(&submission(2, 10, "h1", SubmissionStatus::Approved))
            .unwrap();

        let hits = store
            .approved_identities_by_fingerprint(
                FingerprintKind::Selfie,
                &Fingerprint::new("h1"),
                IdentityId::new(99),
            )
            .unwrap();
        assert_eq!(hits, vec![IdentityId::new(10), IdentityId::new(30)]);
    }

    #[test]
    fn approving_a_fingerprint_already_approved_elsewhere_is_rejected() {
        let store = MemoryStore::new();
        store
            .put_submission(&submission(1, 10, "h1", SubmissionStatus::Pending))
            .unwrap();
        store
            .put_submission(&submission(2, 20, "h1", SubmissionStatus::Pending))
            .unwrap();

        store
            .set_submission_status(SubmissionId::new(1), SubmissionStatus::Approved, None)
            .unwrap();
        assert!(matches!(
            store.set_submission_status(SubmissionId::new(2), SubmissionStatus::Approved, None),
            Err(StoreError::Duplicate(_))
        ));
        // The losing submission is untouched.
        assert_eq!(
            store.get_submission(SubmissionId::new(2)).unwrap().status,
            SubmissionStatus::Pending
        );
        // Rejecting it stays allowed.
        store
            .set_submission_status(SubmissionId::new(2), SubmissionStatus::Rejected, None)
            .unwrap();
    }

    #[test]
    fn approving_a_document_collision_is_rejected() {
        let store = MemoryStore::new();
        let mut a = submission(1, 10, "h1", SubmissionStatus::Approved);
        a.document_front = Fingerprint::new("d1");
        store.put_submission(&a).unwrap();
        let mut b = submission(2, 20, "h2", SubmissionStatus::Pending);
        b.document_front = Fingerprint::new("d1");
        store.put_submission(&b).unwrap();

        assert!(matches!(
            store.set_submission_status(SubmissionId::new(2), SubmissionStatus::Approved, None),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn identity_may_reapprove_its_own_fingerprint() {
        let store = MemoryStore::new();
        store
            .put_submission(&submission(1, 10, "h1", SubmissionStatus::Approved))
            .unwrap();
        store
            .put_submission(&submission(2, 10, "h1", SubmissionStatus::Pending))
            .unwrap();

        store
            .set_submission_status(SubmissionId::new(2), SubmissionStatus::Approved, None)
            .unwrap();
    }

    #[test]
    fn current_submission_is_newest() {
        let store = MemoryStore::new();
        store
            .put_submission(&submission(1, 10, "old", SubmissionStatus::Rejected))
            .unwrap();
        store
            .put_submission(&submission(2, 10, "new", SubmissionStatus::Pending))
            .unwrap();
        let current = store.current_submission(IdentityId::new(10)).unwrap().unwrap();
        assert_eq!(current.id, SubmissionId::new(2));
    }

    #[test]
    fn similar_names_exact_rule() {
        let store = MemoryStore::new();
        store.put_identity(&identity(1, "Maria Lopez")).unwrap();
        store.put_identity(&identity(2, "MARIA LOPEZ")).unwrap();
        store.put_identity(&identity(3, "Pedro Diaz")).unwrap();

        let matches = store
            .find_similar_display_names(
                "maria lopez",
                IdentityId::new(2),
                NameMatchRule::ExactCaseInsensitive,
            )
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].identity, IdentityId::new(1));
        assert_eq!(matches[0].score, 1.0);
    }

    #[test]
    fn similar_names_fuzzy_rule_sorted_best_first() {
        let store = MemoryStore::new();
        store.put_identity(&identity(1, "Juan Hernandez")).unwrap();
        store.put_identity(&identity(2, "Juan Hernandes")).unwrap();
        store.put_identity(&identity(3, "Sofia Ramirez")).unwrap();

        let matches = store
            .find_similar_display_names(
                "Juan Hernandez",
                IdentityId::new(99),
                NameMatchRule::Fuzzy { threshold: 0.7 },
            )
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].identity, IdentityId::new(1)); // exact, score 1.0
        assert_eq!(matches[1].identity, IdentityId::new(2));
    }

    #[test]
    fn outage_makes_everything_unavailable() {
        let store = MemoryStore::new();
        store.put_identity(&identity(1, "Ana")).unwrap();
        store.set_outage(true);
        assert!(matches!(
            store.get_identity(IdentityId::new(1)),
            Err(StoreError::Unavailable(_))
        ));
        store.set_outage(false);
        assert!(store.get_identity(IdentityId::new(1)).is_ok());
    }

    #[test]
    fn history_count_is_pool_and_kind_scoped() {
        let store = MemoryStore::new();
        let entry = |pool: u64, identity: u64, kind: PoolEventKind| PoolHistoryRecord {
            pool: PoolId::new(pool),
            identity: IdentityId::new(identity),
            kind,
            detail: None,
            created_at: Timestamp::new(0),
        };
        store.append_pool_history(&entry(1, 7, PoolEventKind::MissedPayment)).unwrap();
        store.append_pool_history(&entry(1, 7, PoolEventKind::MissedPayment)).unwrap();
        store.append_pool_history(&entry(2, 7, PoolEventKind::MissedPayment)).unwrap();
        store.append_pool_history(&entry(1, 7, PoolEventKind::TurnFrozen)).unwrap();

        let count = store
            .count_pool_history(PoolId::new(1), IdentityId::new(7), PoolEventKind::MissedPayment)
            .unwrap();
        assert_eq!(count, 2);
    }
}
