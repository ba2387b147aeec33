//! Duplicate-account arbiter — orchestrates the fingerprint matcher and the
//! similarity screener into one pass/reject decision and applies the
//! consequences of a reject.

use crate::error::VerificationError;
use crate::matcher::FingerprintMatcher;
use crate::screener::SimilarityScreener;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tanda_reputation::ReputationLedger;
use tanda_store::{IdentityStore, NameMatch, ReputationStore, SubmissionRecord, SubmissionStore};
use tanda_types::{EventKind, IdentityId, SubmissionId, SubmissionStatus, TrustParams};

/// Once the lock map grows past this, idle entries (held only by the map)
/// are pruned, so the map stays bounded by in-flight evaluations rather
/// than growing with every fingerprint ever seen.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Machine-readable reason codes for a rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    DuplicateBiometric,
    DuplicateDocument,
    SuspiciousSimilarity,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::DuplicateBiometric => "duplicate_biometric",
            RejectReason::DuplicateDocument => "duplicate_document",
            RejectReason::SuspiciousSimilarity => "suspicious_similarity",
        };
        write!(f, "{s}")
    }
}

/// Outcome of evaluating a submission. A `Reject` is an expected domain
/// outcome, not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// No duplicate found — the submission stays pending for review.
    Pass,
    Reject {
        reason: RejectReason,
        /// The identity this submission collides with (the nearest match
        /// when several names were similar).
        conflict: IdentityId,
        /// Remaining similarity matches, so an ambiguous screen is never
        /// reported as a single arbitrary identity.
        other_matches: Vec<NameMatch>,
    },
}

/// The duplicate-account arbiter.
///
/// Stateless over the store apart from the per-fingerprint critical
/// sections that serialize check-then-write for concurrent submissions
/// carrying the same fingerprint.
pub struct DuplicateArbiter<S> {
    store: Arc<S>,
    ledger: Arc<ReputationLedger<S>>,
    matcher: FingerprintMatcher,
    screener: SimilarityScreener,
    fingerprint_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S> DuplicateArbiter<S>
where
    S: SubmissionStore + IdentityStore + ReputationStore,
{
    pub fn new(store: Arc<S>, ledger: Arc<ReputationLedger<S>>, params: &TrustParams) -> Self {
        Self {
            store,
            ledger,
            matcher: FingerprintMatcher,
            screener: SimilarityScreener::new(params.name_match),
            fingerprint_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate a submission against all other identities.
    ///
    /// Checks run in fixed priority order and short-circuit: biometric
    /// duplicate, document duplicate, name similarity. The submitting
    /// identity is always excluded from its own match set.
    ///
    /// Consequences (rejected status, blocked flag, reputation event) are
    /// applied only when the submission is still pending — re-evaluating an
    /// already-decided submission returns the same decision with no new
    /// side effects.
    pub fn evaluate(&self, submission: SubmissionId) -> Result<Decision, VerificationError> {
        let record = self.store.get_submission(submission)?;
        self.validate(&record)?;

        // Serialize check-then-write per selfie fingerprint: two concurrent
        // submissions with the same fingerprint must not both pass.
        let guard = self.lock_for(record.selfie.as_str());
        let _held = guard.lock().unwrap();

        let decision = self.check(&record)?;

        if let Decision::Reject {
            reason,
            conflict,
            other_matches,
        } = &decision
        {
            if record.status == SubmissionStatus::Pending {
                self.apply_rejection(&record, *reason, *conflict, other_matches)?;
            }
            tracing::warn!(
                %submission,
                identity = %record.identity,
                %reason,
                %conflict,
                "duplicate account detected"
            );
        }

        Ok(decision)
    }

    fn validate(&self, record: &SubmissionRecord) -> Result<(), VerificationError> {
        if record.selfie.is_empty() {
            return Err(VerificationError::Validation(
                "missing selfie fingerprint".into(),
            ));
        }
        if record.document_front.is_empty() {
            return Err(VerificationError::Validation(
                "missing document-front fingerprint".into(),
            ));
        }
        Ok(())
    }

    // Pure read checks, in priority order.
    fn check(&self, record: &SubmissionRecord) -> Result<Decision, VerificationError> {
        if let Some((reason, conflict)) = self.matcher.find_duplicate(self.store.as_ref(), record)?
        {
            return Ok(Decision::Reject {
                reason,
                conflict,
                other_matches: Vec::new(),
            });
        }

        let identity = self.store.get_identity(record.identity)?;
        if let Some(hit) =
            self.screener
                .screen(self.store.as_ref(), &identity.display_name, record.identity)?
        {
            return Ok(Decision::Reject {
                reason: RejectReason::SuspiciousSimilarity,
                conflict: hit.nearest.identity,
                other_matches: hit.others,
            });
        }

        Ok(Decision::Pass)
    }

    fn apply_rejection(
        &self,
        record: &SubmissionRecord,
        reason: RejectReason,
        conflict: IdentityId,
        other_matches: &[NameMatch],
    ) -> Result<(), VerificationError> {
        let notes = serde_json::json!({
            "reason": reason.to_string(),
            "conflict": conflict.as_u64(),
            "other_matches": other_matches
                .iter()
                .map(|m| m.identity.as_u64())
                .collect::<Vec<_>>(),
        });

        self.store.set_submission_status(
            record.id,
            SubmissionStatus::Rejected,
            Some(&notes.to_string()),
        )?;
        self.store.set_blocked(record.identity, true)?;
        self.ledger.record_event(
            record.identity,
            EventKind::DuplicateAccountAttempt,
            None,
            Some(serde_json::json!({
                "submission": record.id.as_u64(),
                "reason": reason.to_string(),
                "conflict": conflict.as_u64(),
            })),
        )?;
        Ok(())
    }

    fn lock_for(&self, fingerprint: &str) -> Arc<Mutex<()>> {
        let mut locks = self.fingerprint_locks.lock().unwrap();
        if locks.len() >= LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        locks
            .entry(fingerprint.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
