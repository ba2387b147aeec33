//! Verification-submission storage trait.

use crate::StoreError;
use serde::{Deserialize, Serialize};
use tanda_types::{Fingerprint, FingerprintKind, IdentityId, SubmissionId, SubmissionStatus, Timestamp};

/// One identity-verification attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub identity: IdentityId,
    pub selfie: Fingerprint,
    pub document_front: Fingerprint,
    pub document_back: Option<Fingerprint>,
    pub status: SubmissionStatus,
    pub review_notes: Option<String>,
    pub created_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

impl SubmissionRecord {
    /// The fingerprint carried for `kind`, if any.
    pub fn fingerprint(&self, kind: FingerprintKind) -> Option<&Fingerprint> {
        match kind {
            FingerprintKind::Selfie => Some(&self.selfie),
            FingerprintKind::DocumentFront => Some(&self.document_front),
            FingerprintKind::DocumentBack => self.document_back.as_ref(),
        }
    }
}

/// Trait for storing verification submissions and answering the
/// fingerprint-uniqueness lookups of the Duplicate-Account Arbiter.
pub trait SubmissionStore {
    fn put_submission(&self, record: &SubmissionRecord) -> Result<(), StoreError>;

    fn get_submission(&self, id: SubmissionId) -> Result<SubmissionRecord, StoreError>;

    /// The newest submission for an identity — its current verification
    /// status. A resubmission supersedes the prior record.
    fn current_submission(
        &self,
        identity: IdentityId,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Transition a submission's status, recording reviewer/arbiter notes.
    ///
    /// Transitioning to `Approved` enforces fingerprint uniqueness at the
    /// write: fails with [`StoreError::Duplicate`] when another identity
    /// already holds an approved submission sharing any of this record's
    /// fingerprints. The arbiter's read-side check cannot see a concurrent
    /// still-pending twin, so the approved set guards itself.
    fn set_submission_status(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
        notes: Option<&str>,
    ) -> Result<(), StoreError>;

    /// All identities other than `exclude` holding an **approved**
    /// submission whose `kind` fingerprint equals `fingerprint`.
    ///
    /// Returned in ascending identity-id order — the documented
    /// deterministic tie-break. Under the uniqueness invariant the list
    /// has at most one element; more than one means the invariant was
    /// already broken upstream.
    fn approved_identities_by_fingerprint(
        &self,
        kind: FingerprintKind,
        fingerprint: &Fingerprint,
        exclude: IdentityId,
    ) -> Result<Vec<IdentityId>, StoreError>;
}
