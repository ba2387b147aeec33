//! Fingerprint matcher — exact-duplicate detection over approved
//! verifications.

use crate::arbiter::RejectReason;
use crate::error::VerificationError;
use tanda_store::{SubmissionRecord, SubmissionStore};
use tanda_types::{Fingerprint, FingerprintKind, IdentityId};

/// Checks a submission's fingerprints against every *other* identity's
/// approved verification.
pub struct FingerprintMatcher;

impl FingerprintMatcher {
    /// First fingerprint conflict in priority order: selfie, then document
    /// front, then document back. `None` means no duplicate.
    pub fn find_duplicate<S: SubmissionStore>(
        &self,
        store: &S,
        submission: &SubmissionRecord,
    ) -> Result<Option<(RejectReason, IdentityId)>, VerificationError> {
        if let Some(owner) = self.approved_owner(
            store,
            FingerprintKind::Selfie,
            &submission.selfie,
            submission.identity,
        )? {
            return Ok(Some((RejectReason::DuplicateBiometric, owner)));
        }

        if let Some(owner) = self.approved_owner(
            store,
            FingerprintKind::DocumentFront,
            &submission.document_front,
            submission.identity,
        )? {
            return Ok(Some((RejectReason::DuplicateDocument, owner)));
        }

        if let Some(back) = &submission.document_back {
            if let Some(owner) = self.approved_owner(
                store,
                FingerprintKind::DocumentBack,
                back,
                submission.identity,
            )? {
                return Ok(Some((RejectReason::DuplicateDocument, owner)));
            }
        }

        Ok(None)
    }

    fn approved_owner<S: SubmissionStore>(
        &self,
        store: &S,
        kind: FingerprintKind,
        fingerprint: &Fingerprint,
        exclude: IdentityId,
    ) -> Result<Option<IdentityId>, VerificationError> {
        let owners = store.approved_identities_by_fingerprint(kind, fingerprint, exclude)?;
        match owners.as_slice() {
            [] => Ok(None),
            [owner] => Ok(Some(*owner)),
            many => {
                // The at-most-one-approved-owner invariant is already broken
                // upstream; surface it instead of picking a winner.
                tracing::error!(
                    %kind,
                    %fingerprint,
                    identities = ?many,
                    "multiple approved verifications share one fingerprint"
                );
                Err(VerificationError::Consistency {
                    kind,
                    identities: many.to_vec(),
                })
            }
        }
    }
}
