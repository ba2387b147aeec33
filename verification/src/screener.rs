//! Similarity screener — fuzzy/exact display-name matching against
//! registered identities.

use crate::error::VerificationError;
use serde::{Deserialize, Serialize};
use tanda_store::{IdentityStore, NameMatch};
use tanda_types::{IdentityId, NameMatchRule};

/// A similarity hit. The nearest match carries the full list of runners-up
/// so an ambiguous screen never silently reports an arbitrary identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenMatch {
    pub nearest: NameMatch,
    pub others: Vec<NameMatch>,
}

/// Screens a candidate display name against all other identities under the
/// configured matching rule.
pub struct SimilarityScreener {
    rule: NameMatchRule,
}

impl SimilarityScreener {
    pub fn new(rule: NameMatchRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> NameMatchRule {
        self.rule
    }

    /// `None` when no registered identity matches the candidate name.
    pub fn screen<S: IdentityStore>(
        &self,
        store: &S,
        candidate_name: &str,
        exclude: IdentityId,
    ) -> Result<Option<ScreenMatch>, VerificationError> {
        if candidate_name.trim().is_empty() {
            return Ok(None);
        }
        let mut matches = store.find_similar_display_names(candidate_name, exclude, self.rule)?;
        if matches.is_empty() {
            return Ok(None);
        }
        // The store returns best score first, ties by lowest identity id.
        let nearest = matches.remove(0);
        Ok(Some(ScreenMatch {
            nearest,
            others: matches,
        }))
    }
}
