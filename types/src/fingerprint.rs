//! Content fingerprints for duplicate detection.
//!
//! A fingerprint is an opaque content hash of a biometric selfie or an
//! identity-document image, produced by the upload pipeline (out of scope
//! here). The core only ever compares fingerprints for equality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which artifact a fingerprint was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintKind {
    Selfie,
    DocumentFront,
    DocumentBack,
}

impl fmt::Display for FingerprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FingerprintKind::Selfie => "selfie",
            FingerprintKind::DocumentFront => "document_front",
            FingerprintKind::DocumentBack => "document_back",
        };
        write!(f, "{s}")
    }
}

/// An opaque content hash, stored as a lowercase hex string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a hash string, normalizing to lowercase.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
