//! TOML state snapshots.
//!
//! The harness operates on a point-in-time export of the platform's state:
//! identities, verification submissions, pool participants, and payments,
//! plus optional trust-parameter overrides.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tanda_store::{
    IdentityRecord, IdentityStore, ParticipantRecord, PaymentRecord, PoolStore, SubmissionRecord,
    SubmissionStore,
};
use tanda_store_mem::MemoryStore;
use tanda_types::{
    Fingerprint, IdentityId, ParticipantId, PoolId, SubmissionId, SubmissionStatus, Timestamp,
    TrustParams, VerificationStatus,
};

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub params: Option<TrustParams>,
    #[serde(default)]
    pub identities: Vec<IdentityEntry>,
    #[serde(default)]
    pub submissions: Vec<SubmissionEntry>,
    #[serde(default)]
    pub participants: Vec<ParticipantEntry>,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IdentityEntry {
    pub id: u64,
    pub name: String,
    #[serde(default = "default_status")]
    pub status: VerificationStatus,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub credits: u64,
}

fn default_status() -> VerificationStatus {
    VerificationStatus::Unverified
}

fn default_score() -> f64 {
    2.5
}

#[derive(Debug, Deserialize)]
pub struct SubmissionEntry {
    pub id: u64,
    pub identity: u64,
    pub selfie: String,
    pub document_front: String,
    #[serde(default)]
    pub document_back: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub created_at: u64,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantEntry {
    pub id: u64,
    pub pool: u64,
    pub identity: u64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub received_payout: bool,
    #[serde(default)]
    pub turn: Option<u32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntry {
    pub pool: u64,
    pub participant: u64,
    pub round: u32,
    #[serde(default)]
    pub amount_cents: u64,
    #[serde(default)]
    pub paid_at: u64,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Materialize the snapshot into a fresh in-memory store.
    pub fn into_store(self) -> anyhow::Result<(MemoryStore, TrustParams)> {
        let store = MemoryStore::new();

        for entry in &self.identities {
            store.put_identity(&IdentityRecord {
                id: IdentityId::new(entry.id),
                display_name: entry.name.clone(),
                verification_status: entry.status,
                blocked: entry.blocked,
                trust_score: entry.score,
                credit_balance: entry.credits,
            })?;
        }

        for entry in &self.submissions {
            store.put_submission(&SubmissionRecord {
                id: SubmissionId::new(entry.id),
                identity: IdentityId::new(entry.identity),
                selfie: Fingerprint::new(entry.selfie.clone()),
                document_front: Fingerprint::new(entry.document_front.clone()),
                document_back: entry.document_back.clone().map(Fingerprint::new),
                status: entry.status,
                review_notes: None,
                created_at: Timestamp::new(entry.created_at),
                reviewed_at: None,
            })?;
        }

        for entry in &self.participants {
            store.put_participant(&ParticipantRecord {
                id: ParticipantId::new(entry.id),
                pool: PoolId::new(entry.pool),
                identity: IdentityId::new(entry.identity),
                active: entry.active,
                received_payout: entry.received_payout,
                turn_position: entry.turn,
            })?;
        }

        for entry in &self.payments {
            store.put_payment(&PaymentRecord {
                pool: PoolId::new(entry.pool),
                participant: ParticipantId::new(entry.participant),
                round: entry.round,
                amount_cents: entry.amount_cents,
                paid_at: Timestamp::new(entry.paid_at),
            })?;
        }

        let params = self.params.unwrap_or_else(TrustParams::platform_defaults);
        Ok((store, params))
    }
}
