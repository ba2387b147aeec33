//! Trust parameters — every tunable value of the core in one injectable
//! struct, never a hidden global.

use crate::event::EventKind;
use serde::{Deserialize, Serialize};

/// Default score delta per event kind. Part of the deployed configuration;
/// callers may still override the delta on any individual event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventWeights {
    pub paid_on_time: f64,
    pub paid_late: f64,
    pub missed_payment: f64,
    pub pool_created_success: f64,
    pub donation_validated: f64,
    pub volunteer_help: f64,
    pub fraud_reported: f64,
    pub duplicate_account_attempt: f64,
    pub manual_adjustment: f64,
}

impl EventWeights {
    pub fn delta_for(&self, kind: EventKind) -> f64 {
        match kind {
            EventKind::PaidOnTime => self.paid_on_time,
            EventKind::PaidLate => self.paid_late,
            EventKind::MissedPayment => self.missed_payment,
            EventKind::PoolCreatedSuccess => self.pool_created_success,
            EventKind::DonationValidated => self.donation_validated,
            EventKind::VolunteerHelp => self.volunteer_help,
            EventKind::FraudReported => self.fraud_reported,
            EventKind::DuplicateAccountAttempt => self.duplicate_account_attempt,
            EventKind::ManualAdjustment => self.manual_adjustment,
        }
    }
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            paid_on_time: 0.5,
            paid_late: -0.5,
            missed_payment: -1.5,
            pool_created_success: 1.0,
            donation_validated: 0.3,
            volunteer_help: 0.4,
            fraud_reported: -2.0,
            duplicate_account_attempt: -5.0,
            manual_adjustment: 0.0,
        }
    }
}

/// How the Similarity Screener decides two display names belong to the same
/// person. Which rule runs is configuration, not code.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum NameMatchRule {
    /// `lower(a) == lower(b)`.
    ExactCaseInsensitive,
    /// Trigram similarity at or above `threshold` (0.0..=1.0).
    Fuzzy { threshold: f64 },
}

/// All tunable parameters of the trust core.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustParams {
    // ── Reputation score formula ─────────────────────────────────────────
    /// Starting trust level assigned to every new identity.
    pub score_base: f64,

    /// How much one clamped delta point moves the public score.
    pub score_scale: f64,

    /// Symmetric clamp applied to the raw delta sum before scaling.
    pub raw_delta_clamp: f64,

    /// Lower bound of the public score range.
    pub score_min: f64,

    /// Upper bound of the public score range.
    pub score_max: f64,

    /// Default delta per event kind.
    pub event_weights: EventWeights,

    // ── Duplicate detection ──────────────────────────────────────────────
    /// Display-name similarity rule for the Similarity Screener.
    pub name_match: NameMatchRule,

    // ── Round settlement ─────────────────────────────────────────────────
    /// Lifetime missed payments in one pool that trigger expulsion.
    pub expulsion_threshold: u32,
}

impl TrustParams {
    /// Platform defaults — the deployed configuration.
    pub fn platform_defaults() -> Self {
        Self {
            score_base: 2.5,
            score_scale: 0.2,
            raw_delta_clamp: 10.0,
            score_min: 0.0,
            score_max: 5.0,
            event_weights: EventWeights::default(),
            name_match: NameMatchRule::Fuzzy { threshold: 0.70 },
            expulsion_threshold: 3,
        }
    }
}

impl Default for TrustParams {
    fn default() -> Self {
        Self::platform_defaults()
    }
}
