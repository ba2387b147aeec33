//! Behavioral event kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reputation-affecting behavior. Default score deltas live in
/// [`crate::EventWeights`]; callers may override per event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PaidOnTime,
    PaidLate,
    MissedPayment,
    PoolCreatedSuccess,
    DonationValidated,
    VolunteerHelp,
    FraudReported,
    DuplicateAccountAttempt,
    /// Delta must be supplied explicitly by the caller.
    ManualAdjustment,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::PaidOnTime => "paid_on_time",
            EventKind::PaidLate => "paid_late",
            EventKind::MissedPayment => "missed_payment",
            EventKind::PoolCreatedSuccess => "pool_created_success",
            EventKind::DonationValidated => "donation_validated",
            EventKind::VolunteerHelp => "volunteer_help",
            EventKind::FraudReported => "fraud_reported",
            EventKind::DuplicateAccountAttempt => "duplicate_account_attempt",
            EventKind::ManualAdjustment => "manual_adjustment",
        };
        write!(f, "{s}")
    }
}

/// Pool-level audit-trail event kinds, one history entry per consequence
/// applied to a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEventKind {
    MissedPayment,
    Expelled,
    TurnFrozen,
}

impl fmt::Display for PoolEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoolEventKind::MissedPayment => "missed_payment",
            PoolEventKind::Expelled => "expelled",
            PoolEventKind::TurnFrozen => "turn_frozen",
        };
        write!(f, "{s}")
    }
}
