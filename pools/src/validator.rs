//! The round-payment validator engine.
//!
//! For one pool and one round: decide paid/missed per active participant,
//! feed the reputation ledger and the pool audit trail, then run the
//! expulsion sweep. Event emission is idempotent keyed on
//! `(pool, round, participant)`; a validated round records its outcome set,
//! and re-runs replay that record instead of recomputing.

use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tanda_reputation::ReputationLedger;
use tanda_store::{
    IdentityStore, ParticipantRecord, PoolHistoryRecord, PoolStore, ReputationStore,
    RoundOutcomeRecord, StoreError,
};
use tanda_types::{
    EventKind, IdentityId, ParticipantId, PoolEventKind, PoolId, Timestamp, TrustParams,
};

/// Whether a participant settled the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Paid,
    Missed,
}

/// Per-participant result of one round validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantOutcome {
    pub participant: ParticipantId,
    pub identity: IdentityId,
    pub outcome: PaymentOutcome,
}

/// Result of validating one round of one pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSummary {
    pub pool: PoolId,
    pub round: u32,
    pub outcomes: Vec<ParticipantOutcome>,
    /// Participants expelled when this round was settled.
    pub expelled: Vec<ParticipantId>,
    /// Participants whose lookup or consequence failed; their outcome is
    /// unknown and the round was not marked validated. The rest of the
    /// sweep is unaffected.
    pub failed: Vec<ParticipantId>,
    /// True when the round was already validated and this summary was
    /// rebuilt from its recorded outcome set.
    pub replayed: bool,
}

/// The round-payment validator — stateless logic over the store.
pub struct RoundValidator<S> {
    store: Arc<S>,
    ledger: Arc<ReputationLedger<S>>,
    expulsion_threshold: u32,
}

impl<S> RoundValidator<S>
where
    S: PoolStore + ReputationStore + IdentityStore,
{
    pub fn new(store: Arc<S>, ledger: Arc<ReputationLedger<S>>, params: &TrustParams) -> Self {
        Self {
            store,
            ledger,
            expulsion_threshold: params.expulsion_threshold,
        }
    }

    /// Validate one round: outcomes for every active participant, reputation
    /// events and history entries for the first run, then the expulsion
    /// sweep. One participant's failure never aborts the rest.
    pub fn validate_round(&self, pool: PoolId, round: u32) -> Result<RoundSummary, PoolError> {
        if let Some(recorded) = self.store.validated_round(pool, round)? {
            tracing::info!(%pool, round, "round already validated, replaying recorded outcomes");
            return Ok(Self::replay_summary(pool, round, recorded));
        }

        let participants = self.store.active_participants(pool)?;
        if participants.is_empty() {
            // Unknown pool or everyone already expelled: nothing happened,
            // so nothing gets marked validated.
            tracing::warn!(%pool, round, "no active participants, nothing to validate");
            return Ok(RoundSummary {
                pool,
                round,
                outcomes: Vec::new(),
                expelled: Vec::new(),
                failed: Vec::new(),
                replayed: false,
            });
        }

        let mut outcomes = Vec::with_capacity(participants.len());
        let mut failed = Vec::new();

        for participant in &participants {
            match self.settle_participant(pool, round, participant) {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    tracing::warn!(
                        %pool,
                        round,
                        participant = %participant.id,
                        error = %err,
                        "participant settlement failed, continuing round"
                    );
                    failed.push(participant.id);
                }
            }
        }

        let expelled = self.expulsion_sweep(pool, &participants, &mut failed)?;

        if failed.is_empty() {
            let records: Vec<RoundOutcomeRecord> = outcomes
                .iter()
                .map(|o| RoundOutcomeRecord {
                    participant: o.participant,
                    identity: o.identity,
                    paid: o.outcome == PaymentOutcome::Paid,
                    expelled: expelled.contains(&o.participant),
                })
                .collect();
            self.store.mark_round_validated(pool, round, &records)?;
        }

        tracing::info!(
            %pool,
            round,
            paid = outcomes.iter().filter(|o| o.outcome == PaymentOutcome::Paid).count(),
            missed = outcomes.iter().filter(|o| o.outcome == PaymentOutcome::Missed).count(),
            expelled = expelled.len(),
            failed = failed.len(),
            "round validated"
        );

        Ok(RoundSummary {
            pool,
            round,
            outcomes,
            expelled,
            failed,
            replayed: false,
        })
    }

    /// Rebuild the summary of an already-validated round from its recorded
    /// outcome set. Membership changes after the fact (an expulsion, say)
    /// cannot change what the round reported.
    fn replay_summary(
        pool: PoolId,
        round: u32,
        recorded: Vec<RoundOutcomeRecord>,
    ) -> RoundSummary {
        let expelled = recorded
            .iter()
            .filter(|r| r.expelled)
            .map(|r| r.participant)
            .collect();
        let outcomes = recorded
            .into_iter()
            .map(|r| ParticipantOutcome {
                participant: r.participant,
                identity: r.identity,
                outcome: if r.paid {
                    PaymentOutcome::Paid
                } else {
                    PaymentOutcome::Missed
                },
            })
            .collect();
        RoundSummary {
            pool,
            round,
            outcomes,
            expelled,
            failed: Vec::new(),
            replayed: true,
        }
    }

    /// Freeze a participant's turn after a late/irregular payment: clear the
    /// ordinal position and record the consequence. Does not deactivate.
    /// Returns false (and records nothing) when the turn was already frozen.
    pub fn freeze_turn(
        &self,
        pool: PoolId,
        participant: ParticipantId,
    ) -> Result<bool, PoolError> {
        let record = self.store.get_participant(participant)?;
        if record.pool != pool {
            return Err(PoolError::WrongPool { participant, pool });
        }
        if record.turn_position.is_none() {
            return Ok(false);
        }

        self.store.set_participant_turn(participant, None)?;
        self.store.append_pool_history(&PoolHistoryRecord {
            pool,
            identity: record.identity,
            kind: PoolEventKind::TurnFrozen,
            detail: Some(serde_json::json!({ "reason": "late_payment" })),
            created_at: Timestamp::now(),
        })?;
        tracing::info!(%pool, %participant, identity = %record.identity, "turn frozen");
        Ok(true)
    }

    fn settle_participant(
        &self,
        pool: PoolId,
        round: u32,
        participant: &ParticipantRecord,
    ) -> Result<ParticipantOutcome, PoolError> {
        let payment = self.store.get_payment(pool, participant.id, round)?;

        let outcome = if payment.is_some() {
            self.emit_once(pool, round, participant, EventKind::PaidOnTime)?;
            PaymentOutcome::Paid
        } else {
            self.record_miss(pool, round, participant)?;
            PaymentOutcome::Missed
        };

        Ok(ParticipantOutcome {
            participant: participant.id,
            identity: participant.identity,
            outcome,
        })
    }

    fn record_miss(
        &self,
        pool: PoolId,
        round: u32,
        participant: &ParticipantRecord,
    ) -> Result<(), PoolError> {
        if !self.miss_recorded(pool, round, participant.identity)? {
            self.store.append_pool_history(&PoolHistoryRecord {
                pool,
                identity: participant.identity,
                kind: PoolEventKind::MissedPayment,
                detail: Some(serde_json::json!({ "round": round })),
                created_at: Timestamp::now(),
            })?;
        }
        self.emit_once(pool, round, participant, EventKind::MissedPayment)?;
        Ok(())
    }

    /// Emit a reputation event unless an identical one for this
    /// `(pool, round, participant)` already exists — keeps partial-round
    /// retries from double-counting.
    fn emit_once(
        &self,
        pool: PoolId,
        round: u32,
        participant: &ParticipantRecord,
        kind: EventKind,
    ) -> Result<(), PoolError> {
        let detail = serde_json::json!({
            "pool": pool.as_u64(),
            "round": round,
            "participant": participant.id.as_u64(),
        });
        let already = self
            .store
            .reputation_events(participant.identity)?
            .iter()
            .any(|e| e.kind == kind && e.detail.as_ref() == Some(&detail));
        if !already {
            self.ledger
                .record_event(participant.identity, kind, None, Some(detail))?;
        }
        Ok(())
    }

    fn miss_recorded(
        &self,
        pool: PoolId,
        round: u32,
        identity: IdentityId,
    ) -> Result<bool, StoreError> {
        let round_detail = serde_json::json!({ "round": round });
        Ok(self
            .store
            .pool_history(pool)?
            .iter()
            .any(|h| {
                h.identity == identity
                    && h.kind == PoolEventKind::MissedPayment
                    && h.detail.as_ref() == Some(&round_detail)
            }))
    }

    /// Deactivate every active participant whose lifetime miss count in this
    /// pool reached the threshold. Counts all historical misses, not just
    /// the current round.
    fn expulsion_sweep(
        &self,
        pool: PoolId,
        participants: &[ParticipantRecord],
        failed: &mut Vec<ParticipantId>,
    ) -> Result<Vec<ParticipantId>, PoolError> {
        let mut expelled = Vec::new();
        for participant in participants {
            match self.maybe_expel(pool, participant) {
                Ok(true) => expelled.push(participant.id),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(
                        %pool,
                        participant = %participant.id,
                        error = %err,
                        "expulsion check failed, continuing sweep"
                    );
                    failed.push(participant.id);
                }
            }
        }
        Ok(expelled)
    }

    fn maybe_expel(
        &self,
        pool: PoolId,
        participant: &ParticipantRecord,
    ) -> Result<bool, PoolError> {
        let misses =
            self.store
                .count_pool_history(pool, participant.identity, PoolEventKind::MissedPayment)?;
        if misses < u64::from(self.expulsion_threshold) {
            return Ok(false);
        }

        self.store.set_participant_active(participant.id, false)?;
        self.store.append_pool_history(&PoolHistoryRecord {
            pool,
            identity: participant.identity,
            kind: PoolEventKind::Expelled,
            detail: Some(serde_json::json!({
                "reason": "missed_payments",
                "misses": misses,
            })),
            created_at: Timestamp::now(),
        })?;
        tracing::warn!(
            %pool,
            participant = %participant.id,
            identity = %participant.identity,
            misses,
            "participant expelled"
        );
        Ok(true)
    }
}
