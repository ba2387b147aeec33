//! tanda — batch harness for the trust core.
//!
//! Loads a TOML state snapshot into the in-memory store, runs one core
//! operation (round settlement, duplicate arbitration, score recompute),
//! and logs the outcome. Domain rejections are expected results and exit 0;
//! infrastructure failures exit non-zero.

mod snapshot;

use anyhow::Context;
use clap::{Parser, Subcommand};
use snapshot::Snapshot;
use std::path::PathBuf;
use std::sync::Arc;
use tanda_pools::{PaymentOutcome, RoundValidator};
use tanda_reputation::ReputationLedger;
use tanda_types::{IdentityId, ParticipantId, PoolId, SubmissionId};
use tanda_verification::{Decision, DuplicateArbiter};

#[derive(Parser)]
#[command(name = "tanda", about = "tanda trust core batch harness")]
struct Cli {
    /// Path to the TOML state snapshot.
    #[arg(long, default_value = "state.toml", env = "TANDA_STATE")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate one round of one pool: outcomes, penalties, expulsions.
    Settle {
        #[arg(long)]
        pool: u64,
        #[arg(long)]
        round: u32,
    },
    /// Run the duplicate-account arbiter over a pending submission.
    Evaluate {
        #[arg(long)]
        submission: u64,
    },
    /// Freeze a participant's turn after a late payment.
    FreezeTurn {
        #[arg(long)]
        pool: u64,
        #[arg(long)]
        participant: u64,
    },
    /// Recompute and print an identity's trust score.
    Score {
        #[arg(long)]
        identity: u64,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let snapshot = Snapshot::load(&cli.state)?;
    tracing::info!(
        identities = snapshot.identities.len(),
        submissions = snapshot.submissions.len(),
        participants = snapshot.participants.len(),
        payments = snapshot.payments.len(),
        "snapshot loaded"
    );
    let (store, params) = snapshot.into_store()?;
    let store = Arc::new(store);
    let ledger = Arc::new(ReputationLedger::new(store.clone(), params.clone()));

    match cli.command {
        Command::Settle { pool, round } => {
            let validator = RoundValidator::new(store.clone(), ledger, &params);
            let summary = validator
                .validate_round(PoolId::new(pool), round)
                .context("round validation failed")?;
            for outcome in &summary.outcomes {
                let status = match outcome.outcome {
                    PaymentOutcome::Paid => "paid",
                    PaymentOutcome::Missed => "missed",
                };
                println!(
                    "participant {} (identity {}): {status}",
                    outcome.participant, outcome.identity
                );
            }
            for participant in &summary.expelled {
                println!("participant {participant}: expelled");
            }
            for participant in &summary.failed {
                println!("participant {participant}: FAILED (retry the round)");
            }
        }
        Command::Evaluate { submission } => {
            let arbiter = DuplicateArbiter::new(store.clone(), ledger, &params);
            let decision = arbiter
                .evaluate(SubmissionId::new(submission))
                .context("duplicate evaluation failed")?;
            match decision {
                Decision::Pass => println!("submission {submission}: pass (pending review)"),
                Decision::Reject {
                    reason,
                    conflict,
                    other_matches,
                } => {
                    println!("submission {submission}: rejected ({reason}, conflicts with identity {conflict})");
                    for m in other_matches {
                        println!("  also similar: identity {} ({:.2})", m.identity, m.score);
                    }
                }
            }
        }
        Command::FreezeTurn { pool, participant } => {
            let validator = RoundValidator::new(store.clone(), ledger, &params);
            let frozen = validator
                .freeze_turn(PoolId::new(pool), ParticipantId::new(participant))
                .context("freeze-turn failed")?;
            if frozen {
                println!("participant {participant}: turn frozen");
            } else {
                println!("participant {participant}: turn already unassigned");
            }
        }
        Command::Score { identity } => {
            let score = ledger
                .recompute(IdentityId::new(identity))
                .context("score recompute failed")?;
            println!("identity {identity}: trust score {score:.2}");
        }
    }

    Ok(())
}
