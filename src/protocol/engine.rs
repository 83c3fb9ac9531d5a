//! Round Engine
//!
//! Orchestrates one commit-reveal round: validation, phase gating, the
//! codec, the verifier, and the ledger seam. Acceptance policy lives
//! here:
//!
//! - first commit wins; later commits from the same id are rejected
//! - unverifiable reveals are stored and flagged, never dropped
//! - out-of-phase submissions are rejected outright, never queued

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::clock::Clock;
use crate::core::hash::Commitment;
use crate::ledger::{CommitRecord, LedgerClient, LedgerTable, RevealRecord};
use crate::protocol::codec;
use crate::protocol::error::EngineError;
use crate::protocol::phase::{Operation, Phase, RoundSchedule};
use crate::protocol::validate::{validate_submission, ParticipantId, ValueBounds};
use crate::protocol::verify::{verify, RevealOutcome};

/// Returned to a participant whose commit was accepted.
///
/// Echoes the preimage so the participant can save it alongside the
/// nonce; without the nonce they cannot reveal later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Normalized participant id.
    pub participant_id: ParticipantId,
    /// The exact text that was hashed.
    pub preimage: String,
    /// The stored commitment.
    pub commitment: Commitment,
    /// Acceptance time.
    pub submitted_at: DateTime<Utc>,
}

/// Returned to a participant whose reveal was recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealReport {
    /// Normalized participant id.
    pub participant_id: ParticipantId,
    /// The disclosed value.
    pub value: i64,
    /// Verification result; `NoPriorCommit` and `Mismatch` reveals are
    /// recorded too.
    pub outcome: RevealOutcome,
    /// Acceptance time.
    pub submitted_at: DateTime<Utc>,
}

/// One table of the public ledger, as returned to readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "records", rename_all = "snake_case")]
pub enum LedgerView {
    /// Commit records, insertion order.
    Commits(Vec<CommitRecord>),
    /// Reveal records, insertion order.
    Reveals(Vec<RevealRecord>),
}

/// The commit-reveal engine for a single round.
///
/// Pure apart from calls through the ledger client; the clock is
/// injected, so behavior at any instant is fully determined by its
/// inputs.
#[derive(Clone, Debug)]
pub struct RoundEngine<L, C> {
    schedule: RoundSchedule,
    bounds: ValueBounds,
    ledger: L,
    clock: C,
}

impl<L: LedgerClient, C: Clock> RoundEngine<L, C> {
    /// Assemble an engine from an already-validated configuration.
    pub fn new(schedule: RoundSchedule, bounds: ValueBounds, ledger: L, clock: C) -> Self {
        Self {
            schedule,
            bounds,
            ledger,
            clock,
        }
    }

    /// The round's deadlines.
    pub fn schedule(&self) -> RoundSchedule {
        self.schedule
    }

    /// The round's value bounds.
    pub fn bounds(&self) -> ValueBounds {
        self.bounds
    }

    /// Current instant per the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Current phase per the injected clock.
    pub fn phase(&self) -> Phase {
        self.schedule.phase(self.clock.now())
    }

    /// Accept a commitment during the commit phase.
    ///
    /// Validation and phase gating run before anything is hashed or any
    /// backend call is made. The first accepted commit per participant
    /// is authoritative; later ones fail with `DuplicateCommit`.
    pub async fn submit_commit(
        &self,
        id: &str,
        value: i64,
        nonce: &str,
    ) -> Result<CommitReceipt, EngineError> {
        let submission = validate_submission(id, value, nonce, self.bounds)?;

        let now = self.clock.now();
        if !self.schedule.is_allowed(now, Operation::SubmitCommit) {
            let phase = self.schedule.phase(now);
            warn!(participant = %submission.id, %phase, "commit rejected: wrong phase");
            return Err(EngineError::PhaseViolation {
                phase,
                op: Operation::SubmitCommit,
            });
        }

        let encoded = codec::encode(&submission.id, submission.value, &submission.nonce);
        self.ledger
            .put_commit(CommitRecord {
                participant_id: submission.id.clone(),
                commitment: encoded.commitment,
                submitted_at: now,
            })
            .await?;

        info!(participant = %submission.id, commitment = %encoded.commitment, "commit accepted");
        Ok(CommitReceipt {
            participant_id: submission.id,
            preimage: encoded.preimage,
            commitment: encoded.commitment,
            submitted_at: now,
        })
    }

    /// Accept a reveal during the reveal phase.
    ///
    /// The claimed triple is verified against the stored commitment and
    /// the attempt is recorded with its outcome either way; a reveal
    /// with no prior commit is stored and flagged, not dropped.
    pub async fn submit_reveal(
        &self,
        id: &str,
        value: i64,
        nonce: &str,
    ) -> Result<RevealReport, EngineError> {
        let submission = validate_submission(id, value, nonce, self.bounds)?;

        let now = self.clock.now();
        if !self.schedule.is_allowed(now, Operation::SubmitReveal) {
            let phase = self.schedule.phase(now);
            warn!(participant = %submission.id, %phase, "reveal rejected: wrong phase");
            return Err(EngineError::PhaseViolation {
                phase,
                op: Operation::SubmitReveal,
            });
        }

        let stored = self.ledger.get_commit(&submission.id).await?;
        let outcome = verify(
            &submission.id,
            submission.value,
            &submission.nonce,
            stored.as_ref(),
        );

        self.ledger
            .put_reveal(RevealRecord {
                participant_id: submission.id.clone(),
                value: submission.value,
                nonce: submission.nonce,
                outcome,
                submitted_at: now,
            })
            .await?;

        match outcome {
            RevealOutcome::Match => {
                info!(participant = %submission.id, "reveal verified")
            }
            RevealOutcome::Mismatch => {
                warn!(participant = %submission.id, "reveal does not match stored commitment")
            }
            RevealOutcome::NoPriorCommit => {
                warn!(participant = %submission.id, "reveal recorded without a prior commit")
            }
        }

        Ok(RevealReport {
            participant_id: submission.id,
            value: submission.value,
            outcome,
            submitted_at: now,
        })
    }

    /// Read one ledger table. Allowed in every phase.
    pub async fn fetch_ledger(&self, table: LedgerTable) -> Result<LedgerView, EngineError> {
        let view = match table {
            LedgerTable::Commits => LedgerView::Commits(self.ledger.list_commits().await?),
            LedgerTable::Reveals => LedgerView::Reveals(self.ledger.list_reveals().await?),
        };
        Ok(view)
    }
}
