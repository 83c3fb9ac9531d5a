//! Phase Gate
//!
//! Classifies a round into Commit / Waiting / Reveal purely from the
//! current time and the configured deadlines. Transitions are monotonic
//! in time; no external event moves the state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Protocol phase. Monotone in time:
/// `CommitOpen` until the commit deadline, `RevealOpen` from the reveal
/// opening onward, `Waiting` in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Commits are accepted (`now <= commit_deadline`).
    CommitOpen,
    /// Commits have closed, reveals not yet open.
    Waiting,
    /// Reveals are accepted (`now >= reveal_open`); open-ended.
    RevealOpen,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::CommitOpen => "commit",
            Phase::Waiting => "waiting",
            Phase::RevealOpen => "reveal",
        };
        f.write_str(name)
    }
}

/// Operations subject to phase gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Submitting a commitment.
    SubmitCommit,
    /// Disclosing a value and nonce.
    SubmitReveal,
    /// Reading the public ledger; allowed in every phase.
    ReadLedger,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SubmitCommit => "submitting a commit",
            Operation::SubmitReveal => "submitting a reveal",
            Operation::ReadLedger => "reading the ledger",
        };
        f.write_str(name)
    }
}

/// Commit deadline and reveal opening for one round.
///
/// `reveal_open >= commit_deadline` is enforced at construction; a
/// schedule violating it never exists at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSchedule {
    commit_deadline: DateTime<Utc>,
    reveal_open: DateTime<Utc>,
}

impl RoundSchedule {
    /// Build a schedule, rejecting a reveal opening before the commit
    /// deadline.
    pub fn new(
        commit_deadline: DateTime<Utc>,
        reveal_open: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        if reveal_open < commit_deadline {
            return Err(ConfigError::RevealBeforeCommitDeadline {
                commit_deadline,
                reveal_open,
            });
        }
        Ok(Self {
            commit_deadline,
            reveal_open,
        })
    }

    /// Last instant at which commits are accepted (inclusive).
    pub fn commit_deadline(&self) -> DateTime<Utc> {
        self.commit_deadline
    }

    /// First instant at which reveals are accepted (inclusive).
    pub fn reveal_open(&self) -> DateTime<Utc> {
        self.reveal_open
    }

    /// Classify the round at instant `now`. Pure.
    pub fn phase(&self, now: DateTime<Utc>) -> Phase {
        if now <= self.commit_deadline {
            Phase::CommitOpen
        } else if now < self.reveal_open {
            Phase::Waiting
        } else {
            Phase::RevealOpen
        }
    }

    /// Whether `op` is permitted at instant `now`. Pure.
    pub fn is_allowed(&self, now: DateTime<Utc>, op: Operation) -> bool {
        match op {
            Operation::SubmitCommit => self.phase(now) == Phase::CommitOpen,
            Operation::SubmitReveal => self.phase(now) == Phase::RevealOpen,
            Operation::ReadLedger => true,
        }
    }
}
