//! Ledger Records and Client Contract
//!
//! The engine never touches storage directly; it speaks to a
//! [`LedgerClient`]. The crate ships an in-memory reference backend for
//! tests and the demo, plus a timeout decorator for the network seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::hash::Commitment;
use crate::protocol::error::LedgerError;
use crate::protocol::validate::ParticipantId;
use crate::protocol::verify::RevealOutcome;

pub mod memory;
pub mod timed;

pub use memory::{InMemoryLedger, LedgerSnapshot};
pub use timed::TimedLedger;

/// Which ledger table a read targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTable {
    /// The commitment table.
    Commits,
    /// The reveal table.
    Reveals,
}

/// A stored commitment. Created exactly once per participant per round,
/// when a valid commit is accepted during the commit phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Who committed.
    pub participant_id: ParticipantId,
    /// The one-way hash they are bound to.
    pub commitment: Commitment,
    /// Server-side acceptance time.
    pub submitted_at: DateTime<Utc>,
}

/// A stored reveal. Every reveal attempt accepted during the reveal
/// phase lands here, including unverifiable ones, flagged by `outcome`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRecord {
    /// Who revealed.
    pub participant_id: ParticipantId,
    /// The disclosed value.
    pub value: i64,
    /// The disclosed nonce.
    pub nonce: String,
    /// Verification result at acceptance time.
    pub outcome: RevealOutcome,
    /// Server-side acceptance time.
    pub submitted_at: DateTime<Utc>,
}

/// Storage contract consumed by the engine, implemented by backends.
///
/// Requirements on implementations:
/// - `put_commit` must be atomic with respect to the duplicate check:
///   check-then-insert in one critical section, or a storage-level
///   uniqueness constraint on the participant id. Two concurrent first
///   commits for the same id must not both succeed.
/// - A write that returned `Ok` is visible to subsequent reads.
/// - `list_commits` / `list_reveals` return records in insertion order.
#[allow(async_fn_in_trait)]
pub trait LedgerClient: Send + Sync {
    /// Append a commit record. Fails with
    /// [`LedgerError::DuplicateCommit`] if the participant already
    /// committed this round; the stored record is left untouched.
    async fn put_commit(&self, record: CommitRecord) -> Result<(), LedgerError>;

    /// Append a reveal record. Reveals are never deduplicated; every
    /// attempt stays visible for auditing.
    async fn put_reveal(&self, record: RevealRecord) -> Result<(), LedgerError>;

    /// Look up the stored commitment for a participant.
    async fn get_commit(&self, id: &ParticipantId) -> Result<Option<Commitment>, LedgerError>;

    /// All commit records, oldest first.
    async fn list_commits(&self) -> Result<Vec<CommitRecord>, LedgerError>;

    /// All reveal records, oldest first.
    async fn list_reveals(&self) -> Result<Vec<RevealRecord>, LedgerError>;
}
