//! Protocol Error Taxonomy
//!
//! Every rejected operation names the invariant it violated; nothing is
//! reported as a bare "something went wrong". Validation and phase
//! errors are raised before any backend call; ledger errors come back
//! from the storage seam.

use thiserror::Error;

use crate::protocol::phase::{Operation, Phase};

/// Rejections from the submission validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Participant id is empty after trimming.
    #[error("participant id must not be empty")]
    EmptyId,

    /// Nonce is empty after trimming. An empty nonce can never match a
    /// nonce-bound commitment, so it is rejected here rather than
    /// surfacing later as a verification mismatch.
    #[error("nonce must not be empty")]
    EmptyNonce,

    /// Value outside the configured bounds.
    #[error("value {got} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
        /// The rejected value.
        got: i64,
    },

    /// A field contains the preimage delimiter, which would make the
    /// canonical `id|value|nonce` encoding ambiguous.
    #[error("{field} must not contain the '|' delimiter")]
    DelimiterInField {
        /// Which field was rejected.
        field: &'static str,
    },
}

/// Failures reported by a ledger backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A commit for this participant already exists in the round.
    /// The first commit is authoritative and is never overwritten.
    #[error("a commit for this participant already exists; the first commit stands")]
    DuplicateCommit,

    /// The backend could not be reached or did not answer in time.
    /// Safe to retry; the engine never retries automatically.
    #[error("ledger backend unavailable: {0} (safe to retry)")]
    Transient(String),
}

/// Errors returned by the round engine's operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Input failed validation; nothing was hashed or stored.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation is not permitted in the current phase; nothing was
    /// stored and nothing is queued for a later phase.
    #[error("{op} is not allowed while the round is in the {phase} phase")]
    PhaseViolation {
        /// Phase the round was in when the operation arrived.
        phase: Phase,
        /// The rejected operation.
        op: Operation,
    },

    /// The ledger backend rejected or failed the call.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
