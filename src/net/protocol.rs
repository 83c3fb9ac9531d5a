//! Protocol Messages
//!
//! Wire format for the presentation layer (CLI, web form, anything that
//! can speak JSON over a WebSocket). No business logic lives on this
//! side of the seam: messages carry raw input in and engine results or
//! named errors back out.

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerTable;
use crate::protocol::engine::{CommitReceipt, LedgerView, RevealReport};
use crate::protocol::error::{EngineError, LedgerError, ValidationError};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from the presentation layer to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a commitment during the commit phase.
    Commit(SubmissionRequest),

    /// Disclose a value and nonce during the reveal phase.
    Reveal(SubmissionRequest),

    /// Read one ledger table; allowed in every phase.
    FetchLedger {
        /// Which table to read.
        table: LedgerTable,
    },

    /// Latency probe.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: u64,
    },
}

/// Raw (id, value, nonce) input, exactly as the participant typed it.
/// Trimming and checking happen engine-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Free-text participant identifier.
    pub participant_id: String,
    /// The guessed value.
    pub value: i64,
    /// The participant's secret nonce.
    pub nonce: String,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from the server to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The commit was accepted; the receipt echoes preimage and hash so
    /// the participant can save them.
    CommitAccepted(CommitReceipt),

    /// The reveal was recorded, with its verification outcome.
    RevealRecorded(RevealReport),

    /// One ledger table.
    Ledger(LedgerView),

    /// Ping response.
    Pong {
        /// Client timestamp from the ping.
        timestamp: u64,
        /// Server time in Unix milliseconds.
        server_time: u64,
    },

    /// The operation was rejected; `code` is stable for programmatic
    /// handling, `message` names the violated invariant.
    Error(WireError),

    /// Server is shutting down.
    Shutdown {
        /// Human-readable reason.
        reason: String,
    },
}

/// A rejected operation on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable description naming the violated invariant.
    pub message: String,
}

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Participant id empty after trimming.
    EmptyId,
    /// Nonce empty after trimming.
    EmptyNonce,
    /// Value outside the configured bounds.
    OutOfRange,
    /// Field contains the preimage delimiter.
    DelimiterInField,
    /// Operation not permitted in the current phase.
    PhaseViolation,
    /// Participant already committed this round.
    DuplicateCommit,
    /// Backend unavailable; safe to retry.
    Transient,
    /// Message could not be parsed.
    MalformedMessage,
}

impl WireError {
    /// Map an engine error to its wire representation.
    pub fn from_engine(err: &EngineError) -> Self {
        let code = match err {
            EngineError::Validation(ValidationError::EmptyId) => ErrorCode::EmptyId,
            EngineError::Validation(ValidationError::EmptyNonce) => ErrorCode::EmptyNonce,
            EngineError::Validation(ValidationError::OutOfRange { .. }) => ErrorCode::OutOfRange,
            EngineError::Validation(ValidationError::DelimiterInField { .. }) => {
                ErrorCode::DelimiterInField
            }
            EngineError::PhaseViolation { .. } => ErrorCode::PhaseViolation,
            EngineError::Ledger(LedgerError::DuplicateCommit) => ErrorCode::DuplicateCommit,
            EngineError::Ledger(LedgerError::Transient(_)) => ErrorCode::Transient,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }

    /// Build the malformed-message error for unparseable input.
    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self {
            code: ErrorCode::MalformedMessage,
            message: format!("could not parse message: {detail}"),
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::phase::{Operation, Phase};

    #[test]
    fn test_commit_request_json_roundtrip() {
        let msg = ClientMessage::Commit(SubmissionRequest {
            participant_id: "u1".into(),
            value: 42,
            nonce: "abc123".into(),
        });

        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"commit\""));

        let parsed = ClientMessage::from_json(&json).unwrap();
        if let ClientMessage::Commit(req) = parsed {
            assert_eq!(req.participant_id, "u1");
            assert_eq!(req.value, 42);
            assert_eq!(req.nonce, "abc123");
        } else {
            panic!("wrong message type");
        }
    }

    #[test]
    fn test_fetch_ledger_tables() {
        for (table, text) in [
            (LedgerTable::Commits, "commits"),
            (LedgerTable::Reveals, "reveals"),
        ] {
            let json = ClientMessage::FetchLedger { table }.to_json().unwrap();
            assert!(json.contains(text));
            let _ = ClientMessage::from_json(&json).unwrap();
        }
    }

    #[test]
    fn test_error_codes_are_snake_case_on_the_wire() {
        let msg = ServerMessage::Error(WireError {
            code: ErrorCode::DuplicateCommit,
            message: "a commit for this participant already exists".into(),
        });
        let json = msg.to_json().unwrap();
        assert!(json.contains("duplicate_commit"));
    }

    #[test]
    fn test_engine_error_mapping() {
        let cases = [
            (
                EngineError::Validation(ValidationError::EmptyId),
                ErrorCode::EmptyId,
            ),
            (
                EngineError::Validation(ValidationError::OutOfRange {
                    min: 0,
                    max: 100,
                    got: 101,
                }),
                ErrorCode::OutOfRange,
            ),
            (
                EngineError::PhaseViolation {
                    phase: Phase::Waiting,
                    op: Operation::SubmitCommit,
                },
                ErrorCode::PhaseViolation,
            ),
            (
                EngineError::Ledger(LedgerError::DuplicateCommit),
                ErrorCode::DuplicateCommit,
            ),
            (
                EngineError::Ledger(LedgerError::Transient("boom".into())),
                ErrorCode::Transient,
            ),
        ];

        for (err, code) in cases {
            let wire = WireError::from_engine(&err);
            assert_eq!(wire.code, code);
            // The human-readable side keeps the invariant description.
            assert!(!wire.message.is_empty());
        }
    }

    #[test]
    fn test_malformed_input_has_its_own_code() {
        let err = ClientMessage::from_json("{\"type\":\"unknown\"}").unwrap_err();
        let wire = WireError::malformed(err);
        assert_eq!(wire.code, ErrorCode::MalformedMessage);
    }
}
