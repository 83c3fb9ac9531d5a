//! Commit-Reveal Protocol Engine
//!
//! The deterministic heart of the crate. Everything in here is pure
//! except the engine's calls through the ledger client:
//!
//! ```text
//! validate -> encode ---------------> ledger.put_commit     (commits)
//! validate -> ledger.get_commit -> verify -> ledger.put_reveal (reveals)
//! ```

pub mod codec;
pub mod engine;
pub mod error;
pub mod phase;
pub mod validate;
pub mod verify;

pub use codec::{encode, EncodedCommit, PREIMAGE_DELIMITER};
pub use engine::{CommitReceipt, LedgerView, RevealReport, RoundEngine};
pub use error::{EngineError, LedgerError, ValidationError};
pub use phase::{Operation, Phase, RoundSchedule};
pub use validate::{validate_submission, ParticipantId, ValidatedSubmission, ValueBounds};
pub use verify::{verify, RevealOutcome};
