//! # Beauty Contest Server
//!
//! Commit-reveal round server for a sealed-bid classroom game:
//! participants secretly pick a number, bind themselves to it with a
//! SHA-256 commitment, and later disclose number + nonce so everyone
//! can check the disclosure against the public ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  BEAUTY CONTEST SERVER                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                               │
//! │  ├── hash.rs     - SHA-256 commitments, hex encoding        │
//! │  └── clock.rs    - Injected clock (system / manual)         │
//! │                                                             │
//! │  protocol/       - The engine (deterministic)               │
//! │  ├── codec.rs    - id|value|nonce preimage encoding         │
//! │  ├── phase.rs    - Commit / Waiting / Reveal gating         │
//! │  ├── validate.rs - Input normalization and bounds           │
//! │  ├── verify.rs   - Reveal verification                      │
//! │  └── engine.rs   - Acceptance policy, orchestration         │
//! │                                                             │
//! │  ledger/         - Storage seam                             │
//! │  ├── mod.rs      - Records + LedgerClient contract          │
//! │  ├── memory.rs   - In-memory reference backend              │
//! │  └── timed.rs    - Per-call timeout decorator               │
//! │                                                             │
//! │  net/            - WebSocket front end (no business logic)  │
//! │  ├── protocol.rs - JSON message types                       │
//! │  └── server.rs   - Connection handling, dispatch            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Integrity Guarantee
//!
//! A commitment is SHA-256 of the UTF-8 text `id|value|nonce`. Once the
//! commit deadline passes, a participant cannot change their value:
//! any reveal is recomputed and compared against the stored digest, and
//! every attempt — match, mismatch, or orphan — lands on the public
//! ledger. Verification needs no secret state, so anyone can audit it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod ledger;
pub mod net;
pub mod protocol;

// Re-export commonly used types
pub use crate::config::{AppConfig, ConfigError};
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::hash::Commitment;
pub use crate::ledger::{
    CommitRecord, InMemoryLedger, LedgerClient, LedgerTable, RevealRecord, TimedLedger,
};
pub use crate::protocol::engine::{CommitReceipt, LedgerView, RevealReport, RoundEngine};
pub use crate::protocol::error::{EngineError, LedgerError, ValidationError};
pub use crate::protocol::phase::{Operation, Phase, RoundSchedule};
pub use crate::protocol::validate::{ParticipantId, ValueBounds};
pub use crate::protocol::verify::RevealOutcome;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default lower bound for committed values (inclusive).
pub const DEFAULT_MIN_VALUE: i64 = 0;

/// Default upper bound for committed values (inclusive).
pub const DEFAULT_MAX_VALUE: i64 = 100;
