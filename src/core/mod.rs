//! Core primitives.
//!
//! Hashing and time: the two things every other module leans on.
//! Both are deterministic from the caller's perspective; the clock is
//! injected so the protocol engine stays pure and testable.

pub mod clock;
pub mod hash;

// Re-export core types
pub use clock::{Clock, ManualClock, SystemClock};
pub use hash::{hash_bytes, hash_with_domain, Commitment, Digest32};
