//! Reveal Verification
//!
//! The one place where the binding guarantee is actually checked: a
//! claimed (value, nonce) either reproduces the stored commitment or it
//! does not. Needs no secret state, so anyone holding the public
//! ledger can rerun it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::hash::Commitment;
use crate::protocol::codec;
use crate::protocol::validate::ParticipantId;

/// Outcome of checking a reveal against the stored commitment.
///
/// These are reported results, not errors: all three are recorded in
/// the ledger so every reveal attempt stays auditable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    /// The recomputed commitment equals the stored one.
    Match,
    /// The participant committed earlier, but to something else.
    Mismatch,
    /// No commitment exists for this participant in the round.
    NoPriorCommit,
}

impl fmt::Display for RevealOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RevealOutcome::Match => "match",
            RevealOutcome::Mismatch => "mismatch",
            RevealOutcome::NoPriorCommit => "no prior commit",
        };
        f.write_str(name)
    }
}

/// Recompute the commitment for the claimed triple and compare it to
/// the stored one. Full 32-byte equality; digests are never truncated.
pub fn verify(
    id: &ParticipantId,
    claimed_value: i64,
    claimed_nonce: &str,
    stored: Option<&Commitment>,
) -> RevealOutcome {
    let Some(stored) = stored else {
        return RevealOutcome::NoPriorCommit;
    };
    let recomputed = codec::encode(id, claimed_value, claimed_nonce).commitment;
    if recomputed == *stored {
        RevealOutcome::Match
    } else {
        RevealOutcome::Mismatch
    }
}
