//! Commitment Codec
//!
//! Deterministic encoding of (id, value, nonce) into a text preimage
//! and its SHA-256 commitment. The preimage layout is `id|value|nonce`
//! in UTF-8 with the value in canonical decimal, so a participant can
//! re-derive their commitment with nothing but a SHA-256 tool.

use crate::core::hash::{hash_bytes, Commitment};
use crate::protocol::validate::ParticipantId;

/// Field separator inside the preimage. The validator forbids it in
/// user-supplied fields, which keeps the encoding unambiguous.
pub const PREIMAGE_DELIMITER: char = '|';

/// A preimage together with its commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedCommit {
    /// Canonical `id|value|nonce` text. Secret until reveal.
    pub preimage: String,
    /// SHA-256 of the preimage's UTF-8 bytes.
    pub commitment: Commitment,
}

/// Build the canonical preimage and commitment for a submission.
///
/// Pure: identical inputs always yield identical output, across calls
/// and across processes. `value` serializes via `i64` `Display`, which
/// is canonical decimal (no leading zeros, no sign for non-negative
/// values).
pub fn encode(id: &ParticipantId, value: i64, nonce: &str) -> EncodedCommit {
    let preimage = format!(
        "{id}{d}{value}{d}{nonce}",
        id = id.as_str(),
        d = PREIMAGE_DELIMITER,
    );
    let commitment = Commitment::from_bytes(hash_bytes(preimage.as_bytes()));
    EncodedCommit {
        preimage,
        commitment,
    }
}
