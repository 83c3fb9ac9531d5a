//! Commitment Hashing
//!
//! SHA-256 digests for commitments and configuration fingerprints.
//! The digest width (256 bits) and the hex wire form are fixed so that
//! anyone can recompute a commitment from the public ledger with any
//! off-the-shelf SHA-256 tool.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Raw digest type (256 bits / 32 bytes).
pub type Digest32 = [u8; 32];

/// Errors from parsing a hex-encoded digest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexDigestError {
    /// The string is not valid hexadecimal.
    #[error("invalid hex digest: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Decoded to the wrong number of bytes.
    #[error("digest must be 32 bytes, got {got}")]
    WrongLength {
        /// Number of bytes actually decoded.
        got: usize,
    },
}

/// A one-way commitment binding a participant to a hidden value.
///
/// Immutable once produced. Serialized as lowercase hex on the wire and
/// in the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment(Digest32);

impl Commitment {
    /// Wrap a raw 32-byte digest.
    pub const fn from_bytes(bytes: Digest32) -> Self {
        Self(bytes)
    }

    /// Borrow the raw digest bytes.
    pub fn as_bytes(&self) -> &Digest32 {
        &self.0
    }

    /// Lowercase hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex, accepting upper or lower case.
    pub fn from_hex(text: &str) -> Result<Self, HexDigestError> {
        let bytes = hex::decode(text.trim())?;
        let digest: Digest32 = bytes
            .try_into()
            .map_err(|rejected: Vec<u8>| HexDigestError::WrongLength {
                got: rejected.len(),
            })?;
        Ok(Self(digest))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(D::Error::custom)
    }
}

/// SHA-256 of arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 with a domain separator prefix.
///
/// Used for internal fingerprints (round configuration), never for
/// commitments themselves: commitments hash the bare preimage so that
/// participants can verify them independently.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}
