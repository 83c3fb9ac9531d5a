//! Submission Validation
//!
//! Normalizes and checks raw participant input before it reaches the
//! codec. Commit and reveal input obey identical rules; nothing is
//! hashed or stored until validation passes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::codec::PREIMAGE_DELIMITER;
use crate::protocol::error::ValidationError;

/// Opaque participant identifier.
///
/// Free text supplied by the participant, unique per round but not
/// authenticated. Non-empty and delimiter-free by construction; `Ord`
/// so ledgers can index it deterministically.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Trim and validate a raw identifier.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if trimmed.contains(PREIMAGE_DELIMITER) {
            return Err(ValidationError::DelimiterInField {
                field: "participant id",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed interval of permitted values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueBounds {
    min: i64,
    max: i64,
}

impl ValueBounds {
    /// Build bounds, rejecting `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, crate::config::ConfigError> {
        if min > max {
            return Err(crate::config::ConfigError::InvalidValueBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether `value` lies within the interval.
    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ValueBounds {
    /// The classic 0..=100 guessing range.
    fn default() -> Self {
        Self {
            min: crate::DEFAULT_MIN_VALUE,
            max: crate::DEFAULT_MAX_VALUE,
        }
    }
}

/// A commit or reveal submission that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedSubmission {
    /// Normalized participant id.
    pub id: ParticipantId,
    /// In-bounds value.
    pub value: i64,
    /// Trimmed, non-empty, delimiter-free nonce.
    pub nonce: String,
}

/// Validate raw (id, value, nonce) input against `bounds`.
///
/// The same rules apply to commits and reveals: a reveal with an empty
/// nonce cannot match any nonce-bound commitment, so it is rejected
/// here instead of being reported as a mismatch.
pub fn validate_submission(
    id: &str,
    value: i64,
    nonce: &str,
    bounds: ValueBounds,
) -> Result<ValidatedSubmission, ValidationError> {
    let id = ParticipantId::new(id)?;

    if !bounds.contains(value) {
        return Err(ValidationError::OutOfRange {
            min: bounds.min(),
            max: bounds.max(),
            got: value,
        });
    }

    let nonce = nonce.trim();
    if nonce.is_empty() {
        return Err(ValidationError::EmptyNonce);
    }
    if nonce.contains(PREIMAGE_DELIMITER) {
        return Err(ValidationError::DelimiterInField { field: "nonce" });
    }

    Ok(ValidatedSubmission {
        id,
        value,
        nonce: nonce.to_owned(),
    })
}
