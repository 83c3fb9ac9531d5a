//! Startup Configuration
//!
//! Round deadlines, value bounds, bind address, and the ledger timeout.
//! Everything is validated up front: a bad configuration is a fatal
//! startup error, never a runtime state the engine has to cope with.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::hash::hash_with_domain;
use crate::protocol::phase::RoundSchedule;
use crate::protocol::validate::ValueBounds;

/// Domain separator for the round fingerprint.
const ROUND_FINGERPRINT_DOMAIN: &[u8] = b"BEAUTY_CONTEST_ROUND_V1";

/// Fatal configuration errors, surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The reveal window would open before commits close.
    #[error("reveal opens at {reveal_open} but commits close at {commit_deadline}; reveal must not open before the commit deadline")]
    RevealBeforeCommitDeadline {
        /// Configured commit deadline.
        commit_deadline: DateTime<Utc>,
        /// Configured reveal opening.
        reveal_open: DateTime<Utc>,
    },

    /// Lower bound above upper bound.
    #[error("invalid value bounds: min {min} is greater than max {max}")]
    InvalidValueBounds {
        /// Configured lower bound.
        min: i64,
        /// Configured upper bound.
        max: i64,
    },

    /// A required variable is not set.
    #[error("missing required configuration variable {var}")]
    MissingVar {
        /// Variable name.
        var: &'static str,
    },

    /// A timestamp variable is not valid RFC 3339.
    #[error("{var} is not a valid RFC 3339 timestamp: {reason}")]
    BadTimestamp {
        /// Variable name.
        var: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A numeric variable failed to parse.
    #[error("{var} is not a valid integer: {reason}")]
    BadNumber {
        /// Variable name.
        var: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The bind address failed to parse.
    #[error("{var} is not a valid socket address: {reason}")]
    BadBindAddr {
        /// Variable name.
        var: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// Environment variable names, `CONTEST_*`.
mod vars {
    pub const COMMIT_DEADLINE: &str = "CONTEST_COMMIT_DEADLINE";
    pub const REVEAL_OPEN: &str = "CONTEST_REVEAL_OPEN";
    pub const MIN_VALUE: &str = "CONTEST_MIN_VALUE";
    pub const MAX_VALUE: &str = "CONTEST_MAX_VALUE";
    pub const BIND_ADDR: &str = "CONTEST_BIND_ADDR";
    pub const LEDGER_TIMEOUT_MS: &str = "CONTEST_LEDGER_TIMEOUT_MS";
}

/// Default bind address for the WebSocket endpoint.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default bound on each ledger backend call.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Validated application configuration.
#[derive(Clone, Copy, Debug)]
pub struct AppConfig {
    /// Commit deadline and reveal opening.
    pub schedule: RoundSchedule,
    /// Permitted value interval.
    pub bounds: ValueBounds,
    /// WebSocket bind address.
    pub bind_addr: SocketAddr,
    /// Timeout applied to every ledger backend call.
    pub ledger_timeout: Duration,
}

impl AppConfig {
    /// Load from `CONTEST_*` environment variables.
    ///
    /// `CONTEST_COMMIT_DEADLINE` and `CONTEST_REVEAL_OPEN` (RFC 3339)
    /// are required; bounds default to 0..=100, the bind address to
    /// `0.0.0.0:8080`, and the ledger timeout to 15 seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from any variable source. Split out from [`Self::from_env`]
    /// so tests can inject variables without touching process state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let commit_deadline = parse_timestamp(required(&lookup, vars::COMMIT_DEADLINE)?, vars::COMMIT_DEADLINE)?;
        let reveal_open = parse_timestamp(required(&lookup, vars::REVEAL_OPEN)?, vars::REVEAL_OPEN)?;
        let schedule = RoundSchedule::new(commit_deadline, reveal_open)?;

        let min = parse_i64(&lookup, vars::MIN_VALUE, crate::DEFAULT_MIN_VALUE)?;
        let max = parse_i64(&lookup, vars::MAX_VALUE, crate::DEFAULT_MAX_VALUE)?;
        let bounds = ValueBounds::new(min, max)?;

        let bind_text = lookup(vars::BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr: SocketAddr =
            bind_text
                .parse()
                .map_err(|err: std::net::AddrParseError| ConfigError::BadBindAddr {
                    var: vars::BIND_ADDR,
                    reason: err.to_string(),
                })?;

        let ledger_timeout = match lookup(vars::LEDGER_TIMEOUT_MS) {
            Some(text) => Duration::from_millis(text.trim().parse().map_err(
                |err: std::num::ParseIntError| ConfigError::BadNumber {
                    var: vars::LEDGER_TIMEOUT_MS,
                    reason: err.to_string(),
                },
            )?),
            None => DEFAULT_LEDGER_TIMEOUT,
        };

        Ok(Self {
            schedule,
            bounds,
            bind_addr,
            ledger_timeout,
        })
    }

    /// Short hex fingerprint of the round parameters, for log lines and
    /// for participants to confirm everyone sees the same round.
    pub fn round_fingerprint(&self) -> String {
        let text = format!(
            "{}|{}|{}|{}",
            self.schedule.commit_deadline().to_rfc3339(),
            self.schedule.reveal_open().to_rfc3339(),
            self.bounds.min(),
            self.bounds.max(),
        );
        let digest = hash_with_domain(ROUND_FINGERPRINT_DOMAIN, text.as_bytes());
        hex::encode(&digest[..8])
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var).ok_or(ConfigError::MissingVar { var })
}

fn parse_timestamp(text: String, var: &'static str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| ConfigError::BadTimestamp {
            var,
            reason: err.to_string(),
        })
}

fn parse_i64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
) -> Result<i64, ConfigError> {
    match lookup(var) {
        Some(text) => text
            .trim()
            .parse()
            .map_err(|err: std::num::ParseIntError| ConfigError::BadNumber {
                var,
                reason: err.to_string(),
            }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_minimal_valid_config() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CONTEST_COMMIT_DEADLINE", "2025-10-21T21:59:59Z"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T22:00:00Z"),
        ]))
        .unwrap();

        assert_eq!(config.bounds.min(), 0);
        assert_eq!(config.bounds.max(), 100);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.ledger_timeout, DEFAULT_LEDGER_TIMEOUT);
    }

    #[test]
    fn test_all_variables_respected() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CONTEST_COMMIT_DEADLINE", "2025-10-21T21:59:59+00:00"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T22:00:00+00:00"),
            ("CONTEST_MIN_VALUE", "10"),
            ("CONTEST_MAX_VALUE", "90"),
            ("CONTEST_BIND_ADDR", "127.0.0.1:9001"),
            ("CONTEST_LEDGER_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();

        assert_eq!(config.bounds.min(), 10);
        assert_eq!(config.bounds.max(), 90);
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9001");
        assert_eq!(config.ledger_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_missing_deadline_is_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "CONTEST_REVEAL_OPEN",
            "2025-10-21T22:00:00Z",
        )]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingVar {
                var: "CONTEST_COMMIT_DEADLINE"
            }
        );
    }

    #[test]
    fn test_reveal_before_deadline_is_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("CONTEST_COMMIT_DEADLINE", "2025-10-21T22:00:00Z"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T21:00:00Z"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RevealBeforeCommitDeadline { .. }
        ));
    }

    #[test]
    fn test_inverted_bounds_are_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("CONTEST_COMMIT_DEADLINE", "2025-10-21T21:59:59Z"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T22:00:00Z"),
            ("CONTEST_MIN_VALUE", "50"),
            ("CONTEST_MAX_VALUE", "10"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidValueBounds { min: 50, max: 10 });
    }

    #[test]
    fn test_garbage_timestamp_is_fatal() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("CONTEST_COMMIT_DEADLINE", "next tuesday"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T22:00:00Z"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BadTimestamp {
                var: "CONTEST_COMMIT_DEADLINE",
                ..
            }
        ));
    }

    #[test]
    fn test_fingerprint_is_stable_and_parameter_sensitive() {
        let base = [
            ("CONTEST_COMMIT_DEADLINE", "2025-10-21T21:59:59Z"),
            ("CONTEST_REVEAL_OPEN", "2025-10-21T22:00:00Z"),
        ];
        let a = AppConfig::from_lookup(lookup_from(&base)).unwrap();
        let b = AppConfig::from_lookup(lookup_from(&base)).unwrap();
        assert_eq!(a.round_fingerprint(), b.round_fingerprint());

        let mut narrowed = base.to_vec();
        narrowed.push(("CONTEST_MAX_VALUE", "99"));
        let c = AppConfig::from_lookup(lookup_from(&narrowed)).unwrap();
        assert_ne!(a.round_fingerprint(), c.round_fingerprint());
    }
}
