//! Timeout Decorator for Ledger Clients
//!
//! Bounds every backend call with a caller-supplied timeout so no
//! operation blocks indefinitely. Expiry maps to
//! [`LedgerError::Transient`]; the caller decides whether to retry,
//! nothing is retried automatically here.

use std::future::Future;
use std::time::Duration;

use crate::core::hash::Commitment;
use crate::ledger::{CommitRecord, LedgerClient, RevealRecord};
use crate::protocol::error::LedgerError;
use crate::protocol::validate::ParticipantId;

/// Wraps any [`LedgerClient`] and applies a timeout to each call.
#[derive(Clone, Debug)]
pub struct TimedLedger<L> {
    inner: L,
    timeout: Duration,
}

impl<L: LedgerClient> TimedLedger<L> {
    /// Wrap `inner`, bounding every call by `timeout`.
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bound<T>(
        &self,
        call: impl Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Transient(format!(
                "ledger call exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

impl<L: LedgerClient> LedgerClient for TimedLedger<L> {
    async fn put_commit(&self, record: CommitRecord) -> Result<(), LedgerError> {
        self.bound(self.inner.put_commit(record)).await
    }

    async fn put_reveal(&self, record: RevealRecord) -> Result<(), LedgerError> {
        self.bound(self.inner.put_reveal(record)).await
    }

    async fn get_commit(&self, id: &ParticipantId) -> Result<Option<Commitment>, LedgerError> {
        self.bound(self.inner.get_commit(id)).await
    }

    async fn list_commits(&self) -> Result<Vec<CommitRecord>, LedgerError> {
        self.bound(self.inner.list_commits()).await
    }

    async fn list_reveals(&self) -> Result<Vec<RevealRecord>, LedgerError> {
        self.bound(self.inner.list_reveals()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;

    /// Backend that never answers, for exercising the timeout path.
    #[derive(Clone, Default)]
    struct StalledLedger;

    impl LedgerClient for StalledLedger {
        async fn put_commit(&self, _record: CommitRecord) -> Result<(), LedgerError> {
            std::future::pending().await
        }

        async fn put_reveal(&self, _record: RevealRecord) -> Result<(), LedgerError> {
            std::future::pending().await
        }

        async fn get_commit(
            &self,
            _id: &ParticipantId,
        ) -> Result<Option<Commitment>, LedgerError> {
            std::future::pending().await
        }

        async fn list_commits(&self) -> Result<Vec<CommitRecord>, LedgerError> {
            std::future::pending().await
        }

        async fn list_reveals(&self) -> Result<Vec<RevealRecord>, LedgerError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_backend_reports_transient() {
        let ledger = TimedLedger::new(StalledLedger, Duration::from_millis(100));
        let result = ledger.list_commits().await;
        assert!(matches!(result, Err(LedgerError::Transient(_))));
    }

    #[tokio::test]
    async fn test_fast_backend_passes_through() {
        let ledger = TimedLedger::new(InMemoryLedger::new(), Duration::from_secs(5));
        assert_eq!(ledger.list_commits().await.unwrap().len(), 0);

        let id = ParticipantId::new("u1").unwrap();
        assert_eq!(ledger.get_commit(&id).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_error_survives_the_wrapper() {
        use crate::core::hash::hash_bytes;
        use chrono::{TimeZone, Utc};

        let ledger = TimedLedger::new(InMemoryLedger::new(), Duration::from_secs(5));
        let record = CommitRecord {
            participant_id: ParticipantId::new("u1").unwrap(),
            commitment: Commitment::from_bytes(hash_bytes(b"x")),
            submitted_at: Utc.with_ymd_and_hms(2025, 10, 21, 20, 0, 0).unwrap(),
        };
        ledger.put_commit(record.clone()).await.unwrap();
        assert_eq!(
            ledger.put_commit(record).await,
            Err(LedgerError::DuplicateCommit)
        );
    }
}
