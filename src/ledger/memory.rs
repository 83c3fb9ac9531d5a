//! In-Memory Reference Ledger
//!
//! Backs tests, the demo round, and single-round classroom deployments.
//! Both tables live behind one `tokio::sync::RwLock`; the duplicate
//! check and the insert for a commit run under a single write guard, so
//! concurrent first commits for the same id cannot both succeed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::hash::Commitment;
use crate::ledger::{CommitRecord, LedgerClient, RevealRecord};
use crate::protocol::error::LedgerError;
use crate::protocol::validate::ParticipantId;

#[derive(Debug, Default)]
struct Tables {
    commits: Vec<CommitRecord>,
    // Index into `commits` keyed by participant; enforces one commit
    // per id and keeps lookups off the linear scan.
    commit_index: BTreeMap<ParticipantId, usize>,
    reveals: Vec<RevealRecord>,
}

/// Reference [`LedgerClient`] keeping both tables in memory.
///
/// Clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    inner: Arc<RwLock<Tables>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat copy of both tables, for archival or inspection.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let tables = self.inner.read().await;
        LedgerSnapshot {
            commits: tables.commits.clone(),
            reveals: tables.reveals.clone(),
        }
    }
}

impl LedgerClient for InMemoryLedger {
    async fn put_commit(&self, record: CommitRecord) -> Result<(), LedgerError> {
        let mut tables = self.inner.write().await;
        if tables.commit_index.contains_key(&record.participant_id) {
            return Err(LedgerError::DuplicateCommit);
        }
        let slot = tables.commits.len();
        tables.commit_index.insert(record.participant_id.clone(), slot);
        tables.commits.push(record);
        Ok(())
    }

    async fn put_reveal(&self, record: RevealRecord) -> Result<(), LedgerError> {
        self.inner.write().await.reveals.push(record);
        Ok(())
    }

    async fn get_commit(&self, id: &ParticipantId) -> Result<Option<Commitment>, LedgerError> {
        let tables = self.inner.read().await;
        Ok(tables
            .commit_index
            .get(id)
            .map(|&slot| tables.commits[slot].commitment))
    }

    async fn list_commits(&self) -> Result<Vec<CommitRecord>, LedgerError> {
        Ok(self.inner.read().await.commits.clone())
    }

    async fn list_reveals(&self) -> Result<Vec<RevealRecord>, LedgerError> {
        Ok(self.inner.read().await.reveals.clone())
    }
}

/// Flat export of both tables.
///
/// Serializable with `serde_json` for human inspection or `bincode`
/// for compact archival of a finished round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Commit table, insertion order.
    pub commits: Vec<CommitRecord>,
    /// Reveal table, insertion order.
    pub reveals: Vec<RevealRecord>,
}

impl LedgerSnapshot {
    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::hash_bytes;
    use crate::protocol::verify::RevealOutcome;
    use chrono::{TimeZone, Utc};

    fn commit(id: &str, payload: &[u8]) -> CommitRecord {
        CommitRecord {
            participant_id: ParticipantId::new(id).unwrap(),
            commitment: Commitment::from_bytes(hash_bytes(payload)),
            submitted_at: Utc.with_ymd_and_hms(2025, 10, 21, 20, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_first_commit_wins() {
        let ledger = InMemoryLedger::new();
        let first = commit("u1", b"first");
        let second = commit("u1", b"second");

        ledger.put_commit(first.clone()).await.unwrap();
        assert_eq!(
            ledger.put_commit(second).await,
            Err(LedgerError::DuplicateCommit)
        );

        // The stored commitment is unchanged.
        let id = ParticipantId::new("u1").unwrap();
        assert_eq!(
            ledger.get_commit(&id).await.unwrap(),
            Some(first.commitment)
        );
        assert_eq!(ledger.list_commits().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_commits_single_winner() {
        let ledger = InMemoryLedger::new();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .put_commit(commit("u1", format!("try-{i}").as_bytes()))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(ledger.list_commits().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lists_preserve_insertion_order() {
        let ledger = InMemoryLedger::new();
        // Insert ids out of lexicographic order on purpose.
        for id in ["zeta", "alpha", "mid"] {
            ledger.put_commit(commit(id, id.as_bytes())).await.unwrap();
        }
        let listed: Vec<String> = ledger
            .list_commits()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.participant_id.as_str().to_owned())
            .collect();
        assert_eq!(listed, ["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn test_reveals_are_never_deduplicated() {
        let ledger = InMemoryLedger::new();
        let record = RevealRecord {
            participant_id: ParticipantId::new("u1").unwrap(),
            value: 42,
            nonce: "abc123".into(),
            outcome: RevealOutcome::Match,
            submitted_at: Utc.with_ymd_and_hms(2025, 10, 21, 22, 5, 0).unwrap(),
        };
        ledger.put_reveal(record.clone()).await.unwrap();
        ledger.put_reveal(record).await.unwrap();
        assert_eq!(ledger.list_reveals().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrips_through_bincode() {
        let ledger = InMemoryLedger::new();
        ledger.put_commit(commit("u1", b"payload")).await.unwrap();
        ledger
            .put_reveal(RevealRecord {
                participant_id: ParticipantId::new("u2").unwrap(),
                value: 7,
                nonce: "n".into(),
                outcome: RevealOutcome::NoPriorCommit,
                submitted_at: Utc.with_ymd_and_hms(2025, 10, 21, 22, 5, 0).unwrap(),
            })
            .await
            .unwrap();

        let snapshot = ledger.snapshot().await;
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(LedgerSnapshot::from_bytes(&bytes).unwrap(), snapshot);
    }
}
