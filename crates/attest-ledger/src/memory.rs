use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::mutation::{LogEntry, Mutation};
use crate::traits::CommitLog;

/// In-memory commit log for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryCommitLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl InMemoryCommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log with entries committed elsewhere, e.g. a copy of
    /// another node's log. They are checked on replay, not here.
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl CommitLog for InMemoryCommitLog {
    async fn append(&self, mutation: Mutation, committed_at: u64) -> Result<LogEntry, LedgerError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| LedgerError::poisoned("commit log"))?;

        let index = entries.len() as u64 + 1;
        let prev_hash = entries.last().map(|e| e.hash);
        let entry = LogEntry::seal(index, prev_hash, committed_at, mutation)?;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn entries(&self) -> Result<Vec<LogEntry>, LedgerError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| LedgerError::poisoned("commit log"))?;
        Ok(entries.clone())
    }

    fn len(&self) -> u64 {
        self.entries.read().map(|e| e.len() as u64).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_crypto::HashChainVerifier;
    use attest_types::{Fingerprint, OwnerId};

    fn revoke(fp: &str) -> Mutation {
        Mutation::Revoke {
            fingerprint: Fingerprint::parse(fp).unwrap(),
            caller: OwnerId::from_bytes([3; 20]),
        }
    }

    #[tokio::test]
    async fn append_assigns_gap_free_indices() {
        let log = InMemoryCommitLog::new();
        assert!(log.is_empty());

        let a = log.append(revoke("aa"), 1).await.unwrap();
        let b = log.append(revoke("bb"), 2).await.unwrap();
        let c = log.append(revoke("cc"), 3).await.unwrap();

        assert_eq!((a.index, b.index, c.index), (1, 2, 3));
        assert_eq!(b.prev_hash, Some(a.hash));
        assert_eq!(c.prev_hash, Some(b.hash));
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn entries_form_a_valid_chain() {
        let log = InMemoryCommitLog::new();
        for i in 0..5 {
            log.append(revoke(&format!("{i:02x}")), i).await.unwrap();
        }
        HashChainVerifier::verify_chain(&log.entries().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn seeded_log_continues_the_chain() {
        let source = InMemoryCommitLog::new();
        source.append(revoke("aa"), 1).await.unwrap();

        let copy = InMemoryCommitLog::from_entries(source.entries().unwrap());
        let next = copy.append(revoke("bb"), 2).await.unwrap();
        assert_eq!(next.index, 2);
        HashChainVerifier::verify_chain(&copy.entries().unwrap()).unwrap();
    }
}
