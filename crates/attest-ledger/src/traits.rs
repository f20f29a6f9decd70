use async_trait::async_trait;

use crate::error::LedgerError;
use crate::mutation::{LogEntry, Mutation};

/// Ordering boundary: gives every mutation a total, agreed-upon position.
///
/// The store serialises its own calls to `append`, so an implementation
/// only has to assign the next index, link the entry to its predecessor and
/// make it durable before returning. An implementation backed by an
/// external ordering service must be cancel-safe: if the returned future is
/// dropped the mutation either did not commit or shows up on the next
/// replay.
#[async_trait]
pub trait CommitLog: Send + Sync {
    /// Commit `mutation` at `committed_at` and return the sealed entry,
    /// whose `index` is the committed position.
    async fn append(&self, mutation: Mutation, committed_at: u64) -> Result<LogEntry, LedgerError>;

    /// Every committed entry in index order.
    fn entries(&self) -> Result<Vec<LogEntry>, LedgerError>;

    /// Number of committed entries.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
