use std::time::Duration;

/// Configuration for a [`LedgerStore`](crate::LedgerStore).
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Upper bound on ordering plus committing one mutation.
    pub commit_timeout: Duration,
    /// Capacity of the broadcast channel carrying ledger events.
    pub event_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            commit_timeout: Duration::from_secs(5),
            event_capacity: 1024,
        }
    }
}
