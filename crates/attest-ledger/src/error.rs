use std::time::Duration;

use attest_types::{Fingerprint, OwnerId, TypeError};

/// Errors produced by ledger operations.
///
/// Only [`LedgerError::CommitTimeout`] is retryable; every other kind is
/// permanent for the same input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("fingerprint {0} is already registered")]
    DuplicateFingerprint(Fingerprint),

    #[error("no record for fingerprint {0}")]
    NotFound(Fingerprint),

    #[error("{caller} is not the owner of {fingerprint}")]
    Unauthorized {
        fingerprint: Fingerprint,
        caller: OwnerId,
    },

    #[error("record {0} is already revoked")]
    AlreadyRevoked(Fingerprint),

    #[error("commit could not be ordered within {0:?}")]
    CommitTimeout(Duration),

    #[error("integrity violation at log index {index}: {reason}")]
    IntegrityViolation { index: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Whether the same call may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CommitTimeout(_))
    }

    pub(crate) fn poisoned(what: &str) -> Self {
        Self::Storage(format!("{what} lock poisoned"))
    }
}

impl From<TypeError> for LedgerError {
    fn from(e: TypeError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_commit_timeout_is_retryable() {
        let fp = Fingerprint::parse("abc123").unwrap();
        assert!(LedgerError::CommitTimeout(Duration::from_secs(1)).is_retryable());
        assert!(!LedgerError::DuplicateFingerprint(fp.clone()).is_retryable());
        assert!(!LedgerError::AlreadyRevoked(fp.clone()).is_retryable());
        assert!(!LedgerError::NotFound(fp).is_retryable());
    }

    #[test]
    fn type_errors_become_invalid_input() {
        let err: LedgerError = OwnerId::parse("nope").unwrap_err().into();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
    }
}
