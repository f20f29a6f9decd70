use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a committed commit-log entry.
///
/// Returned in every receipt so a caller can look the mutation up in the
/// log and detect tampering between the store and whoever relayed the
/// receipt.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRef {
    /// Committed index in the log (1-based, gap-free).
    pub index: u64,
    /// Hash of the committed log entry.
    pub hash: [u8; 32],
}

impl CommitRef {
    pub fn new(index: u64, hash: [u8; 32]) -> Self {
        Self { index, hash }
    }

    /// Transaction-hash style rendering: `0x` followed by the full entry hash.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }

    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..4])
    }
}

impl fmt::Debug for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitRef(#{} {})", self.index, self.short_hash())
    }
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c#{} [{}]", self.index, self.short_hash())
    }
}
