use serde::{Deserialize, Serialize};

use attest_crypto::{ChainLink, HashChainVerifier};
use attest_types::{CommitRef, Fingerprint, OwnerId};

use crate::error::LedgerError;

/// A state change submitted to the commit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Register {
        fingerprint: Fingerprint,
        name: String,
        external_pointer: Option<String>,
        owner: OwnerId,
    },
    Revoke {
        fingerprint: Fingerprint,
        caller: OwnerId,
    },
}

impl Mutation {
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Register { fingerprint, .. } | Self::Revoke { fingerprint, .. } => fingerprint,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Revoke { .. } => "revoke",
        }
    }
}

/// A mutation as committed: positioned in the log and hash-linked to its
/// predecessor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Committed index (1-based, gap-free).
    pub index: u64,
    pub prev_hash: Option<[u8; 32]>,
    /// Commit time in milliseconds since the Unix epoch.
    pub committed_at: u64,
    pub mutation: Mutation,
    pub hash: [u8; 32],
}

#[derive(Serialize)]
struct CanonicalPayload<'a> {
    index: u64,
    committed_at: u64,
    mutation: &'a Mutation,
}

impl LogEntry {
    /// Build an entry and compute its chain hash.
    pub fn seal(
        index: u64,
        prev_hash: Option<[u8; 32]>,
        committed_at: u64,
        mutation: Mutation,
    ) -> Result<Self, LedgerError> {
        let payload = canonical_payload(index, committed_at, &mutation)?;
        let hash = HashChainVerifier::compute_hash(&payload, prev_hash);
        Ok(Self {
            index,
            prev_hash,
            committed_at,
            mutation,
            hash,
        })
    }

    pub fn commit_ref(&self) -> CommitRef {
        CommitRef::new(self.index, self.hash)
    }
}

impl ChainLink for LogEntry {
    fn entry_hash(&self) -> [u8; 32] {
        self.hash
    }

    fn prev_hash(&self) -> Option<[u8; 32]> {
        self.prev_hash
    }

    fn payload_bytes(&self) -> Vec<u8> {
        // An unencodable payload hashes as empty and fails verification.
        canonical_payload(self.index, self.committed_at, &self.mutation).unwrap_or_default()
    }
}

fn canonical_payload(
    index: u64,
    committed_at: u64,
    mutation: &Mutation,
) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(&CanonicalPayload {
        index,
        committed_at,
        mutation,
    })
    .map_err(|e| LedgerError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(fp: &str) -> Mutation {
        Mutation::Register {
            fingerprint: Fingerprint::parse(fp).unwrap(),
            name: "doc.pdf".into(),
            external_pointer: None,
            owner: OwnerId::from_bytes([7; 20]),
        }
    }

    #[test]
    fn sealed_chain_verifies() {
        let first = LogEntry::seal(1, None, 10, register("aa")).unwrap();
        let second = LogEntry::seal(2, Some(first.hash), 11, register("bb")).unwrap();
        HashChainVerifier::verify_chain(&[first, second]).unwrap();
    }

    #[test]
    fn changing_any_field_changes_the_hash() {
        let base = LogEntry::seal(1, None, 10, register("aa")).unwrap();
        assert_ne!(base.hash, LogEntry::seal(2, None, 10, register("aa")).unwrap().hash);
        assert_ne!(base.hash, LogEntry::seal(1, None, 11, register("aa")).unwrap().hash);
        assert_ne!(base.hash, LogEntry::seal(1, None, 10, register("ab")).unwrap().hash);
    }

    #[test]
    fn tampered_entry_fails_verification() {
        let mut entry = LogEntry::seal(1, None, 10, register("aa")).unwrap();
        entry.committed_at = 99;
        assert!(HashChainVerifier::verify_chain(&[entry]).is_err());
    }

    #[test]
    fn bincode_roundtrip_keeps_hash_valid() {
        let entry = LogEntry::seal(1, None, 10, register("aa")).unwrap();
        let bytes = bincode::serialize(&entry).unwrap();
        let decoded: LogEntry = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, entry);
        HashChainVerifier::verify_chain(&[decoded]).unwrap();
    }

    #[test]
    fn mutation_accessors() {
        let m = register("aa");
        assert_eq!(m.kind(), "register");
        assert_eq!(m.fingerprint().as_str(), "aa");
    }
}
