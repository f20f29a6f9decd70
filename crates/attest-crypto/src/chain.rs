use crate::hasher::ContentHasher;

/// An entry that participates in a hash chain.
pub trait ChainLink {
    /// The entry's own hash.
    fn entry_hash(&self) -> [u8; 32];
    /// The previous entry's hash (`None` for genesis).
    fn prev_hash(&self) -> Option<[u8; 32]>;
    /// Canonical payload bytes the hash was computed over.
    fn payload_bytes(&self) -> Vec<u8>;
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of entries forms a valid chain: each entry's
/// `prev_hash` matches the previous entry's hash, and each entry's hash is
/// correctly computed from its payload.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of entries.
    pub fn verify_chain(entries: &[impl ChainLink]) -> Result<(), ChainError> {
        Self::verify_from(None, entries)
    }

    /// Verify entries that continue an existing chain whose last hash is
    /// `anchor` (`None` when `entries` starts at genesis).
    pub fn verify_from(
        anchor: Option<[u8; 32]>,
        entries: &[impl ChainLink],
    ) -> Result<(), ChainError> {
        let mut expected_prev = anchor;

        for (index, entry) in entries.iter().enumerate() {
            match (expected_prev, entry.prev_hash()) {
                (None, Some(_)) => return Err(ChainError::GenesisHasPrevHash),
                (Some(_), None) => return Err(ChainError::MissingPrevHash { index }),
                (Some(want), Some(got)) if want != got => {
                    return Err(ChainError::BrokenLink { index })
                }
                _ => {}
            }

            let computed = Self::compute_hash(&entry.payload_bytes(), entry.prev_hash());
            if computed != entry.entry_hash() {
                return Err(ChainError::HashMismatch { index });
            }

            expected_prev = Some(computed);
        }

        Ok(())
    }

    /// Compute the expected hash for a payload and optional previous hash.
    pub fn compute_hash(payload: &[u8], prev_hash: Option<[u8; 32]>) -> [u8; 32] {
        match prev_hash {
            Some(prev) => ContentHasher::LOG_ENTRY.hash_parts(&[&prev, payload]),
            None => ContentHasher::LOG_ENTRY.hash(payload),
        }
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis entry has a previous hash (should be None)")]
    GenesisHasPrevHash,

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: usize },

    #[error("missing prev_hash at index {index} (should reference previous entry)")]
    MissingPrevHash { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },
}
