//! Cryptographic primitives for attest.
//!
//! Provides the content fingerprint function (SHA-256) used by clients and
//! gateways, domain-separated BLAKE3 hashing for commit-log entries, and
//! hash chain verification.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod chain;
pub mod fingerprint;
pub mod hasher;

pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use fingerprint::{fingerprint, fingerprint_file, fingerprint_reader};
pub use hasher::ContentHasher;
