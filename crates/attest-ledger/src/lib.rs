//! Document ledger for attest.
//!
//! This crate is the heart of attest. It provides:
//! - `DocumentRecord` storage keyed by fingerprint, with owner-only,
//!   one-way revocation
//! - An ownership index kept in lockstep with the records
//! - The `CommitLog` boundary that totally orders every mutation, with an
//!   in-memory fake and a durable file-backed log
//! - Replay of the commit log into a fresh store, with hash chain checks
//! - Registered/Revoked events for auditors and subscribers

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod index;
pub mod memory;
pub mod mutation;
pub mod record;
pub mod store;
pub mod traits;
pub mod wal;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use event::{LedgerEvent, LedgerEventKind};
pub use index::OwnershipIndex;
pub use memory::InMemoryCommitLog;
pub use mutation::{LogEntry, Mutation};
pub use record::{
    AuditReport, DocumentRecord, RecordState, RegistrationReceipt, RevocationReceipt,
    VerificationResult,
};
pub use store::LedgerStore;
pub use traits::CommitLog;
pub use wal::{FileCommitLog, SyncMode, WalConfig};
