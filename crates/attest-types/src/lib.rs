//! Foundation types for attest, a tamper-evident document registry.
//!
//! Every other attest crate depends on `attest-types`.
//!
//! # Key Types
//!
//! - [`Fingerprint`]: Opaque content fingerprint used as the registry key
//! - [`OwnerId`]: Account address in canonical (lower-case) form
//! - [`CommitRef`]: Committed log index plus entry hash, returned in receipts

pub mod commit;
pub mod error;
pub mod fingerprint;
pub mod identity;

pub use commit::CommitRef;
pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use identity::OwnerId;
