use std::fmt;

use serde::{Deserialize, Serialize};

use attest_types::{CommitRef, Fingerprint, OwnerId};

/// Lifecycle state of a record. `Revoked` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    Active,
    Revoked,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Stored metadata for one registered fingerprint.
///
/// Every field is fixed at registration except `revoked`, which moves from
/// `false` to `true` at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub fingerprint: Fingerprint,
    pub owner: OwnerId,
    pub name: String,
    pub external_pointer: Option<String>,
    /// Milliseconds since the Unix epoch, assigned at commit time.
    pub registered_at: u64,
    pub revoked: bool,
}

impl DocumentRecord {
    pub fn state(&self) -> RecordState {
        if self.revoked {
            RecordState::Revoked
        } else {
            RecordState::Active
        }
    }
}

/// Public answer to "was this fingerprint registered?".
///
/// When `exists` is false every other field is `None`/`false`; callers
/// must check `exists` before trusting the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub exists: bool,
    pub owner: Option<OwnerId>,
    pub registered_at: Option<u64>,
    pub name: Option<String>,
    pub external_pointer: Option<String>,
    pub revoked: bool,
}

impl VerificationResult {
    pub fn not_found() -> Self {
        Self::default()
    }
}

impl From<&DocumentRecord> for VerificationResult {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            exists: true,
            owner: Some(record.owner),
            registered_at: Some(record.registered_at),
            name: Some(record.name.clone()),
            external_pointer: record.external_pointer.clone(),
            revoked: record.revoked,
        }
    }
}

/// Returned by a successful registration, after the commit is durable.
///
/// Carries the stored values so the caller can compare them with what it
/// submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub commit: CommitRef,
    pub fingerprint: Fingerprint,
    pub owner: OwnerId,
    pub name: String,
    pub external_pointer: Option<String>,
    pub registered_at: u64,
}

/// Returned by a successful revocation, after the commit is durable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationReceipt {
    pub commit: CommitRef,
    pub fingerprint: Fingerprint,
    pub revoked_at: u64,
}

/// Summary of a full commit-log audit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub entries: u64,
    pub registrations: u64,
    pub revocations: u64,
    pub owners: usize,
    pub head: Option<CommitRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(revoked: bool) -> DocumentRecord {
        DocumentRecord {
            fingerprint: Fingerprint::parse("abc123").unwrap(),
            owner: OwnerId::from_bytes([1; 20]),
            name: "doc.pdf".into(),
            external_pointer: Some("ipfs://cid".into()),
            registered_at: 1_000,
            revoked,
        }
    }

    #[test]
    fn state_follows_revoked_flag() {
        assert_eq!(record(false).state(), RecordState::Active);
        assert_eq!(record(true).state(), RecordState::Revoked);
    }

    #[test]
    fn not_found_leaks_nothing() {
        let result = VerificationResult::not_found();
        assert!(!result.exists);
        assert!(result.owner.is_none());
        assert!(result.name.is_none());
        assert!(result.registered_at.is_none());
        assert!(result.external_pointer.is_none());
        assert!(!result.revoked);
    }

    #[test]
    fn verification_copies_record_fields() {
        let rec = record(true);
        let result = VerificationResult::from(&rec);
        assert!(result.exists);
        assert_eq!(result.owner, Some(rec.owner));
        assert_eq!(result.name.as_deref(), Some("doc.pdf"));
        assert_eq!(result.external_pointer.as_deref(), Some("ipfs://cid"));
        assert!(result.revoked);
    }
}
