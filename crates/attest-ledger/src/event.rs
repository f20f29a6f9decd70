use std::fmt;

use serde::{Deserialize, Serialize};

use attest_types::{CommitRef, Fingerprint, OwnerId};

use crate::mutation::LogEntry;

/// Classification of auditable ledger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerEventKind {
    Registered,
    Revoked,
}

impl fmt::Display for LedgerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "Registered"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Emitted once per committed mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub kind: LedgerEventKind,
    pub fingerprint: Fingerprint,
    pub owner: OwnerId,
    pub timestamp: u64,
    pub commit: CommitRef,
}

impl LedgerEvent {
    /// Build the event a committed entry produces.
    ///
    /// A revocation can only be committed by the record owner, so the
    /// caller recorded in the entry is the owner.
    pub fn from_entry(entry: &LogEntry) -> Self {
        use crate::mutation::Mutation;

        let (kind, fingerprint, owner) = match &entry.mutation {
            Mutation::Register {
                fingerprint, owner, ..
            } => (LedgerEventKind::Registered, fingerprint.clone(), *owner),
            Mutation::Revoke {
                fingerprint,
                caller,
            } => (LedgerEventKind::Revoked, fingerprint.clone(), *caller),
        };

        Self {
            kind,
            fingerprint,
            owner,
            timestamp: entry.committed_at,
            commit: entry.commit_ref(),
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} by {} at {} ({})",
            self.kind,
            self.fingerprint.short(),
            self.owner.short_id(),
            self.timestamp,
            self.commit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::Mutation;

    #[test]
    fn revoke_entry_becomes_revoked_event() {
        let caller = OwnerId::from_bytes([9; 20]);
        let entry = LogEntry::seal(
            4,
            Some([1; 32]),
            77,
            Mutation::Revoke {
                fingerprint: Fingerprint::parse("abc123").unwrap(),
                caller,
            },
        )
        .unwrap();

        let event = LedgerEvent::from_entry(&entry);
        assert_eq!(event.kind, LedgerEventKind::Revoked);
        assert_eq!(event.owner, caller);
        assert_eq!(event.timestamp, 77);
        assert_eq!(event.commit.index, 4);
    }

    #[test]
    fn kind_display() {
        assert_eq!(LedgerEventKind::Registered.to_string(), "Registered");
        assert_eq!(LedgerEventKind::Revoked.to_string(), "Revoked");
    }
}
