use std::collections::HashMap;

use attest_types::{Fingerprint, OwnerId};

/// Owner → fingerprints, in registration order.
///
/// Only the store appends to it, in the same step that inserts the record,
/// so it always equals the set of records grouped by owner. There is no
/// removal: records are never deleted.
#[derive(Clone, Debug, Default)]
pub struct OwnershipIndex {
    by_owner: HashMap<OwnerId, Vec<Fingerprint>>,
    total: usize,
}

impl OwnershipIndex {
    pub(crate) fn append(&mut self, owner: OwnerId, fingerprint: Fingerprint) {
        self.by_owner.entry(owner).or_default().push(fingerprint);
        self.total += 1;
    }

    /// Fingerprints registered by `owner`, oldest first.
    pub fn fingerprints(&self, owner: &OwnerId) -> &[Fingerprint] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct owners.
    pub fn owner_count(&self) -> usize {
        self.by_owner.len()
    }

    /// Number of indexed fingerprints across all owners.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
