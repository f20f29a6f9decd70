use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use attest_crypto::HashChainVerifier;
use attest_types::{CommitRef, Fingerprint, OwnerId};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::event::LedgerEvent;
use crate::index::OwnershipIndex;
use crate::memory::InMemoryCommitLog;
use crate::mutation::{LogEntry, Mutation};
use crate::record::{
    AuditReport, DocumentRecord, RegistrationReceipt, RevocationReceipt, VerificationResult,
};
use crate::traits::CommitLog;

/// Longest accepted document name, in bytes.
pub const MAX_NAME_LEN: usize = 256;
/// Longest accepted external storage pointer, in bytes.
pub const MAX_POINTER_LEN: usize = 512;

/// Authoritative store of document records.
///
/// Every mutation is ordered through the [`CommitLog`] before it touches
/// the materialised state, and mutations are serialised by a FIFO lock so
/// validation always runs against the state the mutation is applied on.
/// Reads only take a short read lock on the materialised state and never
/// wait for the commit log.
pub struct LedgerStore {
    log: Arc<dyn CommitLog>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
    order: Arc<Mutex<()>>,
    state: Arc<RwLock<LedgerState>>,
    events: broadcast::Sender<LedgerEvent>,
}

#[derive(Default)]
struct LedgerState {
    records: HashMap<Fingerprint, DocumentRecord>,
    index: OwnershipIndex,
    head: Option<CommitRef>,
    last_committed_at: u64,
    revocations: u64,
}

impl LedgerStore {
    /// Open a store over `log`, replaying every committed entry.
    pub fn open(
        log: Arc<dyn CommitLog>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let entries = log.entries()?;
        let state = replay(&entries)?;
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        info!(
            entries = entries.len(),
            records = state.records.len(),
            owners = state.index.owner_count(),
            "ledger store opened"
        );

        Ok(Self {
            log,
            clock,
            config,
            order: Arc::new(Mutex::new(())),
            state: Arc::new(RwLock::new(state)),
            events,
        })
    }

    /// Empty store over an in-memory log and the system clock.
    pub fn in_memory() -> Self {
        Self {
            log: Arc::new(InMemoryCommitLog::new()),
            clock: Arc::new(SystemClock),
            config: LedgerConfig::default(),
            order: Arc::new(Mutex::new(())),
            state: Arc::new(RwLock::new(LedgerState::default())),
            events: broadcast::channel(LedgerConfig::default().event_capacity).0,
        }
    }

    /// Register `fingerprint` as owned by `caller`.
    ///
    /// Fails with [`LedgerError::DuplicateFingerprint`] if the fingerprint
    /// was ever registered before, revoked or not.
    pub async fn register(
        &self,
        fingerprint: &Fingerprint,
        name: &str,
        external_pointer: Option<&str>,
        caller: &OwnerId,
    ) -> Result<RegistrationReceipt, LedgerError> {
        let mutation = Mutation::Register {
            fingerprint: fingerprint.clone(),
            name: normalize_name(name)?,
            external_pointer: normalize_pointer(external_pointer)?,
            owner: *caller,
        };

        let (entry, record) = self.commit(mutation).await?;

        Ok(RegistrationReceipt {
            commit: entry.commit_ref(),
            fingerprint: record.fingerprint,
            owner: record.owner,
            name: record.name,
            external_pointer: record.external_pointer,
            registered_at: record.registered_at,
        })
    }

    /// Revoke `fingerprint`. Only the record owner may do this, once.
    pub async fn revoke(
        &self,
        fingerprint: &Fingerprint,
        caller: &OwnerId,
    ) -> Result<RevocationReceipt, LedgerError> {
        let mutation = Mutation::Revoke {
            fingerprint: fingerprint.clone(),
            caller: *caller,
        };

        let (entry, _) = self.commit(mutation).await?;

        Ok(RevocationReceipt {
            commit: entry.commit_ref(),
            fingerprint: fingerprint.clone(),
            revoked_at: entry.committed_at,
        })
    }

    /// Public lookup. Never fails for an unknown fingerprint.
    pub fn verify(&self, fingerprint: &Fingerprint) -> Result<VerificationResult, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .records
            .get(fingerprint)
            .map(VerificationResult::from)
            .unwrap_or_else(VerificationResult::not_found))
    }

    /// All records registered by `owner`, in registration order.
    pub fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<DocumentRecord>, LedgerError> {
        let state = self.read_state()?;
        state
            .index
            .fingerprints(owner)
            .iter()
            .map(|fp| {
                state
                    .records
                    .get(fp)
                    .cloned()
                    .ok_or_else(|| LedgerError::IntegrityViolation {
                        index: state.head.map(|h| h.index).unwrap_or(0),
                        reason: format!("ownership index references missing record {fp}"),
                    })
            })
            .collect()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<DocumentRecord>, LedgerError> {
        Ok(self.read_state()?.records.get(fingerprint).cloned())
    }

    /// Number of registered records, revoked ones included.
    pub fn len(&self) -> usize {
        self.read_state().map(|s| s.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Latest committed entry.
    pub fn head(&self) -> Result<Option<CommitRef>, LedgerError> {
        Ok(self.read_state()?.head)
    }

    /// Registered/Revoked events for one fingerprint, oldest first, rebuilt
    /// from the commit log.
    pub fn history(&self, fingerprint: &Fingerprint) -> Result<Vec<LedgerEvent>, LedgerError> {
        Ok(self
            .log
            .entries()?
            .iter()
            .filter(|entry| entry.mutation.fingerprint() == fingerprint)
            .map(LedgerEvent::from_entry)
            .collect())
    }

    /// Re-verify the whole commit log and compare it with the live state.
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        // Live state first: a commit landing between the two reads can then
        // only put the log ahead of it.
        let live_head = self.read_state()?.head;
        let entries = self.log.entries()?;
        let replayed = replay(&entries)?;

        let live_index = live_head.map(|h| h.index).unwrap_or(0);
        let replayed_index = replayed.head.map(|h| h.index).unwrap_or(0);
        if replayed_index < live_index {
            return Err(LedgerError::IntegrityViolation {
                index: replayed_index,
                reason: format!("commit log ends before live head {live_index}"),
            });
        }
        if replayed_index == live_index && replayed.head != live_head {
            return Err(LedgerError::IntegrityViolation {
                index: live_index,
                reason: "commit log head differs from live head".into(),
            });
        }

        Ok(AuditReport {
            entries: entries.len() as u64,
            registrations: replayed.records.len() as u64,
            revocations: replayed.revocations,
            owners: replayed.index.owner_count(),
            head: replayed.head,
        })
    }

    /// Receive every Registered/Revoked event committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Order, validate, commit and apply one mutation.
    ///
    /// The append and apply run on their own task holding the order slot.
    /// If the caller times out, a late append is still applied before the
    /// next mutation is validated.
    async fn commit(&self, mutation: Mutation) -> Result<(LogEntry, DocumentRecord), LedgerError> {
        let timeout = self.config.commit_timeout;
        let kind = mutation.kind();
        let fingerprint = mutation.fingerprint().clone();

        let ordered = async {
            let slot = Arc::clone(&self.order).lock_owned().await;

            let committed_at = {
                let state = self.read_state()?;
                check(&state, &mutation)?;
                self.clock.now_ms().max(state.last_committed_at)
            };

            let task = tokio::spawn(append_and_apply(
                slot,
                Arc::clone(&self.log),
                Arc::clone(&self.state),
                self.events.clone(),
                mutation,
                committed_at,
            ));
            task.await
                .map_err(|e| LedgerError::Storage(format!("commit task failed: {e}")))?
        };

        match tokio::time::timeout(timeout, ordered).await {
            Ok(Ok(committed)) => Ok(committed),
            Ok(Err(e)) => {
                debug!(kind, fingerprint = %fingerprint, error = %e, "mutation rejected");
                Err(e)
            }
            Err(_) => {
                warn!(kind, fingerprint = %fingerprint, ?timeout, "commit timed out");
                Err(LedgerError::CommitTimeout(timeout))
            }
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.state
            .read()
            .map_err(|_| LedgerError::poisoned("ledger state"))
    }
}

/// Append one validated mutation and apply the committed entry. Holds the
/// order slot until both are done.
async fn append_and_apply(
    _slot: OwnedMutexGuard<()>,
    log: Arc<dyn CommitLog>,
    state: Arc<RwLock<LedgerState>>,
    events: broadcast::Sender<LedgerEvent>,
    mutation: Mutation,
    committed_at: u64,
) -> Result<(LogEntry, DocumentRecord), LedgerError> {
    let entry = log.append(mutation, committed_at).await?;

    let record = {
        let mut state = write_state(&state)?;
        apply(&mut state, &entry)?
    };

    let event = LedgerEvent::from_entry(&entry);
    info!(
        kind = %event.kind,
        fingerprint = %event.fingerprint,
        owner = %event.owner,
        index = entry.index,
        timestamp = event.timestamp,
        "ledger commit"
    );
    // No subscribers is fine.
    let _ = events.send(event);

    Ok((entry, record))
}

fn write_state(
    state: &RwLock<LedgerState>,
) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
    state
        .write()
        .map_err(|_| LedgerError::poisoned("ledger state"))
}

/// Capability and uniqueness checks, against the state a mutation would be
/// applied on. Never mutates.
fn check(state: &LedgerState, mutation: &Mutation) -> Result<(), LedgerError> {
    match mutation {
        Mutation::Register { fingerprint, .. } => {
            if state.records.contains_key(fingerprint) {
                return Err(LedgerError::DuplicateFingerprint(fingerprint.clone()));
            }
        }
        Mutation::Revoke {
            fingerprint,
            caller,
        } => {
            let record = state
                .records
                .get(fingerprint)
                .ok_or_else(|| LedgerError::NotFound(fingerprint.clone()))?;
            if record.owner != *caller {
                return Err(LedgerError::Unauthorized {
                    fingerprint: fingerprint.clone(),
                    caller: *caller,
                });
            }
            if record.revoked {
                return Err(LedgerError::AlreadyRevoked(fingerprint.clone()));
            }
        }
    }
    Ok(())
}

/// Apply a committed entry. Record and index change in the same step.
fn apply(state: &mut LedgerState, entry: &LogEntry) -> Result<DocumentRecord, LedgerError> {
    check(state, &entry.mutation).map_err(|e| LedgerError::IntegrityViolation {
        index: entry.index,
        reason: format!("committed mutation no longer valid: {e}"),
    })?;

    let record = match &entry.mutation {
        Mutation::Register {
            fingerprint,
            name,
            external_pointer,
            owner,
        } => {
            let record = DocumentRecord {
                fingerprint: fingerprint.clone(),
                owner: *owner,
                name: name.clone(),
                external_pointer: external_pointer.clone(),
                registered_at: entry.committed_at,
                revoked: false,
            };
            state.records.insert(fingerprint.clone(), record.clone());
            state.index.append(*owner, fingerprint.clone());
            record
        }
        Mutation::Revoke { fingerprint, .. } => {
            let record = state
                .records
                .get_mut(fingerprint)
                .ok_or_else(|| LedgerError::NotFound(fingerprint.clone()))?;
            record.revoked = true;
            state.revocations += 1;
            record.clone()
        }
    };

    state.head = Some(entry.commit_ref());
    state.last_committed_at = state.last_committed_at.max(entry.committed_at);
    Ok(record)
}

/// Rebuild state from committed entries, checking the hash chain, index
/// continuity and timestamp monotonicity along the way.
fn replay(entries: &[LogEntry]) -> Result<LedgerState, LedgerError> {
    HashChainVerifier::verify_chain(entries).map_err(|e| LedgerError::IntegrityViolation {
        index: 0,
        reason: e.to_string(),
    })?;

    let mut state = LedgerState::default();
    for (position, entry) in entries.iter().enumerate() {
        let expected = position as u64 + 1;
        if entry.index != expected {
            return Err(LedgerError::IntegrityViolation {
                index: entry.index,
                reason: format!("expected index {expected}"),
            });
        }
        if entry.committed_at < state.last_committed_at {
            return Err(LedgerError::IntegrityViolation {
                index: entry.index,
                reason: "commit time went backwards".into(),
            });
        }
        apply(&mut state, entry)?;
    }
    Ok(state)
}

fn normalize_name(name: &str) -> Result<String, LedgerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidInput("name is required".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(LedgerError::InvalidInput(format!(
            "name is {} bytes, limit is {MAX_NAME_LEN}",
            name.len()
        )));
    }
    Ok(name.to_string())
}

fn normalize_pointer(pointer: Option<&str>) -> Result<Option<String>, LedgerError> {
    let Some(pointer) = pointer.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if pointer.len() > MAX_POINTER_LEN {
        return Err(LedgerError::InvalidInput(format!(
            "external pointer is {} bytes, limit is {MAX_POINTER_LEN}",
            pointer.len()
        )));
    }
    Ok(Some(pointer.to_string()))
}
