use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::mutation::{LogEntry, Mutation};
use crate::traits::CommitLog;

/// Flush/sync strategy for the file-backed log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` before every append returns. Receipts are only handed out
    /// for entries that survive a crash.
    #[default]
    EveryWrite,
    /// Rely on OS page-cache buffering (fastest, least durable).
    OsDefault,
}

/// Configuration for [`FileCommitLog`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WalConfig {
    #[serde(default)]
    pub sync_mode: SyncMode,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct WalWriter {
    file: File,
    /// Current write offset in the segment file.
    offset: u64,
    next_index: u64,
    last_hash: Option<[u8; 32]>,
}

/// Durable commit log stored in a single segment file.
///
/// On-disk format, one frame per entry:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized LogEntry)]
/// ```
///
/// A frame cut short at the end of the file is a torn write from a crash:
/// it is dropped and the file truncated on open. A damaged frame anywhere
/// else is reported as an integrity violation instead of being skipped,
/// because skipping it would silently drop a committed mutation.
pub struct FileCommitLog {
    path: PathBuf,
    writer: Arc<Mutex<WalWriter>>,
    config: WalConfig,
}

impl FileCommitLog {
    /// Open (or create) the log at `path`, recovering existing entries.
    pub fn open(path: &Path, config: WalConfig) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let file_len = file.metadata()?.len();

        let scan = scan(path)?;
        if scan.valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len = scan.valid_len,
                file_len,
                "dropping torn tail of commit log"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }

        let last = scan.entries.last();
        let writer = WalWriter {
            file,
            offset: scan.valid_len,
            next_index: last.map(|e| e.index + 1).unwrap_or(1),
            last_hash: last.map(|e| e.hash),
        };

        debug!(path = %path.display(), entries = scan.entries.len(), "commit log opened");

        Ok(Self {
            path: path.to_path_buf(),
            writer: Arc::new(Mutex::new(writer)),
            config,
        })
    }

    /// Path to the segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current write offset.
    pub fn offset(&self) -> u64 {
        self.writer.lock().map(|w| w.offset).unwrap_or(0)
    }
}

#[async_trait]
impl CommitLog for FileCommitLog {
    /// The frame is written and synced on the blocking pool. If the caller
    /// stops waiting, the write still finishes and the writer stays
    /// consistent with the file.
    async fn append(&self, mutation: Mutation, committed_at: u64) -> Result<LogEntry, LedgerError> {
        let writer = Arc::clone(&self.writer);
        let sync_mode = self.config.sync_mode;
        tokio::task::spawn_blocking(move || append_frame(&writer, mutation, committed_at, sync_mode))
            .await
            .map_err(|e| LedgerError::Storage(format!("commit log writer task failed: {e}")))?
    }

    fn entries(&self) -> Result<Vec<LogEntry>, LedgerError> {
        // Hold the writer so a concurrent append is never read half-written.
        let _w = self
            .writer
            .lock()
            .map_err(|_| LedgerError::poisoned("commit log writer"))?;
        Ok(scan(&self.path)?.entries)
    }

    fn len(&self) -> u64 {
        self.writer.lock().map(|w| w.next_index - 1).unwrap_or(0)
    }
}

fn append_frame(
    writer: &Mutex<WalWriter>,
    mutation: Mutation,
    committed_at: u64,
    sync_mode: SyncMode,
) -> Result<LogEntry, LedgerError> {
    let mut w = writer
        .lock()
        .map_err(|_| LedgerError::poisoned("commit log writer"))?;

    let entry = LogEntry::seal(w.next_index, w.last_hash, committed_at, mutation)?;
    let payload =
        bincode::serialize(&entry).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);

    if let Err(e) = write_frame(&mut w.file, &frame, sync_mode) {
        // Leave no partial frame behind for the next append to follow.
        let offset = w.offset;
        if let Err(rollback) = w.file.set_len(offset) {
            warn!(offset, error = %rollback, "failed to roll back partial commit log frame");
        }
        return Err(e.into());
    }

    let entry_offset = w.offset;
    w.offset += frame.len() as u64;
    w.next_index += 1;
    w.last_hash = Some(entry.hash);

    debug!(index = entry.index, offset = entry_offset, len = payload.len(), "commit log append");
    Ok(entry)
}

fn write_frame(file: &mut File, frame: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    file.write_all(frame)?;
    file.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        file.sync_data()?;
    }
    Ok(())
}

struct Scan {
    entries: Vec<LogEntry>,
    /// Length of the prefix made of complete, valid frames.
    valid_len: u64,
}

/// Read the segment front to back.
fn scan(path: &Path) -> Result<Scan, LedgerError> {
    let mut data = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut data)?;
    let file_len = data.len() as u64;

    let mut entries: Vec<LogEntry> = Vec::new();
    let mut offset: usize = 0;

    while offset + HEADER_SIZE <= data.len() {
        let header = &data[offset..offset + HEADER_SIZE];
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let end = offset + HEADER_SIZE + length;
        let next_index = entries.last().map(|e| e.index + 1).unwrap_or(1);

        if length == 0 {
            return Err(LedgerError::IntegrityViolation {
                index: next_index,
                reason: format!("zero-length frame at offset {offset}"),
            });
        }
        if end > data.len() {
            warn!(offset, length, file_len, "truncated commit log frame");
            break;
        }

        let payload = &data[offset + HEADER_SIZE..end];
        let is_last_frame = end == data.len();

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            if is_last_frame {
                warn!(offset, expected = expected_crc, actual = actual_crc, "CRC mismatch on final frame; treating as torn write");
                break;
            }
            return Err(LedgerError::IntegrityViolation {
                index: next_index,
                reason: format!(
                    "CRC mismatch at offset {offset}: expected {expected_crc:#010x}, got {actual_crc:#010x}"
                ),
            });
        }

        let entry: LogEntry = bincode::deserialize(payload).map_err(|e| {
            LedgerError::IntegrityViolation {
                index: next_index,
                reason: format!("undecodable frame at offset {offset}: {e}"),
            }
        })?;
        entries.push(entry);
        offset = end;
    }

    Ok(Scan {
        entries,
        valid_len: offset as u64,
    })
}
