//! Durable record store backed by an append-only commit log
//!
//! - One checksummed record per commit, so a commit is all-or-nothing on disk
//! - fsync after every append; a commit is acknowledged only after sync
//! - The latest entry for a key wins
//! - In-memory state is rebuilt by replaying the log on open

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::backend::{decode_json, QueryHit, ReadVersion, RecordStore, VersionedRecord, WriteOp};
use super::errors::{StorageError, StorageResult};
use super::reader::LogReader;
use super::record::{CommitEntry, CommitRecord};
use super::selector::Selector;
use crate::observability::{log_event_with_fields, Event};

/// File name of the commit log inside the data directory.
pub const LOG_FILE_NAME: &str = "ledger.dat";

struct LogState {
    file: File,
    current_offset: u64,
    records: BTreeMap<String, VersionedRecord>,
}

impl LogState {
    /// Appends one serialized commit and syncs it. A failed write or sync
    /// leaves the log cut back to `current_offset`.
    fn append(&mut self, bytes: &[u8]) -> StorageResult<()> {
        let written = self
            .file
            .write_all(bytes)
            .map_err(|e| StorageError::write_failed("Failed to append commit record", e))
            .and_then(|()| {
                self.file
                    .sync_all()
                    .map_err(|e| StorageError::write_failed("Failed to fsync commit log", e))
            });

        if let Err(err) = written {
            if let Err(rollback) = self.truncate_tail() {
                let reason = rollback.to_string();
                log_event_with_fields(Event::StoreCorrupted, &[("reason", reason.as_str())]);
            }
            return Err(err);
        }

        self.current_offset += bytes.len() as u64;
        Ok(())
    }

    /// Drops any bytes past the last acknowledged commit.
    fn truncate_tail(&mut self) -> StorageResult<()> {
        let offset = self.current_offset.to_string();
        self.file
            .set_len(self.current_offset)
            .and_then(|()| self.file.sync_all())
            .map_err(|e| StorageError::write_failed("Failed to truncate torn commit", e))?;
        log_event_with_fields(Event::CommitRolledBack, &[("offset", offset.as_str())]);
        Ok(())
    }
}

pub struct FileStore {
    log_path: PathBuf,
    state: Mutex<LogState>,
}

impl FileStore {
    /// Opens or creates `<data_dir>/ledger.dat` and replays it.
    ///
    /// # Errors
    ///
    /// Returns `ASSET_STORAGE_WRITE_FAILED` if the log cannot be created and
    /// `ASSET_DATA_CORRUPTION` if replay hits a damaged record.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_dir.display()),
                    e,
                )
            })?;
        }

        let log_path = data_dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open commit log: {}", log_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        let records = if current_offset == 0 {
            BTreeMap::new()
        } else {
            Self::replay(&log_path).map_err(|e| {
                if e.is_fatal() {
                    let reason = e.to_string();
                    log_event_with_fields(Event::StoreCorrupted, &[("reason", reason.as_str())]);
                }
                e
            })?
        };

        let path = log_path.display().to_string();
        let keys = records.len().to_string();
        log_event_with_fields(Event::StoreOpened, &[("path", path.as_str()), ("keys", keys.as_str())]);

        Ok(Self {
            log_path,
            state: Mutex::new(LogState {
                file,
                current_offset,
                records,
            }),
        })
    }

    fn replay(log_path: &Path) -> StorageResult<BTreeMap<String, VersionedRecord>> {
        let mut records = BTreeMap::new();
        let mut reader = LogReader::open(log_path)?;

        while let Some(commit) = reader.read_next()? {
            for entry in commit.entries {
                records.insert(
                    entry.key,
                    VersionedRecord {
                        version: entry.version,
                        body: entry.body,
                    },
                );
            }
        }

        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Bytes appended to the log so far.
    pub fn log_size(&self) -> StorageResult<u64> {
        Ok(self.lock()?.current_offset)
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, LogState>> {
        self.state
            .lock()
            .map_err(|_| StorageError::data_corruption("Commit log lock poisoned"))
    }
}

impl RecordStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<VersionedRecord>> {
        Ok(self.lock()?.records.get(key).cloned())
    }

    fn query(&self, selector: &Selector, limit: Option<usize>) -> StorageResult<Vec<QueryHit>> {
        let state = self.lock()?;
        Ok(state
            .records
            .iter()
            .filter_map(|(key, rec)| {
                decode_json(&rec.body)
                    .filter(|value| selector.matches(value))
                    .map(|record| QueryHit {
                        key: key.clone(),
                        record,
                    })
            })
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn commit(&self, reads: &[ReadVersion<'_>], writes: &[WriteOp<'_>]) -> StorageResult<()> {
        let mut state = self.lock()?;

        for read in reads {
            let current = state.records.get(read.key).map_or(0, |r| r.version);
            if current != read.version {
                log_event_with_fields(Event::CommitConflict, &[("key", read.key)]);
                return Err(StorageError::commit_conflict(read.key, read.version, current));
            }
        }

        if writes.is_empty() {
            return Ok(());
        }

        let entries: Vec<CommitEntry> = writes
            .iter()
            .map(|w| CommitEntry {
                key: w.key.to_string(),
                version: state.records.get(w.key).map_or(0, |r| r.version) + 1,
                body: w.body.to_vec(),
            })
            .collect();

        let record = CommitRecord::new(entries);
        let bytes = record.serialize();

        state.append(&bytes)?;

        for entry in record.entries {
            state.records.insert(
                entry.key,
                VersionedRecord {
                    version: entry.version,
                    body: entry.body,
                },
            );
        }

        Ok(())
    }
}
