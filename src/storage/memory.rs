//! In-memory record store

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::backend::{decode_json, QueryHit, ReadVersion, RecordStore, VersionedRecord, WriteOp};
use super::errors::{StorageError, StorageResult};
use super::selector::Selector;

/// Volatile store used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, VersionedRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::data_corruption("Memory store lock poisoned")
}

impl RecordStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<VersionedRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    fn query(&self, selector: &Selector, limit: Option<usize>) -> StorageResult<Vec<QueryHit>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
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
        let mut records = self.records.write().map_err(|_| poisoned())?;

        for read in reads {
            let current = records.get(read.key).map_or(0, |r| r.version);
            if current != read.version {
                return Err(StorageError::commit_conflict(read.key, read.version, current));
            }
        }

        for write in writes {
            let version = records.get(write.key).map_or(0, |r| r.version) + 1;
            records.insert(
                write.key.to_string(),
                VersionedRecord {
                    version,
                    body: write.body.to_vec(),
                },
            );
        }

        Ok(())
    }
}
