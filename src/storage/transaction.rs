//! Per-operation unit of work
//!
//! A transaction buffers every write until `commit`, records the version of
//! each key it reads through `load_record`, and hands both sets to the
//! backend for optimistic validation. Nothing reaches the store before
//! commit, so dropping a transaction discards its work.

use std::collections::BTreeMap;

use super::backend::{ReadVersion, RecordStore, WriteOp};
use super::errors::StorageResult;
use super::selector::Selector;

pub struct Transaction<'s> {
    store: &'s dyn RecordStore,
    reads: BTreeMap<String, u64>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'s> Transaction<'s> {
    pub fn begin(store: &'s dyn RecordStore) -> Self {
        Self {
            store,
            reads: BTreeMap::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Tracked read: the observed version is validated at commit.
    ///
    /// Sees this transaction's own buffered writes.
    pub fn load_record(&mut self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if let Some(body) = self.writes.get(key) {
            return Ok(Some(body.clone()));
        }

        let record = self.store.get(key)?;
        self.reads
            .entry(key.to_string())
            .or_insert_with(|| record.as_ref().map_or(0, |r| r.version));

        Ok(record.map(|r| r.body))
    }

    /// Untracked read: never causes a commit conflict.
    pub fn peek_record(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if let Some(body) = self.writes.get(key) {
            return Ok(Some(body.clone()));
        }
        Ok(self.store.get(key)?.map(|r| r.body))
    }

    /// Buffer a whole-value write. A later write to the same key replaces it.
    pub fn store_record(&mut self, key: &str, body: Vec<u8>) {
        self.writes.insert(key.to_string(), body);
    }

    /// Whether any committed record matches the selector.
    pub fn exists(&self, selector: &Selector) -> StorageResult<bool> {
        Ok(!self.store.query(selector, Some(1))?.is_empty())
    }

    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Validate reads and apply every buffered write atomically.
    ///
    /// Read-only transactions commit without touching the store.
    pub fn commit(self) -> StorageResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }

        let reads: Vec<ReadVersion<'_>> = self
            .reads
            .iter()
            .map(|(key, version)| ReadVersion {
                key,
                version: *version,
            })
            .collect();
        let writes: Vec<WriteOp<'_>> = self
            .writes
            .iter()
            .map(|(key, body)| WriteOp { key, body })
            .collect();

        self.store.commit(&reads, &writes)
    }
}
