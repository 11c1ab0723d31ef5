//! # Record Store Backend Trait

use serde_json::Value;

use super::errors::StorageResult;
use super::selector::Selector;

/// A whole record value together with the version it was committed at.
///
/// Absent keys behave as version 0; every committed write bumps the key's
/// version by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub version: u64,
    pub body: Vec<u8>,
}

/// A record matched by a selector query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub key: String,
    pub record: Value,
}

/// A key observed by a unit of work and the version it held at that time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadVersion<'a> {
    pub key: &'a str,
    pub version: u64,
}

/// A buffered whole-value write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOp<'a> {
    pub key: &'a str,
    pub body: &'a [u8],
}

/// Key-value store with whole-value get/put, selector queries and
/// optimistic commit validation.
pub trait RecordStore: Send + Sync {
    /// Load the latest committed value of a key.
    fn get(&self, key: &str) -> StorageResult<Option<VersionedRecord>>;

    /// Return JSON records matching the selector, in key order.
    ///
    /// Records that are not JSON objects never match.
    fn query(&self, selector: &Selector, limit: Option<usize>) -> StorageResult<Vec<QueryHit>>;

    /// Atomically validate reads and apply writes.
    ///
    /// Fails with a commit conflict, applying nothing, if any read key no
    /// longer holds the observed version.
    fn commit(&self, reads: &[ReadVersion<'_>], writes: &[WriteOp<'_>]) -> StorageResult<()>;
}

pub(crate) fn decode_json(body: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .filter(Value::is_object)
}
