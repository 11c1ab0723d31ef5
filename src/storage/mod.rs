//! Record storage substrate
//!
//! Whole-value key-value records with selector queries and optimistic
//! commit validation. Two backends ship with the crate:
//!
//! - `MemoryStore`: volatile, for tests and embedding
//! - `FileStore`: append-only, checksum-verified commit log
//!
//! # Design Principles
//!
//! - Whole-value writes only (no partial updates)
//! - One commit = one atomic unit, validated against the versions it read
//! - Conflicts surface to the caller, nothing here retries
//! - Checksums verified on every replayed record
//! - Corruption is fatal

mod backend;
mod errors;
mod memory;
mod reader;
mod record;
mod selector;
mod transaction;
mod writer;

pub use backend::{QueryHit, ReadVersion, RecordStore, VersionedRecord, WriteOp};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use memory::MemoryStore;
pub use reader::LogReader;
pub use record::{compute_checksum, CommitEntry, CommitRecord};
pub use selector::Selector;
pub use transaction::Transaction;
pub use writer::{FileStore, LOG_FILE_NAME};
