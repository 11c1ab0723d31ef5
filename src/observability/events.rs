//! Observable registry events

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Store
    /// File store opened and replayed
    StoreOpened,
    /// Commit log failed verification on replay
    StoreCorrupted,
    /// Optimistic commit rejected
    CommitConflict,
    /// Failed append cut back to the last acknowledged commit
    CommitRolledBack,

    // Catalog
    CatalogLoaded,
    CatalogStored,
    /// Code-defined types installed into the catalog
    BuiltinTypesSynced,

    // Asset types
    AssetTypeCreated,
    AssetTypeUpdated,
    AssetTypeDeleted,
    /// Forced delete left instances behind
    AssetTypeOrphaned,

    // Instances
    AssetPut,
    AssetRead,

    /// Any operation that returned an error
    OperationRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreCorrupted => "STORE_CORRUPTED",
            Event::CommitConflict => "COMMIT_CONFLICT",
            Event::CommitRolledBack => "COMMIT_ROLLED_BACK",

            Event::CatalogLoaded => "CATALOG_LOADED",
            Event::CatalogStored => "CATALOG_STORED",
            Event::BuiltinTypesSynced => "BUILTIN_TYPES_SYNCED",

            Event::AssetTypeCreated => "ASSET_TYPE_CREATED",
            Event::AssetTypeUpdated => "ASSET_TYPE_UPDATED",
            Event::AssetTypeDeleted => "ASSET_TYPE_DELETED",
            Event::AssetTypeOrphaned => "ASSET_TYPE_ORPHANED",

            Event::AssetPut => "ASSET_PUT",
            Event::AssetRead => "ASSET_READ",

            Event::OperationRejected => "OPERATION_REJECTED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreCorrupted)
    }

    /// Severity used when no explicit one is given.
    pub fn default_severity(&self) -> Severity {
        match self {
            Event::StoreCorrupted => Severity::Fatal,
            Event::CommitConflict
            | Event::CommitRolledBack
            | Event::AssetTypeOrphaned | Event::OperationRejected => {
                Severity::Warn
            }
            Event::CatalogLoaded | Event::CatalogStored | Event::AssetRead => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
