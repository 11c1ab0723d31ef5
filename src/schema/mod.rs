//! Schema subsystem
//!
//! Asset type definitions, their access rules and the persisted catalog
//! that holds them. The catalog is the single source of truth for instance
//! shape; instances carry only the `@assetType` tag that resolves it.

mod acl;
mod catalog;
mod types;

pub use acl::{GroupPattern, GroupSet, PATTERN_MARKER};
pub use catalog::{SchemaCatalog, CATALOG_KEY};
pub use types::{AssetProp, AssetType, DataTypeKind, LIST_PREFIX, REFERENCE_PREFIX};
