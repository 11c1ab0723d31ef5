//! # Integrity checks
//!
//! Guards run before a type definition is changed or removed. "In use" and
//! "referenced" are independent facets: a type can be both.

use crate::errors::{AssetError, AssetResult};
use crate::instance::ASSET_TYPE_FIELD;
use crate::schema::{AssetType, SchemaCatalog};
use crate::storage::{Selector, Transaction};

/// Fails with `Immutable` unless the definition is dynamic.
pub fn ensure_dynamic(def: &AssetType) -> AssetResult<()> {
    if def.dynamic {
        Ok(())
    } else {
        Err(AssetError::Immutable(def.tag.clone()))
    }
}

/// Selector matching every instance of `tag`.
pub fn instances_of(tag: &str) -> Selector {
    Selector::field_equals(ASSET_TYPE_FIELD, tag)
}

/// Whether at least one instance of `tag` is persisted.
pub fn is_in_use(tx: &Transaction<'_>, tag: &str) -> AssetResult<bool> {
    Ok(tx.exists(&instances_of(tag))?)
}

/// Usage guard for deletion.
///
/// Returns whether instances exist; `force` lets the caller proceed anyway
/// and leave them orphaned.
pub fn check_usage(tx: &Transaction<'_>, tag: &str, force: bool) -> AssetResult<bool> {
    let in_use = is_in_use(tx, tag)?;
    if in_use && !force {
        return Err(AssetError::InUse(tag.to_string()));
    }
    Ok(in_use)
}

/// Reference guard for deletion. Not bypassed by `force`.
pub fn check_references(catalog: &SchemaCatalog, tag: &str) -> AssetResult<()> {
    match catalog.referencing(tag) {
        Some((owner, _)) => Err(AssetError::Referenced {
            tag: tag.to_string(),
            referenced_by: owner.tag.clone(),
        }),
        None => Ok(()),
    }
}
