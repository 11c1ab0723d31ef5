//! Schema catalog
//!
//! The full ordered list of asset types lives in a single record at
//! [`CATALOG_KEY`]. There is no partial-update path: every mutation reads the
//! whole list, edits it in memory and writes the whole list back, so a bad
//! write can only ever replace the catalog as a unit.

use crate::errors::{AssetError, AssetResult};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::{StorageError, Transaction};

use super::types::{AssetProp, AssetType};

/// Well-known key of the catalog record.
pub const CATALOG_KEY: &str = "assetTypeListData";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaCatalog {
    types: Vec<AssetType>,
}

impl SchemaCatalog {
    pub fn new(types: Vec<AssetType>) -> Self {
        Self { types }
    }

    /// Loads the catalog with a tracked read.
    ///
    /// Concurrent catalog mutations conflict at commit. An absent record is
    /// an empty catalog.
    pub fn load(tx: &mut Transaction<'_>) -> AssetResult<Self> {
        let body = tx.load_record(CATALOG_KEY)?;
        Self::decode(body)
    }

    /// Loads the catalog without registering the read for conflict checks.
    ///
    /// Used by instance operations, which must not contend with catalog writes.
    pub fn snapshot(tx: &Transaction<'_>) -> AssetResult<Self> {
        let body = tx.peek_record(CATALOG_KEY)?;
        Self::decode(body)
    }

    fn decode(body: Option<Vec<u8>>) -> AssetResult<Self> {
        let Some(body) = body else {
            return Ok(Self::default());
        };

        let types: Vec<AssetType> = serde_json::from_slice(&body).map_err(|e| {
            StorageError::corruption_for_key(CATALOG_KEY, format!("Invalid catalog JSON: {}", e))
        })?;

        let count = types.len().to_string();
        log_event_with_fields(Event::CatalogLoaded, &[("types", count.as_str())]);

        Ok(Self { types })
    }

    /// Serializes the whole list into the transaction's write set.
    pub fn store(&self, tx: &mut Transaction<'_>) -> AssetResult<()> {
        let body = serde_json::to_vec(&self.types).map_err(|e| {
            StorageError::corruption_for_key(CATALOG_KEY, format!("Failed to serialize catalog: {}", e))
        })?;
        tx.store_record(CATALOG_KEY, body);

        let count = self.types.len().to_string();
        log_event_with_fields(Event::CatalogStored, &[("types", count.as_str())]);

        Ok(())
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&AssetType> {
        self.types.iter().find(|t| t.tag == tag)
    }

    /// Like `find_by_tag`, failing with `NotFound`.
    pub fn get(&self, tag: &str) -> AssetResult<&AssetType> {
        self.find_by_tag(tag)
            .ok_or_else(|| AssetError::not_found(format!("asset type '{}'", tag)))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.find_by_tag(tag).is_some()
    }

    /// Appends a new definition, failing with `Conflict` if the tag is taken.
    pub fn insert(&mut self, def: AssetType) -> AssetResult<()> {
        if self.contains(&def.tag) {
            return Err(AssetError::conflict(format!(
                "asset type '{}' already exists",
                def.tag
            )));
        }
        self.types.push(def);
        Ok(())
    }

    /// Substitutes the entry with the same tag, keeping its position.
    pub fn replace(&mut self, def: AssetType) -> AssetResult<()> {
        let slot = self
            .types
            .iter_mut()
            .find(|t| t.tag == def.tag)
            .ok_or_else(|| AssetError::not_found(format!("asset type '{}'", def.tag)))?;
        *slot = def;
        Ok(())
    }

    pub fn remove(&mut self, tag: &str) -> Option<AssetType> {
        let pos = self.types.iter().position(|t| t.tag == tag)?;
        Some(self.types.remove(pos))
    }

    /// First type holding a relationship property that names `tag`,
    /// including `tag` itself.
    pub fn referencing(&self, tag: &str) -> Option<(&AssetType, &AssetProp)> {
        self.types
            .iter()
            .find_map(|t| t.reference_to(tag).map(|p| (t, p)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
