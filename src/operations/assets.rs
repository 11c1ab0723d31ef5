//! Instance operations
//!
//! These read the catalog untracked and write blind, so they never contend
//! with catalog mutations or with each other. The last write to a key wins.

use serde_json::Value;

use crate::errors::AssetResult;
use crate::identity::Identity;
use crate::instance::{AssetInstance, InstanceAdapter, KEY_FIELD};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaCatalog;
use crate::storage::Transaction;

use super::Registry;

impl Registry {
    /// Validates a flat instance object and writes it at its derived key.
    pub fn put_asset(&self, args: &Value, identity: &dyn Identity) -> AssetResult<AssetInstance> {
        let mut tx = Transaction::begin(self.store());
        let catalog = SchemaCatalog::snapshot(&tx)?;

        let instance =
            InstanceAdapter::new(&self.engine).put(&mut tx, &catalog, args, identity.caller_group())?;
        tx.commit()?;

        log_event_with_fields(
            Event::AssetPut,
            &[
                ("asset_type", instance.asset_type.as_str()),
                ("key", instance.key.as_str()),
            ],
        );

        Ok(instance)
    }

    /// Reads one stored instance by `@key` or by `@assetType` plus key
    /// properties, enforcing the type's `readers`.
    pub fn read_asset(&self, args: &Value, identity: &dyn Identity) -> AssetResult<Value> {
        let tx = Transaction::begin(self.store());
        let catalog = SchemaCatalog::snapshot(&tx)?;

        let asset = InstanceAdapter::new(&self.engine).read(&tx, &catalog, args, identity.caller_group())?;

        if let Some(key) = asset.get(KEY_FIELD).and_then(Value::as_str) {
            log_event_with_fields(Event::AssetRead, &[("key", key)]);
        }

        Ok(asset)
    }
}
