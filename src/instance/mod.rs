//! Instance persistence
//!
//! An instance is stored as one record under its composite key. The record
//! holds the `@assetType` discriminator, the `@key` and every property that
//! has a value, all in normalized form.

mod adapter;
mod key;

use serde_json::{Map, Value};

pub use adapter::InstanceAdapter;
pub use key::{derive_key, escape, parse_key, unescape, KEY_SEPARATOR};

/// Reserved field naming an instance's asset type
pub const ASSET_TYPE_FIELD: &str = "@assetType";
/// Reserved field holding an instance's composite key
pub const KEY_FIELD: &str = "@key";

/// A validated instance, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInstance {
    pub asset_type: String,
    pub key: String,
    /// Normalized property values by tag
    pub fields: Map<String, Value>,
}

impl AssetInstance {
    pub fn get(&self, tag: &str) -> Option<&Value> {
        self.fields.get(tag)
    }

    /// The stored JSON form.
    pub fn to_value(&self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 2);
        out.insert(ASSET_TYPE_FIELD.to_string(), Value::String(self.asset_type.clone()));
        out.insert(KEY_FIELD.to_string(), Value::String(self.key.clone()));
        for (tag, value) in &self.fields {
            out.insert(tag.clone(), value.clone());
        }
        Value::Object(out)
    }
}
