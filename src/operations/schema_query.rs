//! Catalog queries

use serde_json::{json, Value};

use crate::errors::AssetResult;
use crate::validation::{check_object, check_string};

use super::Registry;

impl Registry {
    /// Without arguments, a summary of every asset type in catalog order.
    /// With `{"assetType": tag}`, that type's full definition.
    pub fn get_schema(&self, args: &Value) -> AssetResult<Value> {
        let catalog = self.catalog()?;

        let tag = match args {
            Value::Null => None,
            other => check_string(check_object(other, "$root")?, "assetType", false)?,
        };

        match tag {
            Some(tag) => Ok(serde_json::to_value(catalog.get(tag)?)?),
            None => Ok(Value::Array(
                catalog
                    .iter()
                    .map(|def| {
                        json!({
                            "tag": def.tag,
                            "label": def.label,
                            "description": def.description,
                            "dynamic": def.dynamic,
                        })
                    })
                    .collect(),
            )),
        }
    }
}
