//! Instance persistence adapter

use serde_json::{Map, Value};

use crate::errors::{AssetError, AssetResult};
use crate::schema::SchemaCatalog;
use crate::storage::{StorageError, Transaction};
use crate::validation::{check_object, check_string, require_string, ValidationEngine};

use super::key::{derive_key, parse_key};
use super::{AssetInstance, ASSET_TYPE_FIELD, KEY_FIELD};

/// Turns caller input into stored instances and back.
pub struct InstanceAdapter<'e> {
    engine: &'e ValidationEngine,
}

impl<'e> InstanceAdapter<'e> {
    pub fn new(engine: &'e ValidationEngine) -> Self {
        Self { engine }
    }

    /// Validates a flat input object into an instance.
    ///
    /// Plain fields the type does not declare are rejected; other `@` fields
    /// are ignored. Nothing is written.
    pub fn build(
        &self,
        catalog: &SchemaCatalog,
        raw: &Value,
        caller_group: &str,
    ) -> AssetResult<AssetInstance> {
        let input = check_object(raw, "$root")?;
        let def = catalog.get(require_string(input, ASSET_TYPE_FIELD)?)?;

        if let Some(field) = input
            .keys()
            .find(|field| !field.starts_with('@') && !def.has_prop(field))
        {
            return Err(AssetError::validation(
                field,
                format!("property is not declared by asset type '{}'", def.tag),
            ));
        }

        let mut fields = Map::new();
        let mut key_parts = Vec::new();
        for prop in &def.props {
            let parsed =
                self.engine
                    .validate_property(catalog, prop, input.get(&prop.tag), caller_group)?;
            if let Some(parsed) = parsed {
                if prop.is_key {
                    key_parts.push(parsed.indexable);
                }
                fields.insert(prop.tag.clone(), parsed.normalized);
            }
        }

        Ok(AssetInstance {
            asset_type: def.tag.clone(),
            key: derive_key(&def.tag, &key_parts),
            fields,
        })
    }

    /// Validates and buffers exactly one write at the derived key.
    ///
    /// A prior instance at the same key is overwritten.
    pub fn put(
        &self,
        tx: &mut Transaction<'_>,
        catalog: &SchemaCatalog,
        raw: &Value,
        caller_group: &str,
    ) -> AssetResult<AssetInstance> {
        let instance = self.build(catalog, raw, caller_group)?;
        let body = serde_json::to_vec(&instance.to_value())?;
        tx.store_record(&instance.key, body);
        Ok(instance)
    }

    /// Resolves `{"@key": ...}` or `@assetType` plus key properties to
    /// `(tag, key)`.
    pub fn resolve_key(
        &self,
        catalog: &SchemaCatalog,
        args: &Map<String, Value>,
    ) -> AssetResult<(String, String)> {
        if let Some(key) = check_string(args, KEY_FIELD, false)? {
            let (tag, _) = parse_key(key).ok_or_else(|| {
                AssetError::validation(KEY_FIELD, format!("'{}' is not a valid key", key))
            })?;
            return Ok((tag, key.to_string()));
        }

        let def = catalog.get(require_string(args, ASSET_TYPE_FIELD)?)?;
        let key = self.engine.instance_key(catalog, def, args, "$root")?;
        Ok((def.tag.clone(), key))
    }

    /// Reads a stored instance, enforcing the type's `readers`.
    pub fn read(
        &self,
        tx: &Transaction<'_>,
        catalog: &SchemaCatalog,
        raw: &Value,
        caller_group: &str,
    ) -> AssetResult<Value> {
        let args = check_object(raw, "$root")?;
        let (tag, key) = self.resolve_key(catalog, args)?;

        let def = catalog.get(&tag)?;
        if !def.readers.permits(caller_group) {
            return Err(AssetError::permission(format!(
                "group '{}' may not read asset type '{}'",
                caller_group, def.tag
            )));
        }

        let body = tx
            .peek_record(&key)?
            .ok_or_else(|| AssetError::not_found(format!("asset '{}'", key)))?;
        let value = serde_json::from_slice(&body).map_err(|e| {
            StorageError::corruption_for_key(&key, format!("Invalid asset JSON: {}", e))
        })?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AssetProp, AssetType, GroupSet};
    use crate::storage::{MemoryStore, RecordStore};
    use serde_json::json;

    fn catalog() -> SchemaCatalog {
        let mut name = AssetProp::new("name", "Name", "string");
        name.is_key = true;
        let mut active = AssetProp::new("active", "Active", "boolean");
        active.default_value = Some(json!(false));
        let person = AssetType::new("samplePerson", "Sample Person", vec![name, active]);

        let mut secret_name = AssetProp::new("secretName", "Secret Name", "string");
        secret_name.is_key = true;
        let mut secret = AssetType::new("sampleSecret", "Secret", vec![secret_name]);
        secret.readers = GroupSet::parse(&["org1MSP"]).unwrap();

        SchemaCatalog::new(vec![person, secret])
    }

    #[test]
    fn test_build_derives_key_and_defaults() {
        let engine = ValidationEngine::new();
        let adapter = InstanceAdapter::new(&engine);
        let instance = adapter
            .build(&catalog(), &json!({"@assetType": "samplePerson", "name": "Maria"}), "org1MSP")
            .unwrap();

        assert_eq!(instance.key, "samplePerson:Maria");
        assert_eq!(instance.get("active"), Some(&json!(false)));
        assert_eq!(
            instance.to_value(),
            json!({"@assetType": "samplePerson", "@key": "samplePerson:Maria", "name": "Maria", "active": false})
        );
    }

    #[test]
    fn test_undeclared_field_rejected_reserved_ignored() {
        let engine = ValidationEngine::new();
        let adapter = InstanceAdapter::new(&engine);

        let err = adapter
            .build(
                &catalog(),
                &json!({"@assetType": "samplePerson", "name": "Maria", "age": 3}),
                "org1MSP",
            )
            .unwrap_err();
        assert!(matches!(err, AssetError::Validation { ref field, .. } if field == "age"));

        assert!(adapter
            .build(
                &catalog(),
                &json!({"@assetType": "samplePerson", "@key": "ignored", "name": "Maria"}),
                "org1MSP",
            )
            .is_ok());
    }

    #[test]
    fn test_unknown_asset_type() {
        let engine = ValidationEngine::new();
        let adapter = InstanceAdapter::new(&engine);
        let err = adapter
            .build(&catalog(), &json!({"@assetType": "ghost"}), "org1MSP")
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[test]
    fn test_put_buffers_one_write_then_read() {
        let store = MemoryStore::new();
        let engine = ValidationEngine::new();
        let adapter = InstanceAdapter::new(&engine);
        let catalog = catalog();

        let mut tx = Transaction::begin(&store);
        adapter
            .put(&mut tx, &catalog, &json!({"@assetType": "samplePerson", "name": "Maria"}), "org1MSP")
            .unwrap();
        assert_eq!(tx.pending_writes(), 1);
        tx.commit().unwrap();
        assert!(store.get("samplePerson:Maria").unwrap().is_some());

        let tx = Transaction::begin(&store);
        let by_key = adapter
            .read(&tx, &catalog, &json!({"@key": "samplePerson:Maria"}), "org2MSP")
            .unwrap();
        let by_props = adapter
            .read(&tx, &catalog, &json!({"@assetType": "samplePerson", "name": "Maria"}), "org2MSP")
            .unwrap();
        assert_eq!(by_key, by_props);
        assert_eq!(by_key["active"], json!(false));
    }

    #[test]
    fn test_read_checks_readers_and_existence() {
        let store = MemoryStore::new();
        let engine = ValidationEngine::new();
        let adapter = InstanceAdapter::new(&engine);
        let catalog = catalog();
        let tx = Transaction::begin(&store);

        assert!(matches!(
            adapter.read(&tx, &catalog, &json!({"@key": "sampleSecret:x"}), "org2MSP"),
            Err(AssetError::Permission(_))
        ));
        assert!(matches!(
            adapter.read(&tx, &catalog, &json!({"@key": "sampleSecret:x"}), "org1MSP"),
            Err(AssetError::NotFound(_))
        ));
    }
}
