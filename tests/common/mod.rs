//! Shared fixtures for registry integration tests
#![allow(dead_code)]

use std::sync::Arc;

use assetreg::datatype::Parsed;
use assetreg::identity::CallerGroup;
use assetreg::storage::{
    MemoryStore, QueryHit, ReadVersion, RecordStore, Selector, StorageResult, VersionedRecord,
    WriteOp,
};
use assetreg::Registry;
use serde_json::{json, Value};

pub fn org1() -> CallerGroup {
    CallerGroup::new("org1MSP")
}

pub fn org2() -> CallerGroup {
    CallerGroup::new("org2MSP")
}

/// Strips `.` and `-`, then requires exactly 11 characters.
pub fn parse_cpf(raw: &Value) -> Result<Parsed, String> {
    let text = raw.as_str().ok_or("CPF must be a string")?;
    let digits: String = text.chars().filter(|c| *c != '.' && *c != '-').collect();
    if digits.chars().count() != 11 {
        return Err(format!("CPF must have 11 digits, got '{}'", text));
    }
    Ok(Parsed::new(Value::String(digits.clone()), digits))
}

pub fn non_empty(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err("value must not be blank".to_string()),
    }
}

/// Registry with the `cpf` type and `nonEmpty` predicate installed.
pub fn registry_over(store: impl RecordStore + 'static) -> Registry {
    let mut registry = Registry::new(store);
    registry.register_data_type("cpf", parse_cpf).unwrap();
    registry.register_predicate("nonEmpty", non_empty).unwrap();
    registry
}

pub fn registry() -> Registry {
    registry_over(MemoryStore::new())
}

/// A `MemoryStore` several registries can share.
#[derive(Clone, Default)]
pub struct SharedStore(pub Arc<MemoryStore>);

impl RecordStore for SharedStore {
    fn get(&self, key: &str) -> StorageResult<Option<VersionedRecord>> {
        self.0.get(key)
    }

    fn query(&self, selector: &Selector, limit: Option<usize>) -> StorageResult<Vec<QueryHit>> {
        self.0.query(selector, limit)
    }

    fn commit(&self, reads: &[ReadVersion<'_>], writes: &[WriteOp<'_>]) -> StorageResult<()> {
        self.0.commit(reads, writes)
    }
}

pub fn sample_person() -> Value {
    json!({
        "tag": "samplePerson",
        "label": "Person",
        "description": "Personal data of someone",
        "props": [
            {
                "tag": "cpf",
                "label": "CPF (Brazilian ID)",
                "dataType": "cpf",
                "writers": ["org2MSP"]
            },
            {
                "tag": "name",
                "label": "Asset Name",
                "dataType": "string",
                "required": true,
                "isKey": true,
                "validate": "nonEmpty"
            },
            {
                "tag": "readerScore",
                "label": "Reader Score",
                "dataType": "number",
                "defaultValue": 0.0,
                "writers": ["$org\\dMSP"]
            },
            {
                "tag": "active",
                "label": "Active",
                "dataType": "boolean",
                "defaultValue": false
            }
        ]
    })
}

pub fn sample_book() -> Value {
    json!({
        "tag": "sampleBook",
        "label": "Book",
        "props": [
            {"tag": "title", "label": "Title", "dataType": "string", "isKey": true},
            {"tag": "author", "label": "Author", "dataType": "string", "isKey": true},
            {"tag": "currentTenant", "label": "Current Tenant", "dataType": "->samplePerson"},
            {"tag": "genres", "label": "Genres", "dataType": "[]string"},
            {"tag": "published", "label": "Publishment Date", "dataType": "datetime"}
        ]
    })
}

pub fn sample_secret() -> Value {
    json!({
        "tag": "sampleSecret",
        "label": "Secret",
        "readers": ["org1MSP"],
        "props": [
            {"tag": "secretName", "label": "Secret Name", "dataType": "string", "isKey": true},
            {"tag": "secret", "label": "Secret", "dataType": "string", "required": true}
        ]
    })
}

pub fn create(registry: &Registry, defs: Vec<Value>) -> assetreg::AssetResult<Value> {
    registry.invoke_by_name("createAssetType", &json!({ "assetTypes": defs }), &org1())
}

/// Registry with `samplePerson`, `sampleBook` and `sampleSecret` created.
pub fn seeded_registry() -> Registry {
    let registry = registry();
    create(&registry, vec![sample_person(), sample_book(), sample_secret()]).unwrap();
    registry
}
