//! # Data Types
//!
//! Maps a `dataType` name to a parser producing the stored (normalized)
//! form and the indexable form of a value. Built-ins are pre-registered;
//! custom types are registered once at startup and resolved the same way.

mod builtin;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{AssetError, AssetResult};
use crate::schema::{LIST_PREFIX, REFERENCE_PREFIX};

pub use builtin::{
    BooleanType, DateTimeType, IntegerType, NumberType, ObjectType, StringType, BOOLEAN, DATETIME,
    INTEGER, NUMBER, OBJECT, STRING,
};
pub(crate) use builtin::json_type_name;

/// Result of parsing a raw value
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Form written to the store
    pub normalized: Value,
    /// Canonical form used for key derivation and equality
    pub indexable: String,
}

impl Parsed {
    pub fn new(normalized: Value, indexable: impl Into<String>) -> Self {
        Self {
            normalized,
            indexable: indexable.into(),
        }
    }
}

/// A named value parser. Errors are plain reasons; callers attach the field.
pub trait DataType: Send + Sync {
    fn parse(&self, raw: &Value) -> Result<Parsed, String>;
}

impl<F> DataType for F
where
    F: Fn(&Value) -> Result<Parsed, String> + Send + Sync,
{
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        self(raw)
    }
}

/// Registry of data types by name
pub struct DataTypeRegistry {
    types: HashMap<String, Arc<dyn DataType>>,
}

impl DataTypeRegistry {
    /// Registry holding only the built-in types.
    pub fn new() -> Self {
        let mut types: HashMap<String, Arc<dyn DataType>> = HashMap::new();
        types.insert(STRING.into(), Arc::new(StringType));
        types.insert(NUMBER.into(), Arc::new(NumberType));
        types.insert(INTEGER.into(), Arc::new(IntegerType));
        types.insert(BOOLEAN.into(), Arc::new(BooleanType));
        types.insert(DATETIME.into(), Arc::new(DateTimeType));
        types.insert(OBJECT.into(), Arc::new(ObjectType));
        Self { types }
    }

    /// Adds a custom type.
    ///
    /// Fails with `Conflict` if the name is taken and with `Validation` if it
    /// is empty or starts with a reserved prefix (`[]`, `->`, `@`).
    pub fn register(&mut self, name: &str, data_type: impl DataType + 'static) -> AssetResult<()> {
        if name.is_empty()
            || name.starts_with(LIST_PREFIX)
            || name.starts_with(REFERENCE_PREFIX)
            || name.starts_with('@')
        {
            return Err(AssetError::validation(
                "dataType",
                format!("'{}' is not a valid custom type name", name),
            ));
        }
        if self.types.contains_key(name) {
            return Err(AssetError::conflict(format!(
                "data type '{}' is already registered",
                name
            )));
        }
        self.types.insert(name.to_string(), Arc::new(data_type));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> AssetResult<&dyn DataType> {
        self.types
            .get(name)
            .map(|t| &**t)
            .ok_or_else(|| AssetError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

impl Default for DataTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
