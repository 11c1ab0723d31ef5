//! Structural selector matching
//!
//! A selector is a set of top-level field equalities. Matching is exact: no
//! type coercion, missing fields never match.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    /// Selector matching every JSON record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selector on a single field.
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    /// Add an equality condition.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        let Some(obj) = record.as_object() else {
            return false;
        };

        self.fields
            .iter()
            .all(|(field, expected)| obj.get(field) == Some(expected))
    }
}
