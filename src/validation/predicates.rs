//! Named validation predicates
//!
//! A property's `validate` entry names a predicate registered here. Predicates
//! see the coerced value only and must not touch storage.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{AssetError, AssetResult};

/// A pure check over a coerced value. `Err` carries the rejection reason.
pub type Predicate = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, predicate: F) -> AssetResult<()>
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(AssetError::validation("validate", "predicate name must be non-empty"));
        }
        if self.predicates.contains_key(name) {
            return Err(AssetError::conflict(format!(
                "predicate '{}' is already registered",
                name
            )));
        }
        self.predicates.insert(name.to_string(), Arc::new(predicate));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_run() {
        let mut registry = PredicateRegistry::new();
        registry
            .register("positive", |v: &Value| match v.as_f64() {
                Some(n) if n > 0.0 => Ok(()),
                _ => Err("must be positive".into()),
            })
            .unwrap();

        let positive = registry.get("positive").unwrap();
        assert!(positive(&json!(3)).is_ok());
        assert_eq!(positive(&json!(-1)).unwrap_err(), "must be positive");
    }

    #[test]
    fn test_duplicate_name_conflicts() {
        let mut registry = PredicateRegistry::new();
        registry.register("any", |_: &Value| Ok(())).unwrap();
        assert!(registry.register("any", |_: &Value| Ok(())).is_err());
        assert!(registry.contains("any"));
    }
}
