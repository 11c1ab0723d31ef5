//! Property validation and definition checks
//!
//! Value validation runs in a fixed order for every property:
//! - absent value: fail if mandatory, else substitute the default or skip
//! - coercion through the resolved data type (element-wise for lists,
//!   key-shape checked for relationships)
//! - the named `validate` predicate, if any
//! - `writers`, for values the caller supplied
//!
//! Definition checks run before anything is written to the catalog.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::datatype::{json_type_name, DataType, DataTypeRegistry, Parsed};
use crate::errors::{AssetError, AssetResult};
use crate::instance::{derive_key, parse_key, ASSET_TYPE_FIELD, KEY_FIELD};
use crate::schema::{AssetProp, AssetType, DataTypeKind, SchemaCatalog};

use super::predicates::PredicateRegistry;
use super::value::is_empty_value;

/// Validation engine holding the data type and predicate registries.
///
/// Registration happens once at startup; validation itself never mutates
/// the engine.
#[derive(Default)]
pub struct ValidationEngine {
    data_types: DataTypeRegistry,
    predicates: PredicateRegistry,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_data_type(
        &mut self,
        name: &str,
        data_type: impl DataType + 'static,
    ) -> AssetResult<()> {
        self.data_types.register(name, data_type)
    }

    pub fn register_predicate<F>(&mut self, name: &str, predicate: F) -> AssetResult<()>
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.predicates.register(name, predicate)
    }

    pub fn resolve_data_type(&self, name: &str) -> AssetResult<&dyn DataType> {
        self.data_types.resolve(name)
    }

    /// Validates one property value.
    ///
    /// Returns `None` for an absent optional property without a default.
    ///
    /// # Errors
    ///
    /// - `Validation` naming the property for missing, mistyped or rejected values
    /// - `UnknownType` if the property's data type cannot be resolved
    /// - `NotFound` if a relationship names an unknown asset type
    /// - `Permission` if the caller's group is not among the `writers`
    pub fn validate_property(
        &self,
        catalog: &SchemaCatalog,
        prop: &AssetProp,
        raw: Option<&Value>,
        caller_group: &str,
    ) -> AssetResult<Option<Parsed>> {
        let (value, supplied) = match raw {
            Some(v) if !is_empty_value(v) => (v, true),
            _ if prop.is_mandatory() => {
                return Err(AssetError::validation(&prop.tag, "required property is missing"));
            }
            _ => match &prop.default_value {
                Some(default) => (default, false),
                None => return Ok(None),
            },
        };

        let parsed = self.coerce(catalog, &prop.kind(), value, &prop.tag)?;

        if let Some(name) = &prop.validate {
            let predicate = self.predicates.get(name).ok_or_else(|| {
                AssetError::validation(&prop.tag, format!("unknown predicate '{}'", name))
            })?;
            predicate(&parsed.normalized).map_err(|reason| AssetError::validation(&prop.tag, reason))?;
        }

        if supplied && !prop.writers.permits(caller_group) {
            return Err(AssetError::permission(format!(
                "group '{}' may not write property '{}'",
                caller_group, prop.tag
            )));
        }

        Ok(Some(parsed))
    }

    /// Coerces a present value to a data type expression.
    pub fn coerce(
        &self,
        catalog: &SchemaCatalog,
        kind: &DataTypeKind,
        raw: &Value,
        field: &str,
    ) -> AssetResult<Parsed> {
        match kind {
            DataTypeKind::Named(name) => self
                .data_types
                .resolve(name)?
                .parse(raw)
                .map_err(|reason| AssetError::validation(field, reason)),
            DataTypeKind::List(element) => {
                let items = raw.as_array().ok_or_else(|| {
                    AssetError::validation(
                        field,
                        format!("expected a list, got {}", json_type_name(raw)),
                    )
                })?;

                let mut normalized = Vec::with_capacity(items.len());
                let mut indexable = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let parsed = self.coerce(catalog, element, item, &format!("{}[{}]", field, i))?;
                    normalized.push(parsed.normalized);
                    indexable.push(parsed.indexable);
                }

                let indexable = serde_json::to_string(&indexable)
                    .map_err(|e| AssetError::validation(field, e.to_string()))?;
                Ok(Parsed::new(Value::Array(normalized), indexable))
            }
            DataTypeKind::Reference(target) => self.coerce_reference(catalog, target, raw, field),
        }
    }

    /// Accepts a key string, an object carrying `@key`, or an object carrying
    /// the target's key properties. The referenced instance need not exist.
    fn coerce_reference(
        &self,
        catalog: &SchemaCatalog,
        target: &str,
        raw: &Value,
        field: &str,
    ) -> AssetResult<Parsed> {
        let target_def = catalog.get(target)?;

        let key = match raw {
            Value::String(key) => key.clone(),
            Value::Object(obj) => match obj.get(KEY_FIELD) {
                Some(Value::String(key)) => key.clone(),
                Some(_) => return Err(AssetError::validation(field, "'@key' must be a string")),
                None => self.instance_key(catalog, target_def, obj, field)?,
            },
            other => {
                return Err(AssetError::validation(
                    field,
                    format!("expected a key or an object, got {}", json_type_name(other)),
                ));
            }
        };

        let (tag, parts) = parse_key(&key)
            .ok_or_else(|| AssetError::validation(field, format!("'{}' is not a valid key", key)))?;
        if tag != target_def.tag {
            return Err(AssetError::validation(
                field,
                format!("key '{}' does not reference asset type '{}'", key, target),
            ));
        }
        if parts.len() != target_def.key_props().count() {
            return Err(AssetError::validation(
                field,
                format!("key '{}' does not match the key properties of '{}'", key, target),
            ));
        }
        for (prop, part) in target_def.key_props().zip(&parts) {
            self.check_key_part(catalog, prop, part).map_err(|reason| {
                AssetError::validation(field, format!("key '{}': {}", key, reason))
            })?;
        }

        let mut normalized = Map::new();
        normalized.insert(ASSET_TYPE_FIELD.to_string(), Value::String(target.to_string()));
        normalized.insert(KEY_FIELD.to_string(), Value::String(key.clone()));
        Ok(Parsed::new(Value::Object(normalized), key))
    }

    /// A key part must be the indexable form some value of `prop` produces.
    ///
    /// Parts of list and object key properties are their JSON text, so a
    /// part that does not coerce as a string is retried as decoded JSON.
    fn check_key_part(&self, catalog: &SchemaCatalog, prop: &AssetProp, part: &str) -> Result<(), String> {
        if part.is_empty() {
            return Err(format!("empty value for key property '{}'", prop.tag));
        }

        let kind = prop.kind();
        let parsed = self
            .coerce(catalog, &kind, &Value::String(part.to_string()), &prop.tag)
            .or_else(|err| match serde_json::from_str::<Value>(part) {
                Ok(decoded) => self.coerce(catalog, &kind, &decoded, &prop.tag),
                Err(_) => Err(err),
            })
            .map_err(|e| e.to_string())?;

        if parsed.indexable != part {
            return Err(format!(
                "'{}' is not the canonical form of key property '{}'",
                part, prop.tag
            ));
        }
        Ok(())
    }

    /// Derives the key of an instance of `def` from its key property values.
    pub fn instance_key(
        &self,
        catalog: &SchemaCatalog,
        def: &AssetType,
        values: &Map<String, Value>,
        field: &str,
    ) -> AssetResult<String> {
        let mut parts = Vec::new();
        for prop in def.key_props() {
            let raw = values
                .get(&prop.tag)
                .filter(|v| !is_empty_value(v))
                .ok_or_else(|| {
                    AssetError::validation(
                        field,
                        format!("missing key property '{}' of '{}'", prop.tag, def.tag),
                    )
                })?;
            parts.push(self.coerce(catalog, &prop.kind(), raw, &prop.tag)?.indexable);
        }
        Ok(derive_key(&def.tag, &parts))
    }

    /// Builds a property definition for admission into an existing type.
    ///
    /// The tag must not collide with one of `owner`'s properties.
    pub fn build_property(
        &self,
        catalog: &SchemaCatalog,
        owner: &AssetType,
        raw: &Value,
    ) -> AssetResult<AssetProp> {
        let prop: AssetProp = serde_json::from_value(raw.clone()).map_err(|e| {
            AssetError::validation("props", format!("invalid property definition: {}", e))
        })?;

        if owner.has_prop(&prop.tag) {
            return Err(AssetError::validation(
                &prop.tag,
                format!("property already defined on asset type '{}'", owner.tag),
            ));
        }

        self.check_prop(catalog, &owner.tag, &prop)?;
        Ok(prop)
    }

    /// Checks one definition against the catalog it is about to join.
    ///
    /// References to the definition's own tag are accepted.
    pub fn check_asset_type(&self, catalog: &SchemaCatalog, def: &AssetType) -> AssetResult<()> {
        if def.tag.is_empty() {
            return Err(AssetError::validation("tag", "asset type tag must be non-empty"));
        }
        if def.label.is_empty() {
            return Err(AssetError::validation(
                "label",
                format!("asset type '{}' must have a label", def.tag),
            ));
        }

        let mut seen = HashSet::new();
        for prop in &def.props {
            if !seen.insert(prop.tag.as_str()) {
                return Err(AssetError::validation(
                    &prop.tag,
                    format!("duplicate property tag in asset type '{}'", def.tag),
                ));
            }
            self.check_prop(catalog, &def.tag, prop)?;
        }

        if def.key_props().next().is_none() {
            return Err(AssetError::validation(
                "props",
                format!("asset type '{}' must declare at least one key property", def.tag),
            ));
        }

        Ok(())
    }

    /// Checks the whole catalog before it is stored.
    pub fn check_catalog(&self, catalog: &SchemaCatalog) -> AssetResult<()> {
        let mut seen = HashSet::new();
        for def in catalog.iter() {
            if !seen.insert(def.tag.as_str()) {
                return Err(AssetError::conflict(format!(
                    "asset type '{}' is defined more than once",
                    def.tag
                )));
            }
            self.check_asset_type(catalog, def)?;
        }
        Ok(())
    }

    fn check_prop(&self, catalog: &SchemaCatalog, owner_tag: &str, prop: &AssetProp) -> AssetResult<()> {
        if prop.tag.is_empty() {
            return Err(AssetError::validation("props", "property tag must be non-empty"));
        }
        if prop.tag.starts_with('@') {
            return Err(AssetError::validation(
                &prop.tag,
                "property tags starting with '@' are reserved",
            ));
        }
        if prop.label.is_empty() {
            return Err(AssetError::validation(&prop.tag, "property label must be non-empty"));
        }

        self.check_data_type(catalog, owner_tag, &prop.kind(), &prop.tag)?;

        if let Some(name) = &prop.validate {
            if !self.predicates.contains(name) {
                return Err(AssetError::validation(
                    &prop.tag,
                    format!("unknown predicate '{}'", name),
                ));
            }
        }

        if let Some(default) = &prop.default_value {
            if !catalog.contains(owner_tag) && prop.reference_target().as_deref() == Some(owner_tag) {
                return Ok(());
            }
            self.coerce(catalog, &prop.kind(), default, &prop.tag)?;
        }

        Ok(())
    }

    fn check_data_type(
        &self,
        catalog: &SchemaCatalog,
        owner_tag: &str,
        kind: &DataTypeKind,
        field: &str,
    ) -> AssetResult<()> {
        match kind {
            DataTypeKind::Named(name) => self.data_types.resolve(name).map(|_| ()),
            DataTypeKind::List(element) => self.check_data_type(catalog, owner_tag, element, field),
            DataTypeKind::Reference(target) if target == owner_tag || catalog.contains(target) => {
                Ok(())
            }
            DataTypeKind::Reference(target) => Err(AssetError::not_found(format!(
                "asset type '{}' referenced by property '{}'",
                target, field
            ))),
        }
    }
}
