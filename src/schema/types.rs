//! Asset type definitions
//!
//! Data type expressions:
//! - `string`, `number`, `integer`, `boolean`, `datetime`, `@object`
//! - any registered custom type name (e.g. `cpf`)
//! - `[]<expr>`: homogeneous list of `<expr>`
//! - `-><tag>`: relationship reference to an instance of asset type `<tag>`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::acl::GroupSet;

/// Prefix of list type expressions
pub const LIST_PREFIX: &str = "[]";
/// Prefix of relationship reference expressions
pub const REFERENCE_PREFIX: &str = "->";

/// Parsed form of a `dataType` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTypeKind {
    /// Built-in or custom type resolved through the data type registry
    Named(String),
    /// Reference to an instance of another asset type
    Reference(String),
    /// Element-wise list
    List(Box<DataTypeKind>),
}

impl DataTypeKind {
    pub fn parse(expr: &str) -> Self {
        if let Some(element) = expr.strip_prefix(LIST_PREFIX) {
            Self::List(Box::new(Self::parse(element)))
        } else if let Some(target) = expr.strip_prefix(REFERENCE_PREFIX) {
            Self::Reference(target.to_string())
        } else {
            Self::Named(expr.to_string())
        }
    }

    /// Target asset type of a (possibly listed) relationship.
    pub fn reference_target(&self) -> Option<&str> {
        match self {
            Self::Named(_) => None,
            Self::Reference(target) => Some(target),
            Self::List(element) => element.reference_target(),
        }
    }
}

/// A field of an asset type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProp {
    /// Unique within the owning type
    pub tag: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Type expression, see module docs
    pub data_type: String,
    /// Value must be present and non-empty on write
    #[serde(default)]
    pub required: bool,
    /// Participates in composite key derivation; implies `required`
    #[serde(default)]
    pub is_key: bool,
    /// Substituted when the value is absent and the property is optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Groups allowed to set this property; empty = anyone
    #[serde(default, skip_serializing_if = "GroupSet::is_empty")]
    pub writers: GroupSet,
    /// Name of a registered predicate run on the coerced value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,
}

impl AssetProp {
    pub fn new(tag: impl Into<String>, label: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            description: String::new(),
            data_type: data_type.into(),
            required: false,
            is_key: false,
            default_value: None,
            writers: GroupSet::default(),
            validate: None,
        }
    }

    pub fn kind(&self) -> DataTypeKind {
        DataTypeKind::parse(&self.data_type)
    }

    /// Whether a value must be supplied on every write.
    pub fn is_mandatory(&self) -> bool {
        self.required || self.is_key
    }

    pub fn reference_target(&self) -> Option<String> {
        self.kind().reference_target().map(str::to_string)
    }
}

/// A named schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetType {
    /// Globally unique identifier
    pub tag: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Only dynamic types may be updated or deleted at runtime
    #[serde(default)]
    pub dynamic: bool,
    /// Groups allowed to read instances; empty = anyone
    #[serde(default, skip_serializing_if = "GroupSet::is_empty")]
    pub readers: GroupSet,
    /// Ordered; key properties form the instance key in this order
    pub props: Vec<AssetProp>,
}

impl AssetType {
    pub fn new(tag: impl Into<String>, label: impl Into<String>, props: Vec<AssetProp>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            description: String::new(),
            dynamic: false,
            readers: GroupSet::default(),
            props,
        }
    }

    pub fn find_prop(&self, tag: &str) -> Option<&AssetProp> {
        self.props.iter().find(|p| p.tag == tag)
    }

    pub fn has_prop(&self, tag: &str) -> bool {
        self.find_prop(tag).is_some()
    }

    /// Key properties in declared order.
    pub fn key_props(&self) -> impl Iterator<Item = &AssetProp> {
        self.props.iter().filter(|p| p.is_key)
    }

    /// First property referencing `target`, if any.
    pub fn reference_to(&self, target: &str) -> Option<&AssetProp> {
        self.props
            .iter()
            .find(|p| p.reference_target().as_deref() == Some(target))
    }
}
