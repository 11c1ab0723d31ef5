//! Argument checks for decoded operation input

use serde_json::{Map, Value};

use crate::datatype::json_type_name;
use crate::errors::{AssetError, AssetResult};

/// Primitive JSON kinds an argument can be required to have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Object,
    List,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "boolean",
            Self::Object => "object",
            Self::List => "list",
        }
    }

    fn admits(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::List => value.is_array(),
        }
    }
}

/// Null, empty string and empty list count as absent.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Type-checks a decoded value.
///
/// Absent values fail only when `required`. A present value of the wrong
/// kind always fails.
pub fn check_value<'v>(
    raw: Option<&'v Value>,
    required: bool,
    kind: ValueKind,
    field: &str,
) -> AssetResult<Option<&'v Value>> {
    match raw {
        None | Some(Value::Null) if required => {
            Err(AssetError::validation(field, "required argument is missing"))
        }
        None | Some(Value::Null) => Ok(None),
        Some(value) if kind.admits(value) => Ok(Some(value)),
        Some(value) => Err(AssetError::validation(
            field,
            format!("expected a {}, got {}", kind.name(), json_type_name(value)),
        )),
    }
}

pub fn check_string<'v>(
    args: &'v Map<String, Value>,
    field: &str,
    required: bool,
) -> AssetResult<Option<&'v str>> {
    Ok(check_value(args.get(field), required, ValueKind::String, field)?.and_then(Value::as_str))
}

/// Like `check_string` with `required`, returning the string directly.
pub fn require_string<'v>(args: &'v Map<String, Value>, field: &str) -> AssetResult<&'v str> {
    check_string(args, field, true)?
        .ok_or_else(|| AssetError::validation(field, "required argument is missing"))
}

pub fn check_bool(args: &Map<String, Value>, field: &str, required: bool) -> AssetResult<Option<bool>> {
    Ok(check_value(args.get(field), required, ValueKind::Bool, field)?.and_then(Value::as_bool))
}

pub fn check_list<'v>(
    args: &'v Map<String, Value>,
    field: &str,
    required: bool,
) -> AssetResult<Option<&'v Vec<Value>>> {
    Ok(check_value(args.get(field), required, ValueKind::List, field)?.and_then(Value::as_array))
}

/// Requires the whole argument payload to be an object.
pub fn check_object<'v>(raw: &'v Value, field: &str) -> AssetResult<&'v Map<String, Value>> {
    raw.as_object().ok_or_else(|| {
        AssetError::validation(field, format!("expected an object, got {}", json_type_name(raw)))
    })
}
