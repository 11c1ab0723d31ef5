//! Built-in data types

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::{DataType, Parsed};

pub const STRING: &str = "string";
pub const NUMBER: &str = "number";
pub const INTEGER: &str = "integer";
pub const BOOLEAN: &str = "boolean";
pub const DATETIME: &str = "datetime";
pub const OBJECT: &str = "@object";

/// Any JSON string, stored as-is.
pub struct StringType;

impl DataType for StringType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        match raw {
            Value::String(s) => Ok(Parsed::new(raw.clone(), s.clone())),
            other => Err(format!("expected a string, got {}", json_type_name(other))),
        }
    }
}

/// 64-bit float. Numeric strings are accepted.
pub struct NumberType;

impl DataType for NumberType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        let n = match raw {
            Value::Number(n) => n.as_f64().ok_or("number out of range")?,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", s))?,
            other => return Err(format!("expected a number, got {}", json_type_name(other))),
        };
        let normalized = serde_json::Number::from_f64(n)
            .map(Value::Number)
            .ok_or_else(|| format!("{} is not a finite number", n))?;
        Ok(Parsed::new(normalized, n.to_string()))
    }
}

/// Signed 64-bit integer. Integral floats and numeric strings are accepted.
pub struct IntegerType;

impl DataType for IntegerType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        let n = match raw {
            Value::Number(n) => match n.as_i64() {
                Some(i) => i,
                None => integral(n.as_f64())?,
            },
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(i) => i,
                    Err(_) => integral(s.parse::<f64>().ok())?,
                }
            }
            other => return Err(format!("expected an integer, got {}", json_type_name(other))),
        };
        Ok(Parsed::new(Value::from(n), n.to_string()))
    }
}

fn integral(f: Option<f64>) -> Result<i64, String> {
    match f {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err("expected an integer".to_string()),
    }
}

/// `true`/`false`, or their string forms.
pub struct BooleanType;

impl DataType for BooleanType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        let b = match raw {
            Value::Bool(b) => *b,
            Value::String(s) if s == "true" => true,
            Value::String(s) if s == "false" => false,
            other => return Err(format!("expected a boolean, got {}", json_type_name(other))),
        };
        Ok(Parsed::new(Value::Bool(b), b.to_string()))
    }
}

/// RFC 3339 timestamp, normalized to UTC.
pub struct DateTimeType;

impl DataType for DateTimeType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        let s = raw
            .as_str()
            .ok_or_else(|| format!("expected an RFC 3339 string, got {}", json_type_name(raw)))?;
        let ts = DateTime::parse_from_rfc3339(s)
            .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", s, e))?
            .with_timezone(&Utc);
        let text = ts.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        Ok(Parsed::new(Value::String(text.clone()), text))
    }
}

/// Arbitrary JSON object. Indexed by its compact serialization.
pub struct ObjectType;

impl DataType for ObjectType {
    fn parse(&self, raw: &Value) -> Result<Parsed, String> {
        if !raw.is_object() {
            return Err(format!("expected an object, got {}", json_type_name(raw)));
        }
        let indexable = serde_json::to_string(raw).map_err(|e| e.to_string())?;
        Ok(Parsed::new(raw.clone(), indexable))
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_rejects_numbers() {
        assert!(StringType.parse(&json!(12)).is_err());
        assert_eq!(StringType.parse(&json!("Maria")).unwrap().indexable, "Maria");
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let parsed = NumberType.parse(&json!("4.5")).unwrap();
        assert_eq!(parsed.normalized, json!(4.5));
        assert_eq!(parsed.indexable, "4.5");
        assert_eq!(NumberType.parse(&json!(0)).unwrap().indexable, "0");
        assert!(NumberType.parse(&json!("four")).is_err());
        assert!(NumberType.parse(&json!("NaN")).is_err());
    }

    #[test]
    fn test_integer_rejects_fractions() {
        assert_eq!(IntegerType.parse(&json!(7)).unwrap().normalized, json!(7));
        assert_eq!(IntegerType.parse(&json!(7.0)).unwrap().normalized, json!(7));
        assert_eq!(IntegerType.parse(&json!("-3")).unwrap().indexable, "-3");
        assert!(IntegerType.parse(&json!(7.5)).is_err());
    }

    #[test]
    fn test_boolean_string_forms() {
        assert_eq!(BooleanType.parse(&json!("true")).unwrap().normalized, json!(true));
        assert!(BooleanType.parse(&json!("yes")).is_err());
    }

    #[test]
    fn test_datetime_normalized_to_utc() {
        let parsed = DateTimeType.parse(&json!("2023-05-01T12:00:00-03:00")).unwrap();
        assert_eq!(parsed.normalized, json!("2023-05-01T15:00:00Z"));
        assert!(DateTimeType.parse(&json!("yesterday")).is_err());
    }

    #[test]
    fn test_object_indexed_compactly() {
        let parsed = ObjectType.parse(&json!({"a": 1})).unwrap();
        assert_eq!(parsed.indexable, r#"{"a":1}"#);
        assert!(ObjectType.parse(&json!([1])).is_err());
    }
}
