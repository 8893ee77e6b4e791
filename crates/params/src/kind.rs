use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::DefinitionError;

/// The declared type of a parameter.
///
/// A closed set: every kind shares the same capability surface (type check,
/// cast, name), so the pipeline never dispatches on open-ended trait objects
/// for typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    /// Every parameter type, in documentation order.
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Integer,
        Self::Number,
        Self::Boolean,
        Self::Array,
        Self::Object,
    ];

    /// The OpenAPI type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Whether the value already has this type's native shape.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            (Self::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Converts a foreign value into this type, if a conversion exists.
    ///
    /// Values that are already accepted are returned unchanged. `null` never
    /// casts.
    #[must_use]
    pub fn cast(&self, value: &Value) -> Option<Value> {
        if self.accepts(value) {
            return Some(value.clone());
        }

        match (self, value) {
            (_, Value::Null) => None,
            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::Integer, Value::String(s)) => cast_integer_str(s.trim()),
            (Self::Integer, Value::Number(n)) => n.as_f64().and_then(truncate),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            (Self::Boolean, Value::Number(n)) => match n.as_f64() {
                Some(v) if v == 1.0 => Some(Value::Bool(true)),
                Some(v) if v == 0.0 => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Some(Value::Bool(true)),
                "0" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Array, other) => Some(Value::Array(vec![other.clone()])),
            (Self::Object, Value::Array(items)) => Some(Value::Object(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect::<Map<String, Value>>(),
            )),
            _ => None,
        }
    }
}

fn cast_integer_str(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::from(u));
    }
    s.parse::<f64>().ok().and_then(truncate)
}

/// 2^63; `i64::MAX as f64` rounds up to this, so the upper bound is exclusive.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn truncate(f: f64) -> Option<Value> {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < I64_UPPER {
        Some(Value::from(t as i64))
    } else {
        None
    }
}

/// Name of the native JSON type of a value, as used in type mismatch messages.
#[must_use]
pub fn native_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterType {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DefinitionError::UnknownType { name: s.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn accepts_native_shapes() {
        assert!(ParameterType::String.accepts(&json!("x")));
        assert!(ParameterType::Integer.accepts(&json!(12)));
        assert!(!ParameterType::Integer.accepts(&json!(12.5)));
        assert!(ParameterType::Number.accepts(&json!(12)));
        assert!(ParameterType::Number.accepts(&json!(12.5)));
        assert!(ParameterType::Boolean.accepts(&json!(false)));
        assert!(ParameterType::Array.accepts(&json!([])));
        assert!(ParameterType::Object.accepts(&json!({})));
        assert!(!ParameterType::String.accepts(&json!(null)));
    }

    #[test]
    fn integer_casts_truncate() {
        let ty = ParameterType::Integer;
        assert_eq!(ty.cast(&json!("29")), Some(json!(29)));
        assert_eq!(ty.cast(&json!("34.5")), Some(json!(34)));
        assert_eq!(ty.cast(&json!(52.0)), Some(json!(52)));
        assert_eq!(ty.cast(&json!(-194.3)), Some(json!(-194)));
        assert_eq!(ty.cast(&json!("abc")), None);
        assert_eq!(ty.cast(&json!(true)), None);
    }

    #[test]
    fn integer_cast_at_the_i64_boundary() {
        let ty = ParameterType::Integer;
        assert_eq!(ty.cast(&json!("9223372036854775807")), Some(json!(i64::MAX)));
        assert_eq!(ty.cast(&json!("9223372036854775808")), Some(json!(9_223_372_036_854_775_808_u64)));
        assert_eq!(ty.cast(&json!("18446744073709551615")), Some(json!(u64::MAX)));
        assert_eq!(ty.cast(&json!("18446744073709551616")), None);
        assert_eq!(ty.cast(&json!(9.223_372_036_854_775_808e18)), None);
        assert_eq!(ty.cast(&json!("-9223372036854775808.5")), Some(json!(i64::MIN)));
    }

    #[test]
    fn number_casts_from_strings() {
        assert_eq!(ParameterType::Number.cast(&json!("25.2")), Some(json!(25.2)));
        assert_eq!(ParameterType::Number.cast(&json!("NaN")), None);
    }

    #[test]
    fn boolean_casts() {
        let ty = ParameterType::Boolean;
        assert_eq!(ty.cast(&json!(1)), Some(json!(true)));
        assert_eq!(ty.cast(&json!("0")), Some(json!(false)));
        assert_eq!(ty.cast(&json!("TRUE")), Some(json!(true)));
        assert_eq!(ty.cast(&json!(2)), None);
        assert_eq!(ty.cast(&json!("yes")), None);
    }

    #[test]
    fn string_casts_scalars() {
        assert_eq!(ParameterType::String.cast(&json!(35)), Some(json!("35")));
        assert_eq!(ParameterType::String.cast(&json!(false)), Some(json!("false")));
        assert_eq!(ParameterType::String.cast(&json!([1])), None);
    }

    #[test]
    fn array_wraps_scalars() {
        let ty = ParameterType::Array;
        for value in [json!("a"), json!(1), json!(35.0), json!(true)] {
            assert_eq!(ty.cast(&value), Some(json!([value.clone()])));
        }
        assert_eq!(ty.cast(&json!(null)), None);
    }

    #[test]
    fn object_rekeys_arrays() {
        assert_eq!(
            ParameterType::Object.cast(&json!(["a", "b"])),
            Some(json!({"0": "a", "1": "b"}))
        );
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("Integer".parse::<ParameterType>(), Ok(ParameterType::Integer));
        assert_eq!(
            "xx".parse::<ParameterType>(),
            Err(DefinitionError::UnknownType { name: "xx".into() })
        );
    }

    #[test]
    fn native_type_names() {
        assert_eq!(native_type_name(&json!(1)), "integer");
        assert_eq!(native_type_name(&json!(1.5)), "number");
        assert_eq!(native_type_name(&json!(null)), "null");
        assert_eq!(native_type_name(&json!({"a": 1})), "object");
    }
}
