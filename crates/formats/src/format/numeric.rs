//! Width formats for `integer` and `number`.
//!
//! These only narrow the accepted range; prepared values keep their JSON
//! representation.

use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use serde_json::Number;

fn number_rule<F>(message: &'static str, check: F) -> ValidationRule
where
    F: Fn(&Number) -> bool + Send + Sync + 'static,
{
    ValidationRule::new(message, move |value| value.as_number().is_none_or(|n| check(n)))
}

/// `integer` / `int32`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int32Format;

impl Format for Int32Format {
    fn name(&self) -> &str {
        "int32"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::Integer
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![number_rule("value must be a signed 32-bit integer", |n| {
            n.as_i64().is_some_and(|i| i32::try_from(i).is_ok())
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a signed 32-bit integer.".to_owned())
    }
}

/// `integer` / `int64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int64Format;

impl Format for Int64Format {
    fn name(&self) -> &str {
        "int64"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::Integer
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![number_rule("value must be a signed 64-bit integer", |n| n.as_i64().is_some())]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a signed 64-bit integer.".to_owned())
    }
}

/// `number` / `float`: must fit a single-precision float.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatFormat;

impl Format for FloatFormat {
    fn name(&self) -> &str {
        "float"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::Number
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![number_rule("value must fit a 32-bit float", |n| {
            n.as_f64().is_some_and(|f| f.abs() <= f64::from(f32::MAX))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a single-precision floating point number.".to_owned())
    }
}

/// `number` / `double`. JSON numbers already are doubles, so this only
/// documents the intent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleFormat;

impl Format for DoubleFormat {
    fn name(&self) -> &str {
        "double"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::Number
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a double-precision floating point number.".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::testing::{messages, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn int32_range() {
        assert_eq!(prepare(Int32Format, json!(i32::MAX)).unwrap(), json!(i32::MAX));
        let err = prepare(Int32Format, json!(i64::from(i32::MAX) + 1)).unwrap_err();
        assert_eq!(messages(&err), vec!["value must be a signed 32-bit integer"]);
    }

    #[test]
    fn int64_rejects_large_unsigned() {
        assert!(prepare(Int64Format, json!(i64::MIN)).is_ok());
        assert!(prepare(Int64Format, json!(u64::MAX)).is_err());
    }

    #[test]
    fn float_range() {
        assert_eq!(prepare(FloatFormat, json!(25.2)).unwrap(), json!(25.2));
        assert!(prepare(FloatFormat, json!(1e39)).is_err());
        assert!(prepare(DoubleFormat, json!(1e39)).is_ok());
    }
}
