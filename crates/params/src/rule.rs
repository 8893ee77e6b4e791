//! Validation rules.
//!
//! A [`ValidationRule`] is a predicate over a value plus the message reported
//! when the predicate fails. Rules may also look at the other values of the
//! same invocation through [`ParameterValues`], which is how cross-field
//! checks such as "must equal `password`" are expressed.
//!
//! Rules run after type checking, so each built-in constructor only inspects
//! values of the shape it was written for and passes everything else.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::values::ParameterValues;

static UNIX_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/([\w\s/]+)$").unwrap());
static RELATIVE_UNIX_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w\s/]+$").unwrap());

type Predicate = dyn Fn(&Value, &ParameterValues<'_>) -> bool + Send + Sync;

/// A named check applied to a type-checked value.
#[derive(Clone)]
pub struct ValidationRule {
    message: Cow<'static, str>,
    predicate: Arc<Predicate>,
    documentation: Option<(Cow<'static, str>, Value)>,
}

impl ValidationRule {
    /// A rule over the value alone.
    pub fn new<F>(message: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::with_values(message, move |value, _| predicate(value))
    }

    /// A rule that can also read other parameters of the same invocation.
    pub fn with_values<F>(message: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&Value, &ParameterValues<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            predicate: Arc::new(predicate),
            documentation: None,
        }
    }

    /// Attaches an OpenAPI schema keyword this rule corresponds to.
    #[must_use]
    pub fn documented(mut self, keyword: impl Into<Cow<'static, str>>, value: Value) -> Self {
        self.documentation = Some((keyword.into(), value));
        self
    }

    /// Replaces the failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Runs the predicate.
    #[must_use]
    pub fn check(&self, value: &Value, values: &ParameterValues<'_>) -> bool {
        (self.predicate)(value, values)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The schema keyword and value, if this rule has one.
    #[must_use]
    pub fn documentation(&self) -> Option<(&str, &Value)> {
        self.documentation.as_ref().map(|(k, v)| (k.as_ref(), v))
    }

    // ── strings ────────────────────────────────────────────────────────────

    /// String must have at least `length` characters.
    #[must_use]
    pub fn min_length(length: usize) -> Self {
        Self::new(
            format!("value must be at least {length} characters long"),
            move |v| v.as_str().is_none_or(|s| s.chars().count() >= length),
        )
        .documented("minLength", Value::from(length))
    }

    /// String must have at most `length` characters.
    #[must_use]
    pub fn max_length(length: usize) -> Self {
        Self::new(
            format!("value must be at most {length} characters long"),
            move |v| v.as_str().is_none_or(|s| s.chars().count() <= length),
        )
        .documented("maxLength", Value::from(length))
    }

    /// String must match a regular expression.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self::matching(regex))
    }

    /// String must match an already compiled expression.
    #[must_use]
    pub fn matching(regex: Regex) -> Self {
        let source = regex.as_str().to_owned();
        Self::new(format!("value must match pattern: {source}"), move |v| {
            v.as_str().is_none_or(|s| regex.is_match(s))
        })
        .documented("pattern", Value::String(source))
    }

    /// String must be a UNIX path; absolute unless `allow_relative` is set.
    #[must_use]
    pub fn unix_path(allow_relative: bool) -> Self {
        let regex = if allow_relative {
            &RELATIVE_UNIX_PATH
        } else {
            &UNIX_PATH
        };
        Self::new("value must be a valid UNIX path", move |v| {
            v.as_str().is_none_or(|s| regex.is_match(s))
        })
    }

    // ── numbers ────────────────────────────────────────────────────────────

    /// Number must be at least `bound` (or strictly above it).
    #[must_use]
    pub fn minimum(bound: f64, exclusive: bool) -> Self {
        let message = if exclusive {
            format!("value must be greater than {bound}")
        } else {
            format!("value must be greater than or equal to {bound}")
        };
        Self::new(message, move |v| {
            v.as_f64()
                .is_none_or(|n| if exclusive { n > bound } else { n >= bound })
        })
        .documented("minimum", number(bound))
    }

    /// Number must be at most `bound` (or strictly below it).
    #[must_use]
    pub fn maximum(bound: f64, exclusive: bool) -> Self {
        let message = if exclusive {
            format!("value must be less than {bound}")
        } else {
            format!("value must be less than or equal to {bound}")
        };
        Self::new(message, move |v| {
            v.as_f64()
                .is_none_or(|n| if exclusive { n < bound } else { n <= bound })
        })
        .documented("maximum", number(bound))
    }

    /// Number must divide evenly by `factor`.
    #[must_use]
    pub fn multiple_of(factor: f64) -> Self {
        Self::new(format!("value must be a multiple of {factor}"), move |v| {
            v.as_f64().is_none_or(|n| {
                let ratio = n / factor;
                (ratio - ratio.round()).abs() < 1e-9
            })
        })
        .documented("multipleOf", number(factor))
    }

    // ── arrays ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn min_items(count: usize) -> Self {
        Self::new(format!("value must contain at least {count} items"), move |v| {
            v.as_array().is_none_or(|a| a.len() >= count)
        })
        .documented("minItems", Value::from(count))
    }

    #[must_use]
    pub fn max_items(count: usize) -> Self {
        Self::new(format!("value must contain at most {count} items"), move |v| {
            v.as_array().is_none_or(|a| a.len() <= count)
        })
        .documented("maxItems", Value::from(count))
    }

    /// Array elements must be pairwise distinct.
    #[must_use]
    pub fn unique_items() -> Self {
        Self::new("value must contain only unique items", |v| {
            v.as_array().is_none_or(|items| {
                // Value equality ignores object key order; its text form does not.
                items
                    .iter()
                    .enumerate()
                    .all(|(i, item)| !items[i + 1..].contains(item))
            })
        })
        .documented("uniqueItems", Value::Bool(true))
    }

    // ── objects ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn min_properties(count: usize) -> Self {
        Self::new(
            format!("value must contain at least {count} properties"),
            move |v| v.as_object().is_none_or(|o| o.len() >= count),
        )
        .documented("minProperties", Value::from(count))
    }

    #[must_use]
    pub fn max_properties(count: usize) -> Self {
        Self::new(
            format!("value must contain at most {count} properties"),
            move |v| v.as_object().is_none_or(|o| o.len() <= count),
        )
        .documented("maxProperties", Value::from(count))
    }

    // ── cross-field ────────────────────────────────────────────────────────

    /// Value must equal the prepared value of another parameter.
    ///
    /// Passes when the other parameter has no prepared value; its own
    /// definition reports why.
    #[must_use]
    pub fn equals_field(other: impl Into<String>) -> Self {
        let other = other.into();
        Self::with_values(format!("value must match `{other}`"), move |v, values| {
            values.prepared(&other).is_none_or(|o| &o == v)
        })
    }
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("message", &self.message)
            .field("documentation", &self.documentation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ParameterValuesContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn empty() -> ParameterValues<'static> {
        ParameterValues::new(
            std::iter::empty::<(String, Value)>(),
            ParameterValuesContext::default(),
        )
    }

    #[test]
    fn length_counts_characters() {
        let values = empty();
        let rule = ValidationRule::min_length(3);
        assert!(rule.check(&json!("héé"), &values));
        assert!(!rule.check(&json!("hé"), &values));
        assert_eq!(rule.message(), "value must be at least 3 characters long");
        assert_eq!(rule.documentation(), Some(("minLength", &json!(3))));

        assert!(!ValidationRule::max_length(2).check(&json!("abc"), &values));
    }

    #[test]
    fn rules_pass_foreign_shapes() {
        let values = empty();
        assert!(ValidationRule::min_length(3).check(&json!(1), &values));
        assert!(ValidationRule::minimum(3.0, false).check(&json!("a"), &values));
        assert!(ValidationRule::min_items(3).check(&json!({}), &values));
    }

    #[test]
    fn pattern_compiles_or_fails() {
        let values = empty();
        let rule = ValidationRule::pattern("^[a-z]+$").unwrap();
        assert!(rule.check(&json!("abc"), &values));
        assert!(!rule.check(&json!("abc1"), &values));
        assert!(ValidationRule::pattern("([").is_err());
    }

    #[test]
    fn numeric_bounds() {
        let values = empty();
        assert!(ValidationRule::minimum(18.0, false).check(&json!(18), &values));
        assert!(!ValidationRule::minimum(18.0, true).check(&json!(18), &values));
        assert!(ValidationRule::maximum(1.5, false).check(&json!(1.5), &values));
        assert!(!ValidationRule::maximum(1.5, true).check(&json!(1.5), &values));
        assert_eq!(
            ValidationRule::minimum(18.0, false).documentation(),
            Some(("minimum", &json!(18)))
        );
    }

    #[test]
    fn multiple_of_tolerates_float_noise() {
        let values = empty();
        let rule = ValidationRule::multiple_of(0.1);
        assert!(rule.check(&json!(0.3), &values));
        assert!(!rule.check(&json!(0.35), &values));
        assert!(ValidationRule::multiple_of(5.0).check(&json!(25), &values));
    }

    #[test]
    fn unique_items_compares_structurally() {
        let values = empty();
        let rule = ValidationRule::unique_items();
        assert!(rule.check(&json!(["a", "b", 1]), &values));
        assert!(!rule.check(&json!([{"a": 1}, {"a": 1}]), &values));
        assert!(!rule.check(&json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}]), &values));
        assert!(rule.check(&json!([{"a": 1, "b": 2}, {"a": 2, "b": 1}]), &values));
    }

    #[test]
    fn item_and_property_counts() {
        let values = empty();
        assert!(!ValidationRule::min_items(2).check(&json!([1]), &values));
        assert!(!ValidationRule::max_items(1).check(&json!([1, 2]), &values));
        assert!(!ValidationRule::min_properties(1).check(&json!({}), &values));
        assert!(!ValidationRule::max_properties(1).check(&json!({"a": 1, "b": 2}), &values));
    }

    #[test]
    fn unix_paths() {
        let values = empty();
        let absolute = ValidationRule::unix_path(false);
        assert!(absolute.check(&json!("/var/log/app"), &values));
        assert!(!absolute.check(&json!("var/log"), &values));
        assert!(!absolute.check(&json!("/var/log;rm"), &values));

        let relative = ValidationRule::unix_path(true);
        assert!(relative.check(&json!("var/log"), &values));
    }

    #[test]
    fn custom_message_and_debug() {
        let rule = ValidationRule::new("must be even", |v| v.as_i64().is_some_and(|n| n % 2 == 0))
            .with_message("even numbers only");
        assert_eq!(rule.message(), "even numbers only");
        assert!(format!("{rule:?}").contains("even numbers only"));
    }
}
