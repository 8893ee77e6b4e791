//! String formats without a dedicated module.

use std::sync::Arc;

use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use openparams::step::PreparationStep;
use serde_json::Value;
use uuid::Uuid;

use super::{string_rule, string_step};
use crate::error::FormatError;

/// `string` / `binary`: arbitrary octets, passed through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFormat;

impl Format for BinaryFormat {
    fn name(&self) -> &str {
        "binary"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn documentation(&self) -> Option<String> {
        Some("Value is binary data.".to_owned())
    }
}

/// `string` / `password`: an opaque secret. Never logged in clear text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordFormat;

impl Format for PasswordFormat {
    fn name(&self) -> &str {
        "password"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn is_sensitive(&self) -> bool {
        true
    }
}

/// `string` / `uuid`, rewritten in lower-case hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidFormat;

impl Format for UuidFormat {
    fn name(&self) -> &str {
        "uuid"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![string_rule("value must be a valid UUID", |s| Uuid::parse_str(s).is_ok())]
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        vec![string_step("normalize UUID", |s| {
            let uuid = Uuid::parse_str(s).map_err(FormatError::from)?;
            Ok(Value::String(uuid.hyphenated().to_string()))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a UUID.".to_owned())
    }
}

/// `string` / `alphanumeric`: ASCII letters and digits, plus any extra
/// characters the format was built with.
#[derive(Debug, Clone, Default)]
pub struct AlphanumericFormat {
    extra: String,
}

impl AlphanumericFormat {
    /// Also accepts each character of `extra`, e.g. `"-_"` for slugs.
    pub fn with_extra_chars(extra: impl Into<String>) -> Self {
        Self {
            extra: extra.into(),
        }
    }

    #[must_use]
    pub fn extra_chars(&self) -> &str {
        &self.extra
    }

    fn accepts(&self, value: &str) -> bool {
        value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || self.extra.contains(c))
    }
}

impl Format for AlphanumericFormat {
    fn name(&self) -> &str {
        "alphanumeric"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        let format = self.clone();
        let message = if self.extra.is_empty() {
            "value must contain only letters and digits".to_owned()
        } else {
            format!("value must contain only letters, digits and `{}`", self.extra)
        };
        vec![ValidationRule::new(message, move |value| {
            value.as_str().is_none_or(|s| format.accepts(s))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some(if self.extra.is_empty() {
            "Value must be alphanumeric.".to_owned()
        } else {
            format!("Value must be alphanumeric (also allowed: `{}`).", self.extra)
        })
    }
}

/// `string` / `csv`: a delimited list, prepared as an array of trimmed
/// strings. The empty string becomes the empty array.
#[derive(Debug, Clone, Copy)]
pub struct CsvFormat {
    separator: char,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self { separator: ',' }
    }
}

impl CsvFormat {
    #[must_use]
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }
}

/// Splits `raw` on `separator` and trims each item.
pub(crate) fn split_list(raw: &str, separator: char) -> Vec<Value> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(separator)
        .map(|item| Value::String(item.trim().to_owned()))
        .collect()
}

impl Format for CsvFormat {
    fn name(&self) -> &str {
        "csv"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        let separator = self.separator;
        vec![string_step("split delimited list", move |s| {
            Ok(Value::Array(split_list(s, separator)))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some(format!("Value must be a `{}`-separated list.", self.separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::testing::{messages, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn binary_passes_through() {
        assert_eq!(prepare(BinaryFormat, json!("011011")).unwrap(), json!("011011"));
    }

    #[test]
    fn password_is_sensitive() {
        assert!(PasswordFormat.is_sensitive());
        assert_eq!(prepare(PasswordFormat, json!("hunter2")).unwrap(), json!("hunter2"));
    }

    #[test]
    fn uuid_is_lower_cased() {
        let id = "e0959969-28d9-4572-9bf6-f970e4e9696e";
        assert_eq!(prepare(UuidFormat, json!(id)).unwrap(), json!(id));
        assert_eq!(
            prepare(UuidFormat, json!("E0959969-28D9-4572-9BF6-F970E4E9696E")).unwrap(),
            json!(id)
        );
        assert_eq!(
            prepare(UuidFormat, json!("e095996928d945729bf6f970e4e9696e")).unwrap(),
            json!(id)
        );
    }

    #[test]
    fn uuid_rejects_garbage() {
        let err = prepare(UuidFormat, json!("not-a-uuid")).unwrap_err();
        assert_eq!(messages(&err), vec!["value must be a valid UUID"]);
    }

    #[test]
    fn alphanumeric() {
        assert_eq!(
            prepare(AlphanumericFormat::default(), json!("abc123")).unwrap(),
            json!("abc123")
        );
        let err = prepare(AlphanumericFormat::default(), json!("abc-123")).unwrap_err();
        assert_eq!(messages(&err), vec!["value must contain only letters and digits"]);

        let slug = AlphanumericFormat::with_extra_chars("-_");
        assert_eq!(prepare(slug.clone(), json!("abc-1_2")).unwrap(), json!("abc-1_2"));
        let err = prepare(slug, json!("abc 1")).unwrap_err();
        assert_eq!(messages(&err), vec!["value must contain only letters, digits and `-_`"]);
    }

    #[test]
    fn csv_splits_and_trims() {
        assert_eq!(prepare(CsvFormat::default(), json!("a,b,c")).unwrap(), json!(["a", "b", "c"]));
        assert_eq!(prepare(CsvFormat::default(), json!(" a , b ")).unwrap(), json!(["a", "b"]));
        assert_eq!(prepare(CsvFormat::default(), json!("")).unwrap(), json!([]));
        assert_eq!(
            prepare(CsvFormat::with_separator('|'), json!("a|b,c")).unwrap(),
            json!(["a", "b,c"])
        );
    }
}
