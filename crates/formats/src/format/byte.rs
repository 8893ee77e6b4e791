use std::sync::{Arc, LazyLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use openparams::step::PreparationStep;
use regex::Regex;
use serde_json::Value;

use super::{string_rule, string_step};
use crate::error::FormatError;

static BASE64_ALPHABET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").unwrap());

/// `string` / `byte`: base64-encoded text, decoded during preparation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteFormat;

/// Strict base64: the alphabet matches, the text decodes to something, and
/// re-encoding gives back exactly the input.
fn is_base64(value: &str) -> bool {
    if !BASE64_ALPHABET.is_match(value) {
        return false;
    }
    match STANDARD.decode(value) {
        Ok(decoded) if !decoded.is_empty() => STANDARD.encode(decoded) == value,
        _ => false,
    }
}

impl Format for ByteFormat {
    fn name(&self) -> &str {
        "byte"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![string_rule("value must be base64-encoded", is_base64)]
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        vec![string_step("base64 decode the value", |s| {
            let bytes = STANDARD.decode(s).map_err(FormatError::from)?;
            let text = String::from_utf8(bytes).map_err(FormatError::from)?;
            Ok(Value::String(text))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a base64-encoded string.".to_owned())
    }
}
