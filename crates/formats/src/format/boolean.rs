use std::sync::Arc;

use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use openparams::step::PreparationStep;
use serde_json::Value;

use super::{string_rule, string_step};
use crate::error::FormatError;

const TRUTHY: [&str; 4] = ["yes", "on", "true", "1"];
const FALSY: [&str; 4] = ["no", "off", "false", "0"];

fn parse_yes_no(raw: &str) -> Option<bool> {
    let word = raw.trim();
    if TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(word)) {
        Some(true)
    } else if FALSY.iter().any(|f| f.eq_ignore_ascii_case(word)) {
        Some(false)
    } else {
        None
    }
}

/// `string` / `yes-no`: a switch word, prepared as a boolean.
///
/// Accepts `yes`, `no`, `on`, `off`, `true`, `false`, `1` and `0` in any case.
#[derive(Debug, Clone, Copy, Default)]
pub struct YesNoFormat;

impl Format for YesNoFormat {
    fn name(&self) -> &str {
        "yes-no"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![string_rule(
            "value must be one of: yes, no, on, off, true, false, 1, 0",
            |s| parse_yes_no(s).is_some(),
        )]
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        vec![string_step("convert to boolean", |s| {
            parse_yes_no(s)
                .map(Value::Bool)
                .ok_or_else(|| FormatError::NotYesNo(s.to_owned()).into())
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a yes/no switch (yes, no, on, off, true, false, 1, 0).".to_owned())
    }
}
