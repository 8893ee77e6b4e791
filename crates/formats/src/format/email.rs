use std::sync::LazyLock;

use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use regex::Regex;

use super::string_rule;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

const LOCAL_PART_MAX: usize = 64;

/// Checks the part of an address before the `@` as an RFC 5322 dot-atom:
/// at most 64 characters, no leading, trailing or doubled dots.
#[must_use]
pub fn valid_email_local_part(local: &str) -> bool {
    !local.is_empty()
        && local.len() <= LOCAL_PART_MAX
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-.".contains(c))
}

/// `string` / `email`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailFormat;

impl Format for EmailFormat {
    fn name(&self) -> &str {
        "email"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![
            string_rule("value must be a valid email address", |s| EMAIL_REGEX.is_match(s)),
            string_rule("email address has an invalid local part", |s| {
                s.rsplit_once('@')
                    .is_none_or(|(local, _)| valid_email_local_part(local))
            }),
        ]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a valid email address.".to_owned())
    }
}
