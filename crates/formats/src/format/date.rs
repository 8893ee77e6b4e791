use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use openparams::format::Format;
use openparams::kind::ParameterType;
use openparams::rule::ValidationRule;
use openparams::step::PreparationStep;
use serde_json::Value;

use super::{string_rule, string_step};
use crate::error::FormatError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `string` / `date`: a calendar date, rewritten as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormat;

impl Format for DateFormat {
    fn name(&self) -> &str {
        "date"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![string_rule("value must be a valid date (YYYY-MM-DD)", |s| {
            NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
        })]
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        vec![string_step("normalize date", |s| {
            let date = NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(FormatError::from)?;
            Ok(Value::String(date.format(DATE_FORMAT).to_string()))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a full-date as defined by RFC 3339 (YYYY-MM-DD).".to_owned())
    }
}

/// `string` / `date-time`: an RFC 3339 timestamp, rewritten with an explicit
/// numeric offset (`Z` becomes `+00:00`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeFormat;

impl Format for DateTimeFormat {
    fn name(&self) -> &str {
        "date-time"
    }

    fn applies_to(&self) -> ParameterType {
        ParameterType::String
    }

    fn validation_rules(&self) -> Vec<ValidationRule> {
        vec![string_rule("value must be a valid RFC 3339 date-time", |s| {
            DateTime::parse_from_rfc3339(s).is_ok()
        })]
    }

    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        vec![string_step("normalize date-time", |s| {
            let timestamp = DateTime::parse_from_rfc3339(s).map_err(FormatError::from)?;
            Ok(Value::String(timestamp.to_rfc3339()))
        })]
    }

    fn documentation(&self) -> Option<String> {
        Some("Value must be a date-time as defined by RFC 3339.".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::testing::{messages, prepare};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn date_is_canonicalised() {
        assert_eq!(prepare(DateFormat, json!("2019-05-12")).unwrap(), json!("2019-05-12"));
        assert_eq!(prepare(DateFormat, json!("2019-5-2")).unwrap(), json!("2019-05-02"));
    }

    #[test]
    fn impossible_dates_are_rejected() {
        let err = prepare(DateFormat, json!("2019-02-30")).unwrap_err();
        assert_eq!(messages(&err), vec!["value must be a valid date (YYYY-MM-DD)"]);
        assert!(prepare(DateFormat, json!("12/05/2019")).is_err());
    }

    #[test]
    fn date_time_uses_numeric_offset() {
        assert_eq!(
            prepare(DateTimeFormat, json!("2017-07-21T17:32:28Z")).unwrap(),
            json!("2017-07-21T17:32:28+00:00")
        );
        assert_eq!(
            prepare(DateTimeFormat, json!("2017-07-21T17:32:28.5-05:00")).unwrap(),
            json!("2017-07-21T17:32:28.500-05:00")
        );
    }

    #[test]
    fn date_time_requires_offset() {
        let err = prepare(DateTimeFormat, json!("2017-07-21 17:32:28")).unwrap_err();
        assert_eq!(messages(&err), vec!["value must be a valid RFC 3339 date-time"]);
    }
}
