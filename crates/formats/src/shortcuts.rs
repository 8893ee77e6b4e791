//! One-call builders for common parameter shapes.
//!
//! Each function returns a [`ParameterBuilder`] with the type and format
//! already set, so further options chain as usual:
//!
//! ```
//! use openparams::prelude::*;
//! use openparams_formats::shortcuts;
//! use serde_json::json;
//!
//! let list = ParameterList::builder("search")
//!     .parameter(shortcuts::csv("tags"))
//!     .parameter(shortcuts::date("since").required(true))
//!     .build()?;
//!
//! let prepared = list
//!     .prepare([("tags", json!("a, b")), ("since", json!("2019-5-12"))])
//!     .unwrap();
//! assert_eq!(prepared["tags"], json!(["a", "b"]));
//! assert_eq!(prepared["since"], json!("2019-05-12"));
//! # Ok::<(), openparams::error::DefinitionError>(())
//! ```

use openparams::definition::{ParameterBuilder, ParameterDefinition};

use crate::format::{
    AlphanumericFormat, BinaryFormat, ByteFormat, CsvFormat, DateFormat, DateTimeFormat,
    EmailFormat, PasswordFormat, UuidFormat, YesNoFormat,
};

pub fn string(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name)
}

pub fn integer(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::integer(name)
}

pub fn number(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::number(name)
}

pub fn boolean(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::boolean(name)
}

pub fn array(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::array(name)
}

pub fn object(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::object(name)
}

/// A comma-separated list, prepared as an array of strings.
pub fn csv(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(CsvFormat::default())
}

pub fn uuid(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(UuidFormat)
}

/// A switch word, prepared as a boolean.
pub fn yes_no(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(YesNoFormat)
}

pub fn date(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(DateFormat)
}

pub fn date_time(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(DateTimeFormat)
}

pub fn binary(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(BinaryFormat)
}

/// Base64 text, prepared as the decoded string.
pub fn byte(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(ByteFormat)
}

pub fn alphanumeric(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(AlphanumericFormat::default())
}

pub fn email(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(EmailFormat)
}

/// A sensitive string; its value is masked in pipeline logs.
pub fn password(name: impl Into<String>) -> ParameterBuilder {
    ParameterDefinition::string(name).format(PasswordFormat)
}
