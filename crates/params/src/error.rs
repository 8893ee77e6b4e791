//! Error types.
//!
//! Two families live here. [`ValidationError`] and [`AggregateError`] are
//! produced while preparing input and are meant to be handed to clients.
//! [`DefinitionError`] is raised while building definitions and lists, before
//! any input is seen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pointer::Pointer;

/// What went wrong with a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The native type of the value disagrees with the declared type and no
    /// deserialization or cast applied.
    TypeMismatch,
    /// A validation rule rejected the value.
    ValidationRule,
    /// A preparation step failed.
    PreparationStep,
    /// A required value was absent.
    MissingRequiredValue,
    /// A value was supplied for something that is not defined.
    UndefinedValue,
}

impl ErrorKind {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "PARAM_TYPE_MISMATCH",
            Self::ValidationRule => "PARAM_VALIDATION",
            Self::PreparationStep => "PARAM_PREPARATION",
            Self::MissingRequiredValue => "PARAM_MISSING_VALUE",
            Self::UndefinedValue => "PARAM_UNDEFINED_VALUE",
        }
    }

    /// Broad category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type",
            Self::ValidationRule => "validation",
            Self::PreparationStep => "preparation",
            Self::MissingRequiredValue | Self::UndefinedValue => "value",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TypeMismatch => "type mismatch",
            Self::ValidationRule => "validation rule",
            Self::PreparationStep => "preparation step",
            Self::MissingRequiredValue => "missing required value",
            Self::UndefinedValue => "undefined value",
        })
    }
}

/// A single addressable failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{pointer}: {message}")]
pub struct ValidationError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Where the failure happened.
    pub pointer: Pointer,
    /// Human-readable message.
    pub message: String,
    /// Description of the preparation step that failed, for step errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
}

impl ValidationError {
    /// Creates an error at the root of the value being prepared.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            pointer: Pointer::root(),
            message: message.into(),
            step: None,
        }
    }

    /// The value has the wrong native type.
    pub fn type_mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("invalid data type; expected: {expected}; you provided: {actual}"),
        )
    }

    /// The bound deserializer could not decode raw text for `expected`.
    pub fn undecodable(expected: impl fmt::Display, error: &DeserializeError) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("invalid data type; expected: {expected}; {error}"),
        )
    }

    /// A validation rule failed with the given message.
    pub fn rule(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationRule, message)
    }

    /// A preparation step failed.
    pub fn step(description: impl Into<String>, error: &StepError) -> Self {
        Self {
            step: Some(description.into()),
            ..Self::new(ErrorKind::PreparationStep, error.to_string())
        }
    }

    /// A required value is absent.
    pub fn missing() -> Self {
        Self::new(ErrorKind::MissingRequiredValue, "missing required value")
    }

    /// A value was supplied that nothing defines.
    pub fn undefined() -> Self {
        Self::new(ErrorKind::UndefinedValue, "value is not defined")
    }

    /// Places the error at the given pointer.
    #[must_use]
    pub fn at(mut self, pointer: Pointer) -> Self {
        self.pointer = pointer;
        self
    }

    /// Prefixes the pointer with a property or parameter name.
    #[must_use]
    pub fn prefixed_key(mut self, key: impl Into<String>) -> Self {
        self.pointer = self.pointer.prefixed_key(key);
        self
    }

    /// Prefixes the pointer with an array index.
    #[must_use]
    pub fn prefixed_index(mut self, index: usize) -> Self {
        self.pointer = self.pointer.prefixed_index(index);
        self
    }
}

/// Every failure from one preparation, in declaration then traversal order.
///
/// This is the only error `ParameterList::prepare` returns. It serializes to
/// `{"errors": [{"kind", "pointer", "message", "step"?}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateError {
    errors: Vec<ValidationError>,
}

impl AggregateError {
    /// Wraps an ordered list of errors.
    #[must_use]
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// The errors in order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Rendered pointers, in order.
    #[must_use]
    pub fn pointers(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.pointer.to_string()).collect()
    }

    /// Errors rooted at the named parameter.
    pub fn for_parameter<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.pointer.parameter_name() == Some(name))
    }

    /// Unwraps the errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parameter error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl IntoIterator for AggregateError {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<Vec<ValidationError>> for AggregateError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

/// Failure reported by a preparation step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The value was rejected by the step.
    #[error("{0}")]
    Invalid(String),

    /// Anything else that went wrong inside the step.
    #[error("unexpected failure: {0}")]
    Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StepError {
    /// The step rejected the value.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Wraps an unexpected error raised inside a step.
    pub fn unexpected(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Unexpected(error.into())
    }
}

impl From<serde_json::Error> for StepError {
    fn from(error: serde_json::Error) -> Self {
        Self::unexpected(error)
    }
}

/// Failure reported by a deserializer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DeserializeError {
    message: String,
}

impl DeserializeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error raised while building definitions, lists or registries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Two parameters (or two properties of one object) share a name.
    #[error("parameter already exists: `{name}`")]
    DuplicateName { name: String },

    /// A type name did not resolve to a parameter type.
    #[error("unknown parameter type `{name}`")]
    UnknownType { name: String },

    /// A regex pattern did not compile.
    #[error("invalid pattern `{pattern}` for `{name}`: {reason}")]
    InvalidPattern {
        name: String,
        pattern: String,
        reason: String,
    },

    /// A container option was set on a parameter that is not that container.
    #[error("`{option}` is not available on `{name}` of type {ty}")]
    NotAContainer {
        name: String,
        option: &'static str,
        ty: String,
    },

    /// Lower bound above upper bound.
    #[error("invalid bounds for `{name}`: {reason}")]
    InvalidBounds { name: String, reason: String },

    /// A format was attached to a parameter of a different type.
    #[error("format `{format}` applies to {expected}, not {actual}")]
    FormatTypeMismatch {
        format: String,
        expected: String,
        actual: String,
    },

    /// The registry already holds this format.
    #[error("format `{name}` is already registered for {ty}")]
    DuplicateFormat { ty: String, name: String },

    /// The registry holds no such format.
    #[error("no format `{name}` registered for {ty}")]
    UnknownFormat { ty: String, name: String },
}

impl DefinitionError {
    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "DEF_DUPLICATE_NAME",
            Self::UnknownType { .. } => "DEF_UNKNOWN_TYPE",
            Self::InvalidPattern { .. } => "DEF_INVALID_PATTERN",
            Self::NotAContainer { .. } => "DEF_NOT_A_CONTAINER",
            Self::InvalidBounds { .. } => "DEF_INVALID_BOUNDS",
            Self::FormatTypeMismatch { .. } => "DEF_FORMAT_TYPE",
            Self::DuplicateFormat { .. } => "DEF_DUPLICATE_FORMAT",
            Self::UnknownFormat { .. } => "DEF_UNKNOWN_FORMAT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn type_mismatch_message() {
        let err = ValidationError::type_mismatch("array", "string");
        assert_eq!(
            err.message,
            "invalid data type; expected: array; you provided: string"
        );
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.pointer.is_root());
    }

    #[test]
    fn prefixing_moves_outward() {
        let err = ValidationError::rule("too short")
            .prefixed_key("firstName")
            .prefixed_index(1)
            .prefixed_key("items");
        assert_eq!(err.pointer.to_string(), "/items/1/firstName");
        assert_eq!(err.to_string(), "/items/1/firstName: too short");
    }

    #[test]
    fn step_error_keeps_description() {
        let err = ValidationError::step("base64 decode", &StepError::invalid("bad padding"));
        assert_eq!(err.kind, ErrorKind::PreparationStep);
        assert_eq!(err.step.as_deref(), Some("base64 decode"));
        assert_eq!(err.message, "bad padding");
    }

    #[test]
    fn unexpected_step_error_displays_source() {
        let parse = "x".parse::<i64>().unwrap_err();
        let err = StepError::unexpected(parse);
        assert!(err.to_string().starts_with("unexpected failure: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn aggregate_serializes_for_clients() {
        let agg = AggregateError::new(vec![
            ValidationError::rule("must be at least 18").prefixed_key("age"),
            ValidationError::missing().prefixed_key("email"),
        ]);

        assert_eq!(
            serde_json::to_value(&agg).unwrap(),
            json!({
                "errors": [
                    {"kind": "validation_rule", "pointer": "/age", "message": "must be at least 18"},
                    {"kind": "missing_required_value", "pointer": "/email", "message": "missing required value"}
                ]
            })
        );
    }

    #[test]
    fn aggregate_display_lists_every_error() {
        let agg = AggregateError::new(vec![
            ValidationError::rule("a").prefixed_key("x"),
            ValidationError::rule("b").prefixed_key("y"),
        ]);
        assert_eq!(agg.to_string(), "2 parameter error(s)\n  - /x: a\n  - /y: b");
    }

    #[test]
    fn for_parameter_filters_by_root() {
        let agg = AggregateError::new(vec![
            ValidationError::rule("a").prefixed_index(0).prefixed_key("list"),
            ValidationError::rule("b").prefixed_key("other"),
            ValidationError::rule("c").prefixed_index(4).prefixed_key("list"),
        ]);
        assert_eq!(agg.for_parameter("list").count(), 2);
        assert_eq!(agg.pointers(), vec!["/list/0", "/other", "/list/4"]);
    }

    #[test]
    fn kind_codes_are_unique() {
        let kinds = [
            ErrorKind::TypeMismatch,
            ErrorKind::ValidationRule,
            ErrorKind::PreparationStep,
            ErrorKind::MissingRequiredValue,
            ErrorKind::UndefinedValue,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(ErrorKind::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| c.starts_with("PARAM_")));
    }

    #[test]
    fn definition_error_messages() {
        let err = DefinitionError::DuplicateName {
            name: "email".into(),
        };
        assert_eq!(err.to_string(), "parameter already exists: `email`");
        assert_eq!(err.code(), "DEF_DUPLICATE_NAME");

        let err = DefinitionError::UnknownType { name: "xx".into() };
        assert_eq!(err.to_string(), "unknown parameter type `xx`");
    }
}
