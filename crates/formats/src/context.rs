//! Contexts for the usual request locations.
//!
//! The scope doubles as the OpenAPI `in` value of generated documentation.

use openparams::context::ParameterValuesContext;

use crate::deserializer::{JsonDeserializer, StandardDeserializer};

/// `in: query`, decoding flat text.
#[must_use]
pub fn query_context() -> ParameterValuesContext {
    ParameterValuesContext::new("query").with_deserializer(StandardDeserializer::default())
}

/// `in: header`, decoding flat text.
#[must_use]
pub fn header_context() -> ParameterValuesContext {
    ParameterValuesContext::new("header").with_deserializer(StandardDeserializer::default())
}

/// `in: path`, decoding flat text.
#[must_use]
pub fn path_context() -> ParameterValuesContext {
    ParameterValuesContext::new("path").with_deserializer(StandardDeserializer::default())
}

/// `in: body`. Values usually arrive already structured; text fields are
/// read as JSON.
#[must_use]
pub fn body_context() -> ParameterValuesContext {
    ParameterValuesContext::new("body").with_deserializer(JsonDeserializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scopes_and_deserializers() {
        for (context, scope) in [
            (query_context(), "query"),
            (header_context(), "header"),
            (path_context(), "path"),
            (body_context(), "body"),
        ] {
            assert_eq!(context.scope(), scope);
            assert!(context.deserializer().is_some());
            assert!(context.has_logger());
        }
    }
}
