//! Format plugins.
//!
//! A [`Format`] refines a parameter type with extra rules and steps, the way
//! OpenAPI's `format` keyword refines `type`. Formats are looked up in an
//! explicit [`FormatRegistry`] owned by the caller; there is no global table.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::DefinitionError;
use crate::kind::ParameterType;
use crate::rule::ValidationRule;
use crate::step::PreparationStep;

/// A named refinement of one parameter type.
pub trait Format: Send + Sync + fmt::Debug {
    /// The OpenAPI format name, e.g. `date-time`.
    fn name(&self) -> &str;

    /// The only type this format can be attached to.
    fn applies_to(&self) -> ParameterType;

    /// Rules run before the type's built-in rules.
    fn validation_rules(&self) -> Vec<ValidationRule> {
        Vec::new()
    }

    /// Steps run before container recursion and user steps.
    fn preparation_steps(&self) -> Vec<Arc<dyn PreparationStep>> {
        Vec::new()
    }

    /// Human-readable description for API documentation.
    fn documentation(&self) -> Option<String> {
        None
    }

    /// Whether values of this format must not appear in logs.
    fn is_sensitive(&self) -> bool {
        false
    }
}

/// Formats keyed by `(type, name)`.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: IndexMap<(ParameterType, String), Arc<dyn Format>>,
}

impl FormatRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a format. A second format with the same type and name is rejected.
    pub fn register(&mut self, format: impl Format + 'static) -> Result<&mut Self, DefinitionError> {
        self.register_arc(Arc::new(format))
    }

    pub fn register_arc(&mut self, format: Arc<dyn Format>) -> Result<&mut Self, DefinitionError> {
        let key = (format.applies_to(), format.name().to_owned());
        if self.formats.contains_key(&key) {
            return Err(DefinitionError::DuplicateFormat {
                ty: key.0.to_string(),
                name: key.1,
            });
        }
        tracing::trace!(ty = %key.0, format = %key.1, "format registered");
        self.formats.insert(key, format);
        Ok(self)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, format: impl Format + 'static) -> Result<Self, DefinitionError> {
        self.register(format)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, ty: ParameterType, name: &str) -> Option<Arc<dyn Format>> {
        self.formats.get(&(ty, name.to_owned())).cloned()
    }

    /// Like [`get`](Self::get) but reports a missing format as an error.
    pub fn resolve(&self, ty: ParameterType, name: &str) -> Result<Arc<dyn Format>, DefinitionError> {
        self.get(ty, name).ok_or_else(|| DefinitionError::UnknownFormat {
            ty: ty.to_string(),
            name: name.to_owned(),
        })
    }

    #[must_use]
    pub fn contains(&self, ty: ParameterType, name: &str) -> bool {
        self.formats.contains_key(&(ty, name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Registered formats in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Format>> {
        self.formats.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Slug;

    impl Format for Slug {
        fn name(&self) -> &str {
            "slug"
        }

        fn applies_to(&self) -> ParameterType {
            ParameterType::String
        }
    }

    #[test]
    fn register_and_resolve() {
        let registry = FormatRegistry::new().with(Slug).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(ParameterType::String, "slug"));
        assert_eq!(
            registry.resolve(ParameterType::String, "slug").unwrap().name(),
            "slug"
        );
    }

    #[test]
    fn lookup_is_per_type() {
        let registry = FormatRegistry::new().with(Slug).unwrap();
        let err = registry.resolve(ParameterType::Integer, "slug").unwrap_err();
        assert_eq!(err.code(), "DEF_UNKNOWN_FORMAT");
        assert_eq!(err.to_string(), "no format `slug` registered for integer");
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut registry = FormatRegistry::new();
        registry.register(Slug).unwrap();
        let err = registry.register(Slug).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateFormat {
                ty: "string".into(),
                name: "slug".into()
            }
        );
    }

    #[test]
    fn defaults_are_empty() {
        assert!(Slug.validation_rules().is_empty());
        assert!(Slug.preparation_steps().is_empty());
        assert!(!Slug.is_sensitive());
        assert_eq!(Slug.documentation(), None);
    }
}
