//! Per-invocation input and memoized outcomes.
//!
//! A [`ParameterValues`] is created for one call to
//! [`ParameterList::prepare`](crate::list::ParameterList::prepare) and thrown
//! away afterwards. Every parameter is prepared at most once per instance; the
//! outcome (success or failure) is remembered so that cross-field rules and
//! the list itself see the same result.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::ParameterValuesContext;
use crate::definition::ParameterDefinition;
use crate::deserializer::Deserializer;
use crate::error::ValidationError;

/// What became of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Prepared(Value),
    Failed(Vec<ValidationError>),
    /// Absent and not an error.
    Skipped,
}

impl Outcome {
    fn value(&self) -> Option<&Value> {
        match self {
            Self::Prepared(value) => Some(value),
            _ => None,
        }
    }
}

/// Raw input of one invocation plus the cache of prepared values.
///
/// Not `Sync`: the cache uses interior mutability and must stay on the
/// invocation's thread.
pub struct ParameterValues<'a> {
    raw: IndexMap<String, Value>,
    context: ParameterValuesContext,
    definitions: Option<&'a IndexMap<String, ParameterDefinition>>,
    strict: bool,
    cache: RefCell<IndexMap<String, Outcome>>,
    in_progress: RefCell<Vec<String>>,
}

impl<'a> ParameterValues<'a> {
    /// Values not tied to any list; [`prepared`](Self::prepared) only sees
    /// what was explicitly prepared against this instance.
    pub fn new<I, K>(raw: I, context: ParameterValuesContext) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            raw: raw.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            context,
            definitions: None,
            strict: true,
            cache: RefCell::default(),
            in_progress: RefCell::default(),
        }
    }

    /// Values holding a single named input, for evaluating one definition
    /// outside a list.
    pub fn single(name: impl Into<String>, raw: Value, context: ParameterValuesContext) -> Self {
        Self::new([(name.into(), raw)], context)
    }

    pub(crate) fn for_list(
        raw: IndexMap<String, Value>,
        context: ParameterValuesContext,
        definitions: &'a IndexMap<String, ParameterDefinition>,
        strict: bool,
    ) -> Self {
        Self {
            raw,
            context,
            definitions: Some(definitions),
            strict,
            cache: RefCell::default(),
            in_progress: RefCell::default(),
        }
    }

    /// The raw input for `name`, as supplied.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Every raw input, in insertion order.
    #[must_use]
    pub fn raw_values(&self) -> &IndexMap<String, Value> {
        &self.raw
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.raw.contains_key(name)
    }

    #[must_use]
    pub fn context(&self) -> &ParameterValuesContext {
        &self.context
    }

    #[must_use]
    pub fn deserializer(&self) -> Option<&dyn Deserializer> {
        self.context.deserializer()
    }

    /// Whether absent required parameters are errors.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The prepared value of `name`.
    ///
    /// A cached outcome is returned as is. Otherwise, if the owning list
    /// declares `name`, it is prepared now and the outcome cached. Returns
    /// `None` when the parameter failed, is absent, is unknown, or is already
    /// being prepared further up the stack.
    pub fn prepared(&self, name: &str) -> Option<Value> {
        if let Some(outcome) = self.cache.borrow().get(name) {
            return outcome.value().cloned();
        }
        if self.is_in_progress(name) {
            tracing::trace!(parameter = name, "cyclic lookup of a parameter in progress");
            return None;
        }
        let definition = self.definitions?.get(name)?;
        match self.resolve(definition) {
            Outcome::Prepared(value) => Some(value),
            _ => None,
        }
    }

    /// Whether an outcome for `name` is cached.
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }

    /// Prepares a declared parameter once and returns the outcome.
    pub(crate) fn resolve(&self, definition: &ParameterDefinition) -> Outcome {
        let name = definition.name();
        if let Some(outcome) = self.cache.borrow().get(name) {
            return outcome.clone();
        }
        if self.is_in_progress(name) {
            return Outcome::Skipped;
        }

        let raw = self
            .raw
            .get(name)
            .or_else(|| definition.default_value())
            .cloned();

        let outcome = match raw {
            None if definition.is_required() && self.strict => {
                Outcome::Failed(vec![ValidationError::missing().prefixed_key(name)])
            }
            None => Outcome::Skipped,
            Some(raw) => {
                self.in_progress.borrow_mut().push(name.to_owned());
                let result = definition.prepare(raw, self);
                self.in_progress.borrow_mut().retain(|n| n != name);
                match result {
                    Ok(value) => Outcome::Prepared(value),
                    Err(errors) => Outcome::Failed(errors),
                }
            }
        };

        self.remember(name, outcome.clone());
        outcome
    }

    /// Caches an outcome unless one is already present.
    pub(crate) fn remember(&self, name: &str, outcome: Outcome) {
        self.cache
            .borrow_mut()
            .entry(name.to_owned())
            .or_insert(outcome);
    }

    fn is_in_progress(&self, name: &str) -> bool {
        self.in_progress.borrow().iter().any(|n| n == name)
    }
}

impl fmt::Debug for ParameterValues<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterValues")
            .field("scope", &self.context.scope())
            .field("raw", &self.raw.keys().collect::<Vec<_>>())
            .field("strict", &self.strict)
            .field("cached", &self.cache.borrow().keys().cloned().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn single_holds_one_input() {
        let values = ParameterValues::single("age", json!(3), ParameterValuesContext::default());
        assert_eq!(values.raw("age"), Some(&json!(3)));
        assert!(values.contains("age"));
        assert!(!values.contains("other"));
        assert!(values.is_strict());
    }

    #[test]
    fn standalone_values_have_nothing_prepared() {
        let values = ParameterValues::single("age", json!(3), ParameterValuesContext::default());
        assert_eq!(values.prepared("age"), None);
        assert!(!values.is_resolved("age"));
    }

    #[test]
    fn remember_is_write_once() {
        let values = ParameterValues::single("a", json!(1), ParameterValuesContext::default());
        values.remember("a", Outcome::Prepared(json!(1)));
        values.remember("a", Outcome::Prepared(json!(2)));
        assert_eq!(values.prepared("a"), Some(json!(1)));
    }

    #[test]
    fn failures_are_cached_as_absent() {
        let values = ParameterValues::single("a", json!(1), ParameterValuesContext::default());
        values.remember("a", Outcome::Failed(vec![ValidationError::missing()]));
        assert!(values.is_resolved("a"));
        assert_eq!(values.prepared("a"), None);
    }

    #[test]
    fn resolve_runs_definition_once() {
        let definition = ParameterDefinition::integer("age")
            .allow_type_cast(true)
            .build()
            .unwrap();
        let values = ParameterValues::single("age", json!("29"), ParameterValuesContext::default());

        assert_eq!(values.resolve(&definition), Outcome::Prepared(json!(29)));
        assert_eq!(values.prepared("age"), Some(json!(29)));
        assert_eq!(values.resolve(&definition), Outcome::Prepared(json!(29)));
    }

    #[test]
    fn resolve_missing_respects_strictness() {
        let definition = ParameterDefinition::string("email")
            .required(true)
            .build()
            .unwrap();
        let definitions = IndexMap::from([("email".to_owned(), definition.clone())]);

        let strict = ParameterValues::for_list(
            IndexMap::new(),
            ParameterValuesContext::default(),
            &definitions,
            true,
        );
        match strict.resolve(&definition) {
            Outcome::Failed(errors) => assert_eq!(errors[0].pointer.to_string(), "/email"),
            other => panic!("expected failure, got {other:?}"),
        }

        let lenient = ParameterValues::for_list(
            IndexMap::new(),
            ParameterValuesContext::default(),
            &definitions,
            false,
        );
        assert_eq!(lenient.resolve(&definition), Outcome::Skipped);
    }
}
