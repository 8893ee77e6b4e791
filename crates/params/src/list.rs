//! Parameter lists.
//!
//! A [`ParameterList`] is the unit callers prepare: an ordered, name-unique
//! set of definitions sharing one [`ParameterValuesContext`]. Preparing a
//! list never stops at the first failing parameter; every error of every
//! parameter is returned in one [`AggregateError`].

use std::ops::Index;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ParameterValuesContext;
use crate::definition::{ParameterBuilder, ParameterDefinition};
use crate::error::{AggregateError, DefinitionError, ValidationError};
use crate::values::{Outcome, ParameterValues};

/// Behavior switches for [`ParameterList::prepare`].
///
/// The two switches are independent. `strict` only looks at declared
/// parameters missing from the input; `reject_undefined` only looks at input
/// keys no parameter declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListOptions {
    /// Absent required parameters are errors. When off they are skipped.
    pub strict: bool,
    /// Input keys with no definition are errors. When off they are ignored.
    pub reject_undefined: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            strict: true,
            reject_undefined: false,
        }
    }
}

/// Ordered, name-unique parameter definitions.
#[derive(Debug, Clone)]
pub struct ParameterList {
    name: String,
    definitions: IndexMap<String, ParameterDefinition>,
    context: ParameterValuesContext,
    options: ListOptions,
}

impl ParameterList {
    /// Creates a list; fails if two definitions share a name.
    pub fn new(
        name: impl Into<String>,
        definitions: impl IntoIterator<Item = ParameterDefinition>,
        context: ParameterValuesContext,
    ) -> Result<Self, DefinitionError> {
        let mut list = Self {
            name: name.into(),
            definitions: IndexMap::new(),
            context,
            options: ListOptions::default(),
        };
        for definition in definitions {
            list.add(definition)?;
        }
        Ok(list)
    }

    pub fn builder(name: impl Into<String>) -> ParameterListBuilder {
        ParameterListBuilder::new(name)
    }

    #[must_use]
    pub fn with_options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends a definition.
    pub fn add(&mut self, definition: ParameterDefinition) -> Result<&mut Self, DefinitionError> {
        if self.definitions.contains_key(definition.name()) {
            return Err(DefinitionError::DuplicateName {
                name: definition.name().to_owned(),
            });
        }
        self.definitions
            .insert(definition.name().to_owned(), definition);
        Ok(self)
    }

    /// Builds and appends a definition.
    pub fn add_parameter(&mut self, builder: ParameterBuilder) -> Result<&mut Self, DefinitionError> {
        self.add(builder.build()?)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn context(&self) -> &ParameterValuesContext {
        &self.context
    }

    #[must_use]
    pub fn options(&self) -> ListOptions {
        self.options
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.definitions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.definitions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Fresh values for one invocation, bound to this list's definitions so
    /// cross-field lookups can prepare siblings on demand.
    pub fn values<I, K>(&self, raw: I) -> ParameterValues<'_>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        ParameterValues::for_list(
            raw.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            self.context.clone(),
            &self.definitions,
            self.options.strict,
        )
    }

    /// Prepares every declared parameter from `raw`.
    pub fn prepare<I, K>(&self, raw: I) -> Result<PreparedValues, AggregateError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let values = self.values(raw);
        self.prepare_with(&values)
    }

    /// Prepares every declared parameter against existing values.
    ///
    /// Outcomes already cached in `values` are reused.
    pub fn prepare_with(&self, values: &ParameterValues<'_>) -> Result<PreparedValues, AggregateError> {
        let mut prepared = IndexMap::with_capacity(self.definitions.len());
        let mut errors = Vec::new();

        for definition in self.definitions.values() {
            match values.resolve(definition) {
                Outcome::Prepared(value) => {
                    prepared.insert(definition.name().to_owned(), value);
                }
                Outcome::Failed(parameter_errors) => errors.extend(parameter_errors),
                Outcome::Skipped => {}
            }
        }

        if self.options.reject_undefined {
            errors.extend(
                values
                    .raw_values()
                    .keys()
                    .filter(|key| !self.definitions.contains_key(key.as_str()))
                    .map(|key| ValidationError::undefined().prefixed_key(key.as_str())),
            );
        }

        tracing::debug!(
            list = %self.name,
            scope = values.context().scope(),
            prepared = prepared.len(),
            errors = errors.len(),
            "parameter list prepared"
        );

        if errors.is_empty() {
            Ok(PreparedValues { values: prepared })
        } else {
            Err(AggregateError::new(errors))
        }
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a ParameterDefinition;
    type IntoIter = indexmap::map::Values<'a, String, ParameterDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.values()
    }
}

enum Pending {
    Builder(ParameterBuilder),
    Definition(ParameterDefinition),
}

/// Fluent construction of a [`ParameterList`].
pub struct ParameterListBuilder {
    name: String,
    pending: Vec<Pending>,
    context: ParameterValuesContext,
    options: ListOptions,
}

impl ParameterListBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: Vec::new(),
            context: ParameterValuesContext::default(),
            options: ListOptions::default(),
        }
    }

    pub fn context(mut self, context: ParameterValuesContext) -> Self {
        self.context = context;
        self
    }

    pub fn options(mut self, options: ListOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.options.strict = strict;
        self
    }

    pub fn reject_undefined(mut self, reject: bool) -> Self {
        self.options.reject_undefined = reject;
        self
    }

    pub fn parameter(mut self, builder: ParameterBuilder) -> Self {
        self.pending.push(Pending::Builder(builder));
        self
    }

    pub fn definition(mut self, definition: ParameterDefinition) -> Self {
        self.pending.push(Pending::Definition(definition));
        self
    }

    /// Builds every parameter in order; the first error wins.
    pub fn build(self) -> Result<ParameterList, DefinitionError> {
        let definitions = self
            .pending
            .into_iter()
            .map(|pending| match pending {
                Pending::Builder(builder) => builder.build(),
                Pending::Definition(definition) => Ok(definition),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParameterList::new(self.name, definitions, self.context)?.with_options(self.options))
    }
}

impl std::fmt::Debug for ParameterListBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterListBuilder")
            .field("name", &self.name)
            .field("pending", &self.pending.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

static NULL: Value = Value::Null;

/// Prepared values by parameter name, in declaration order.
///
/// Skipped parameters have no entry. Indexing with an unknown name yields
/// `null`, as `serde_json::Value` does.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PreparedValues {
    values: IndexMap<String, Value>,
}

impl PreparedValues {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Deserializes the prepared value of `name` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.values
            .get(name)
            .map(|value| T::deserialize(value))
            .transpose()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }

    /// All values as one JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values.into_iter().collect())
    }
}

impl Index<&str> for PreparedValues {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }
}

impl IntoIterator for PreparedValues {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn list() -> ParameterList {
        ParameterList::builder("test")
            .context(ParameterValuesContext::new("query").without_logging())
            .parameter(ParameterDefinition::integer("age").minimum(18.0))
            .parameter(ParameterDefinition::string("email").required(true))
            .parameter(ParameterDefinition::string("sort").default("asc"))
            .build()
            .unwrap()
    }

    #[test]
    fn accessors() {
        let list = list();
        assert_eq!(list.name(), "test");
        assert_eq!(list.len(), 3);
        assert!(!list.is_empty());
        assert!(list.contains("email"));
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["age", "email", "sort"]);
        assert_eq!(list.get("age").unwrap().name(), "age");
        assert_eq!(list.context().scope(), "query");
        assert_eq!((&list).into_iter().count(), 3);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = ParameterList::builder("dup")
            .parameter(ParameterDefinition::string("a"))
            .parameter(ParameterDefinition::integer("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateName { name: "a".into() });

        let mut list = ParameterList::new("x", Vec::new(), ParameterValuesContext::default()).unwrap();
        list.add_parameter(ParameterDefinition::string("a")).unwrap();
        assert!(list.add_parameter(ParameterDefinition::string("a")).is_err());
    }

    #[test]
    fn defaults_fill_absent_values() {
        let prepared = list()
            .prepare([("age", json!(20)), ("email", json!("a@b.c"))])
            .unwrap();
        assert_eq!(prepared["sort"], json!("asc"));
        assert_eq!(prepared.names().collect::<Vec<_>>(), vec!["age", "email", "sort"]);
    }

    #[test]
    fn absent_optional_parameters_have_no_entry() {
        let prepared = list().prepare([("email", json!("a@b.c"))]).unwrap();
        assert!(!prepared.contains("age"));
        assert_eq!(prepared["age"], Value::Null);
    }

    #[test]
    fn undefined_inputs_are_ignored_by_default() {
        let prepared = list()
            .prepare([("email", json!("a@b.c")), ("other", json!(1))])
            .unwrap();
        assert!(!prepared.contains("other"));
    }

    #[test]
    fn undefined_inputs_can_be_rejected() {
        let list = list().with_options(ListOptions {
            reject_undefined: true,
            ..ListOptions::default()
        });
        let err = list
            .prepare([("other", json!(1)), ("age", json!(3))])
            .unwrap_err();
        assert_eq!(err.pointers(), vec!["/age", "/email", "/other"]);
    }

    #[test]
    fn strictness_and_undefined_keys_are_independent() {
        let input = [("age", json!(20)), ("other", json!(1))];

        let lenient = list().with_options(ListOptions {
            strict: false,
            reject_undefined: true,
        });
        assert_eq!(lenient.prepare(input.clone()).unwrap_err().pointers(), vec!["/other"]);

        let strict = list().with_options(ListOptions {
            strict: true,
            reject_undefined: false,
        });
        assert_eq!(strict.prepare(input).unwrap_err().pointers(), vec!["/email"]);
    }

    #[test]
    fn get_as_deserializes() {
        let prepared = list()
            .prepare([("age", json!(20)), ("email", json!("a@b.c"))])
            .unwrap();
        assert_eq!(prepared.get_as::<u8>("age").unwrap(), Some(20));
        assert_eq!(prepared.get_as::<u8>("missing").unwrap(), None);
        assert!(prepared.get_as::<u8>("email").is_err());
    }

    #[test]
    fn prepared_values_serialize_as_object() {
        let prepared = list().prepare([("email", json!("a@b.c"))]).unwrap();
        assert_eq!(
            serde_json::to_value(&prepared).unwrap(),
            json!({"email": "a@b.c", "sort": "asc"})
        );
        assert_eq!(prepared.into_value(), json!({"email": "a@b.c", "sort": "asc"}));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ListOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options, ListOptions::default());
        let options: ListOptions = serde_json::from_value(json!({"strict": false})).unwrap();
        assert!(!options.strict);
        assert!(!options.reject_undefined);
    }
}
