//! Array and object recursion.
//!
//! Container rules (item counts, uniqueness, property counts) are ordinary
//! validation rules on the container definition. What lives here is the walk
//! over elements and properties: every child is prepared, failures are
//! prefixed with the child's index or key and accumulated, and no container
//! value is produced if any child failed.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::definition::{ParameterDefinition, run_step};
use crate::error::{ErrorKind, ValidationError};
use crate::kind::native_type_name;
use crate::step::{PreparationStep, StepContext};
use crate::values::ParameterValues;

type Errors = Vec<ValidationError>;

/// How an array element is matched when several candidate definitions exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePolicy {
    /// Candidates whose type natively accepts the element are tried first,
    /// then the rest, each group in declaration order. The first success wins.
    #[default]
    FirstMatch,
    /// Every candidate is tried; exactly one may succeed (OpenAPI `oneOf`).
    ExactlyOne,
}

/// Child definitions of a container parameter.
#[derive(Debug, Clone)]
pub enum Container {
    Array(ArraySpec),
    Object(ObjectSpec),
}

impl Container {
    pub(crate) fn prepare(
        &self,
        name: &str,
        value: Value,
        values: &ParameterValues<'_>,
    ) -> Result<Value, Errors> {
        match (self, value) {
            (Self::Array(spec), Value::Array(items)) => spec.prepare(name, items, values),
            (Self::Object(spec), Value::Object(map)) => spec.prepare(map, values),
            // Format steps may have reshaped the value; nothing to walk.
            (_, other) => Ok(other),
        }
    }
}

/// Element candidates and per-element steps of an array parameter.
#[derive(Debug, Clone, Default)]
pub struct ArraySpec {
    candidates: Vec<ParameterDefinition>,
    policy: CandidatePolicy,
    each: Vec<Arc<dyn PreparationStep>>,
}

impl ArraySpec {
    pub(crate) fn new(
        candidates: Vec<ParameterDefinition>,
        policy: CandidatePolicy,
        each: Vec<Arc<dyn PreparationStep>>,
    ) -> Self {
        Self {
            candidates,
            policy,
            each,
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &[ParameterDefinition] {
        &self.candidates
    }

    #[must_use]
    pub fn policy(&self) -> CandidatePolicy {
        self.policy
    }

    /// Steps applied to every prepared element.
    #[must_use]
    pub fn each(&self) -> &[Arc<dyn PreparationStep>] {
        &self.each
    }

    fn prepare(
        &self,
        name: &str,
        items: Vec<Value>,
        values: &ParameterValues<'_>,
    ) -> Result<Value, Errors> {
        let ctx = StepContext { name, values };
        let mut prepared = Vec::with_capacity(items.len());
        let mut errors = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            let result = self
                .prepare_item(item, values)
                .and_then(|item| self.apply_each(item, &ctx));
            match result {
                Ok(item) => prepared.push(item),
                Err(item_errors) => {
                    errors.extend(item_errors.into_iter().map(|e| e.prefixed_index(index)));
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Array(prepared))
        } else {
            tracing::trace!(parameter = name, errors = errors.len(), "array elements failed");
            Err(errors)
        }
    }

    fn apply_each(&self, mut item: Value, ctx: &StepContext<'_, '_>) -> Result<Value, Errors> {
        for step in &self.each {
            item = run_step(step.as_ref(), item, ctx)?;
        }
        Ok(item)
    }

    fn prepare_item(&self, item: Value, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        match self.candidates.as_slice() {
            [] => Ok(item),
            [only] => only.run(item, values),
            candidates => match self.policy {
                CandidatePolicy::FirstMatch => first_match(candidates, item, values),
                CandidatePolicy::ExactlyOne => exactly_one(candidates, item, values),
            },
        }
    }
}

fn first_match(
    candidates: &[ParameterDefinition],
    item: Value,
    values: &ParameterValues<'_>,
) -> Result<Value, Errors> {
    let (accepting, others): (Vec<_>, Vec<_>) = candidates
        .iter()
        .partition(|c| c.parameter_type().accepts(&item));

    let mut failures = Vec::with_capacity(candidates.len());
    for candidate in accepting.iter().chain(&others) {
        match candidate.run(item.clone(), values) {
            Ok(value) => return Ok(value),
            Err(errors) => failures.push(errors),
        }
    }
    Err(all_failed(candidates, &item, accepting.len(), failures))
}

fn exactly_one(
    candidates: &[ParameterDefinition],
    item: Value,
    values: &ParameterValues<'_>,
) -> Result<Value, Errors> {
    let accepting = candidates
        .iter()
        .filter(|c| c.parameter_type().accepts(&item))
        .count();
    // Accepting candidates first, so `all_failed` can pick the lone native
    // match from the front.
    let ordered = candidates
        .iter()
        .filter(|c| c.parameter_type().accepts(&item))
        .chain(candidates.iter().filter(|c| !c.parameter_type().accepts(&item)));

    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for candidate in ordered {
        match candidate.run(item.clone(), values) {
            Ok(value) => successes.push(value),
            Err(errors) => failures.push(errors),
        }
    }

    match successes.len() {
        1 => Ok(successes.remove(0)),
        0 => Err(all_failed(candidates, &item, accepting, failures)),
        _ => Err(vec![ValidationError::rule(
            "value matches more than one allowed type",
        )]),
    }
}

/// Errors for an element no candidate could prepare.
///
/// `failures` must list the natively accepting candidates first. When any
/// candidate accepted the element's type, their own errors explain the
/// failure; identical errors from several candidates are reported once. Only
/// an element no candidate accepts is a type mismatch.
fn all_failed(
    candidates: &[ParameterDefinition],
    item: &Value,
    accepting: usize,
    failures: Vec<Errors>,
) -> Errors {
    if accepting > 0 && !failures.is_empty() {
        let mut merged: Errors = Vec::new();
        for error in failures.into_iter().take(accepting).flatten() {
            if !merged.contains(&error) {
                merged.push(error);
            }
        }
        return merged;
    }
    let expected = candidates
        .iter()
        .map(|c| c.parameter_type().name())
        .collect::<Vec<_>>()
        .join(", ");
    vec![ValidationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "invalid data type; expected one of: {expected}; you provided: {}",
            native_type_name(item)
        ),
    )]
}

/// Declared properties of an object parameter.
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    properties: IndexMap<String, ParameterDefinition>,
    additional_properties: bool,
}

impl ObjectSpec {
    pub(crate) fn new(
        properties: IndexMap<String, ParameterDefinition>,
        additional_properties: bool,
    ) -> Self {
        Self {
            properties,
            additional_properties,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &IndexMap<String, ParameterDefinition> {
        &self.properties
    }

    /// Whether undeclared properties pass through.
    #[must_use]
    pub fn allows_additional_properties(&self) -> bool {
        self.additional_properties
    }

    fn prepare(&self, input: Map<String, Value>, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        let mut prepared = Map::new();
        let mut supplied = HashSet::with_capacity(input.len());
        let mut errors = Vec::new();

        for (key, item) in input {
            supplied.insert(key.clone());
            match self.properties.get(&key) {
                Some(definition) => match definition.run(item, values) {
                    Ok(value) => {
                        prepared.insert(key, value);
                    }
                    Err(property_errors) => errors.extend(
                        property_errors
                            .into_iter()
                            .map(|e| e.prefixed_key(key.as_str())),
                    ),
                },
                None if self.additional_properties => {
                    prepared.insert(key, item);
                }
                None => errors.push(ValidationError::undefined().prefixed_key(key)),
            }
        }

        for (key, definition) in &self.properties {
            if supplied.contains(key) {
                continue;
            }
            if let Some(default) = definition.default_value() {
                match definition.run(default.clone(), values) {
                    Ok(value) => {
                        prepared.insert(key.clone(), value);
                    }
                    Err(property_errors) => errors.extend(
                        property_errors
                            .into_iter()
                            .map(|e| e.prefixed_key(key.as_str())),
                    ),
                }
            } else if definition.is_required() {
                errors.push(ValidationError::missing().prefixed_key(key.as_str()));
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(prepared))
        } else {
            Err(errors)
        }
    }
}
