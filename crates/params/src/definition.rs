//! Parameter definitions and their builder.
//!
//! A [`ParameterDefinition`] is the immutable, shareable result of
//! [`ParameterBuilder::build`]. It owns the whole single-value pipeline:
//!
//! ```text
//! raw ─► null check ─► deserialize ─► type check / cast ─► rules ─► steps ─► prepared
//!                          │                │               │        │
//!                          └────────────────┴───────────────┴────────┴─► errors
//! ```
//!
//! Steps run in this order: format steps, container recursion, built-in steps
//! (trim, enum check), then user steps.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::container::{ArraySpec, CandidatePolicy, Container, ObjectSpec};
use crate::context::ParameterValuesContext;
use crate::error::{AggregateError, DefinitionError, StepError, ValidationError};
use crate::format::{Format, FormatRegistry};
use crate::kind::{ParameterType, native_type_name};
use crate::log::{PipelineEvent, Stage};
use crate::rule::ValidationRule;
use crate::step::{CallbackStep, EnumCheckStep, PreparationStep, StepContext, TrimStep};
use crate::values::{Outcome, ParameterValues};

type Errors = Vec<ValidationError>;

/// A named, typed parameter and its preparation pipeline.
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    name: String,
    ty: ParameterType,
    required: bool,
    default: Option<Value>,
    allow_type_cast: bool,
    nullable: bool,
    description: Option<String>,
    deprecated: bool,
    sensitive: bool,
    format: Option<Arc<dyn Format>>,
    rules: Vec<ValidationRule>,
    format_steps: Vec<Arc<dyn PreparationStep>>,
    steps: Vec<Arc<dyn PreparationStep>>,
    enum_values: Option<Vec<Value>>,
    container: Option<Container>,
}

impl ParameterDefinition {
    pub fn builder(name: impl Into<String>, ty: ParameterType) -> ParameterBuilder {
        ParameterBuilder::new(name, ty)
    }

    pub fn string(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::String)
    }

    pub fn integer(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::Integer)
    }

    pub fn number(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::Boolean)
    }

    pub fn array(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::Array)
    }

    pub fn object(name: impl Into<String>) -> ParameterBuilder {
        ParameterBuilder::new(name, ParameterType::Object)
    }

    // ── accessors ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameter_type(&self) -> ParameterType {
        self.ty
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn allows_type_cast(&self) -> bool {
        self.allow_type_cast
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Whether values must be masked in logs.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    #[must_use]
    pub fn format(&self) -> Option<&dyn Format> {
        self.format.as_deref()
    }

    /// All rules in execution order: format, built-in, user.
    #[must_use]
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Steps in execution order, excluding container recursion.
    pub fn steps(&self) -> impl Iterator<Item = &Arc<dyn PreparationStep>> {
        self.format_steps.iter().chain(&self.steps)
    }

    #[must_use]
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    #[must_use]
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    // ── pipeline ───────────────────────────────────────────────────────────

    /// Prepares `raw` with error pointers rooted at `/<name>`.
    ///
    /// On success the value is cached in `values` under this definition's
    /// name.
    pub fn prepare(&self, raw: Value, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        match self.run(raw, values) {
            Ok(value) => {
                values.remember(&self.name, Outcome::Prepared(value.clone()));
                Ok(value)
            }
            Err(errors) => Err(errors
                .into_iter()
                .map(|e| e.prefixed_key(self.name.as_str()))
                .collect()),
        }
    }

    /// Prepares one value outside any list.
    pub fn prepare_single(
        &self,
        raw: Value,
        context: &ParameterValuesContext,
    ) -> Result<Value, AggregateError> {
        let values = ParameterValues::single(self.name.as_str(), raw.clone(), context.clone());
        self.prepare(raw, &values).map_err(AggregateError::new)
    }

    /// The pipeline with pointers relative to this value.
    pub(crate) fn run(&self, raw: Value, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        let emit = |stage: Stage, value: Option<&Value>, errors: &[ValidationError]| {
            values.context().emit(&PipelineEvent {
                parameter: &self.name,
                scope: values.context().scope(),
                stage,
                value,
                errors,
                sensitive: self.sensitive,
            });
        };

        emit(Stage::NotStarted, Some(&raw), &[]);
        let result = self.stages(raw, values, &emit);
        match &result {
            Ok(value) => emit(Stage::Prepared, Some(value), &[]),
            Err(errors) => emit(Stage::Failed, None, errors),
        }
        result
    }

    fn stages(
        &self,
        raw: Value,
        values: &ParameterValues<'_>,
        emit: &dyn Fn(Stage, Option<&Value>, &[ValidationError]),
    ) -> Result<Value, Errors> {
        if raw.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(vec![ValidationError::type_mismatch(self.ty, "null")])
            };
        }

        let value = self.deserialize(raw, values)?;
        emit(Stage::Deserialized, Some(&value), &[]);

        let value = self.type_check(value)?;
        emit(Stage::TypeChecked, Some(&value), &[]);

        self.validate(&value, values)?;
        emit(Stage::Validated, Some(&value), &[]);

        self.apply_steps(value, values)
    }

    fn deserialize(&self, raw: Value, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        if self.ty.accepts(&raw) {
            return Ok(raw);
        }
        match (&raw, values.deserializer()) {
            (Value::String(text), Some(deserializer)) => deserializer
                .deserialize(text, self.ty)
                .map_err(|err| vec![ValidationError::undecodable(self.ty, &err)]),
            _ => Ok(raw),
        }
    }

    fn type_check(&self, value: Value) -> Result<Value, Errors> {
        if self.ty.accepts(&value) {
            return Ok(value);
        }
        if self.allow_type_cast {
            if let Some(cast) = self.ty.cast(&value) {
                tracing::trace!(parameter = %self.name, ty = %self.ty, "value cast");
                return Ok(cast);
            }
        }
        Err(vec![ValidationError::type_mismatch(
            self.ty,
            native_type_name(&value),
        )])
    }

    fn validate(&self, value: &Value, values: &ParameterValues<'_>) -> Result<(), Errors> {
        let errors: Errors = self
            .rules
            .iter()
            .filter(|rule| !rule.check(value, values))
            .map(|rule| ValidationError::rule(rule.message()))
            .collect();
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn apply_steps(&self, mut value: Value, values: &ParameterValues<'_>) -> Result<Value, Errors> {
        let ctx = StepContext {
            name: &self.name,
            values,
        };
        for step in &self.format_steps {
            value = run_step(step.as_ref(), value, &ctx)?;
        }
        if let Some(container) = &self.container {
            value = container.prepare(&self.name, value, values)?;
        }
        for step in &self.steps {
            value = run_step(step.as_ref(), value, &ctx)?;
        }
        Ok(value)
    }
}

pub(crate) fn run_step(
    step: &dyn PreparationStep,
    value: Value,
    ctx: &StepContext<'_, '_>,
) -> Result<Value, Errors> {
    // A panicking step fails its own parameter; the rest of the list still runs.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| step.prepare(value, ctx)))
        .unwrap_or_else(|payload| Err(StepError::unexpected(panic_message(&*payload))));
    outcome.map_err(|err| {
        tracing::trace!(parameter = ctx.name, step = %step.describe(), error = %err, "preparation step failed");
        vec![ValidationError::step(step.describe(), &err)]
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(|| "step panicked".to_owned(), |msg| format!("step panicked: {msg}"))
}

enum ItemSpec {
    Type(ParameterType),
    TypeName(String),
    Definition(Box<ParameterBuilder>),
}

enum FormatSpec {
    Resolved(Arc<dyn Format>),
    Lookup(Result<Arc<dyn Format>, DefinitionError>),
}

/// Fluent configuration for a [`ParameterDefinition`].
///
/// Options that can fail (patterns, type names, registry lookups, container
/// options on the wrong type) are checked in [`build`](Self::build).
pub struct ParameterBuilder {
    name: String,
    ty: ParameterType,
    required: bool,
    default: Option<Value>,
    allow_type_cast: bool,
    nullable: bool,
    description: Option<String>,
    deprecated: bool,
    sensitive: bool,
    format: Option<FormatSpec>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    minimum: Option<(f64, bool)>,
    maximum: Option<(f64, bool)>,
    multiple_of: Option<f64>,
    rules: Vec<ValidationRule>,
    steps: Vec<Arc<dyn PreparationStep>>,
    trim: bool,
    enum_values: Option<Vec<Value>>,
    // array
    items: Vec<ItemSpec>,
    policy: CandidatePolicy,
    each: Vec<Arc<dyn PreparationStep>>,
    unique_items: bool,
    min_items: Option<usize>,
    max_items: Option<usize>,
    // object
    properties: Vec<ParameterBuilder>,
    additional_properties: bool,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
    container_options: Vec<&'static str>,
}

impl ParameterBuilder {
    pub fn new(name: impl Into<String>, ty: ParameterType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            allow_type_cast: false,
            nullable: false,
            description: None,
            deprecated: false,
            sensitive: false,
            format: None,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
            multiple_of: None,
            rules: Vec::new(),
            steps: Vec::new(),
            trim: false,
            enum_values: None,
            items: Vec::new(),
            policy: CandidatePolicy::default(),
            each: Vec::new(),
            unique_items: false,
            min_items: None,
            max_items: None,
            properties: Vec::new(),
            additional_properties: true,
            min_properties: None,
            max_properties: None,
            container_options: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameter_type(&self) -> ParameterType {
        self.ty
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn allow_type_cast(mut self, allow: bool) -> Self {
        self.allow_type_cast = allow;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Masks values of this parameter in logs.
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    pub fn format(self, format: impl Format + 'static) -> Self {
        self.format_arc(Arc::new(format))
    }

    pub fn format_arc(mut self, format: Arc<dyn Format>) -> Self {
        self.format = Some(FormatSpec::Resolved(format));
        self
    }

    /// Looks the format up by this parameter's type and `name`.
    pub fn format_from(mut self, registry: &FormatRegistry, name: &str) -> Self {
        self.format = Some(FormatSpec::Lookup(registry.resolve(self.ty, name)));
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn step(mut self, step: impl PreparationStep + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Adds an infallible closure step.
    pub fn map<F>(self, description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.step(CallbackStep::map(description, f))
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: usize) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Regular expression the string must match; compiled in `build`.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn minimum(mut self, bound: f64) -> Self {
        self.minimum = Some((bound, false));
        self
    }

    pub fn exclusive_minimum(mut self, bound: f64) -> Self {
        self.minimum = Some((bound, true));
        self
    }

    pub fn maximum(mut self, bound: f64) -> Self {
        self.maximum = Some((bound, false));
        self
    }

    pub fn exclusive_maximum(mut self, bound: f64) -> Self {
        self.maximum = Some((bound, true));
        self
    }

    pub fn multiple_of(mut self, factor: f64) -> Self {
        self.multiple_of = Some(factor);
        self
    }

    /// Trims string values before user steps run.
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Restricts the prepared value to a fixed set.
    pub fn enum_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    // ── arrays ─────────────────────────────────────────────────────────────

    /// Adds a candidate definition for array elements.
    pub fn item(mut self, item: ParameterBuilder) -> Self {
        self.container_options.push("item");
        self.items.push(ItemSpec::Definition(Box::new(item)));
        self
    }

    /// Adds a plain candidate of the given type; it inherits this
    /// parameter's type-cast policy.
    pub fn allowed_type(mut self, ty: ParameterType) -> Self {
        self.container_options.push("allowed_type");
        self.items.push(ItemSpec::Type(ty));
        self
    }

    /// Like [`allowed_type`](Self::allowed_type), by OpenAPI type name.
    pub fn allowed_type_name(mut self, name: impl Into<String>) -> Self {
        self.container_options.push("allowed_type");
        self.items.push(ItemSpec::TypeName(name.into()));
        self
    }

    pub fn candidate_policy(mut self, policy: CandidatePolicy) -> Self {
        self.container_options.push("candidate_policy");
        self.policy = policy;
        self
    }

    /// Adds a step run on every prepared element.
    pub fn each(mut self, step: impl PreparationStep + 'static) -> Self {
        self.container_options.push("each");
        self.each.push(Arc::new(step));
        self
    }

    pub fn unique_items(mut self, unique: bool) -> Self {
        self.container_options.push("unique_items");
        self.unique_items = unique;
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        self.container_options.push("min_items");
        self.min_items = Some(count);
        self
    }

    pub fn max_items(mut self, count: usize) -> Self {
        self.container_options.push("max_items");
        self.max_items = Some(count);
        self
    }

    // ── objects ────────────────────────────────────────────────────────────

    pub fn property(mut self, property: ParameterBuilder) -> Self {
        self.container_options.push("property");
        self.properties.push(property);
        self
    }

    /// Whether undeclared properties pass through (default) or are errors.
    pub fn additional_properties(mut self, allow: bool) -> Self {
        self.container_options.push("additional_properties");
        self.additional_properties = allow;
        self
    }

    pub fn min_properties(mut self, count: usize) -> Self {
        self.container_options.push("min_properties");
        self.min_properties = Some(count);
        self
    }

    pub fn max_properties(mut self, count: usize) -> Self {
        self.container_options.push("max_properties");
        self.max_properties = Some(count);
        self
    }

    // ── build ──────────────────────────────────────────────────────────────

    pub fn build(self) -> Result<ParameterDefinition, DefinitionError> {
        self.check_container_options()?;
        self.check_bounds()?;

        let format = match self.format {
            None => None,
            Some(FormatSpec::Resolved(format)) => Some(format),
            Some(FormatSpec::Lookup(lookup)) => Some(lookup?),
        };
        if let Some(format) = &format {
            if format.applies_to() != self.ty {
                return Err(DefinitionError::FormatTypeMismatch {
                    format: format.name().to_owned(),
                    expected: format.applies_to().to_string(),
                    actual: self.ty.to_string(),
                });
            }
        }

        let mut rules = format
            .as_ref()
            .map(|f| f.validation_rules())
            .unwrap_or_default();
        rules.extend(self.min_length.map(ValidationRule::min_length));
        rules.extend(self.max_length.map(ValidationRule::max_length));
        if let Some(pattern) = &self.pattern {
            let rule = ValidationRule::pattern(pattern).map_err(|err| {
                DefinitionError::InvalidPattern {
                    name: self.name.clone(),
                    pattern: pattern.clone(),
                    reason: err.to_string(),
                }
            })?;
            rules.push(rule);
        }
        rules.extend(self.minimum.map(|(b, ex)| ValidationRule::minimum(b, ex)));
        rules.extend(self.maximum.map(|(b, ex)| ValidationRule::maximum(b, ex)));
        rules.extend(self.multiple_of.map(ValidationRule::multiple_of));
        if self.unique_items {
            rules.push(ValidationRule::unique_items());
        }
        rules.extend(self.min_items.map(ValidationRule::min_items));
        rules.extend(self.max_items.map(ValidationRule::max_items));
        rules.extend(self.min_properties.map(ValidationRule::min_properties));
        rules.extend(self.max_properties.map(ValidationRule::max_properties));
        rules.extend(self.rules);

        let format_steps = format
            .as_ref()
            .map(|f| f.preparation_steps())
            .unwrap_or_default();

        let mut steps: Vec<Arc<dyn PreparationStep>> = Vec::new();
        if self.trim {
            steps.push(Arc::new(TrimStep));
        }
        if let Some(allowed) = &self.enum_values {
            steps.push(Arc::new(EnumCheckStep::new(allowed.iter().cloned())));
        }
        steps.extend(self.steps);

        let container = match self.ty {
            ParameterType::Array => {
                let mut candidates = Vec::with_capacity(self.items.len());
                for item in self.items {
                    let definition = match item {
                        ItemSpec::Type(ty) => ParameterBuilder::new(ty.name(), ty)
                            .allow_type_cast(self.allow_type_cast)
                            .build()?,
                        ItemSpec::TypeName(name) => {
                            let ty = name.parse::<ParameterType>()?;
                            ParameterBuilder::new(ty.name(), ty)
                                .allow_type_cast(self.allow_type_cast)
                                .build()?
                        }
                        ItemSpec::Definition(builder) => (*builder).build()?,
                    };
                    candidates.push(definition);
                }
                Some(Container::Array(ArraySpec::new(
                    candidates,
                    self.policy,
                    self.each,
                )))
            }
            ParameterType::Object => {
                let mut properties = IndexMap::with_capacity(self.properties.len());
                for builder in self.properties {
                    let definition = builder.build()?;
                    if properties.contains_key(definition.name()) {
                        return Err(DefinitionError::DuplicateName {
                            name: definition.name().to_owned(),
                        });
                    }
                    properties.insert(definition.name().to_owned(), definition);
                }
                Some(Container::Object(ObjectSpec::new(
                    properties,
                    self.additional_properties,
                )))
            }
            _ => None,
        };

        let sensitive = self.sensitive || format.as_ref().is_some_and(|f| f.is_sensitive());

        tracing::trace!(
            parameter = %self.name,
            ty = %self.ty,
            rules = rules.len(),
            steps = format_steps.len() + steps.len(),
            "parameter definition built"
        );

        Ok(ParameterDefinition {
            name: self.name,
            ty: self.ty,
            required: self.required,
            default: self.default,
            allow_type_cast: self.allow_type_cast,
            nullable: self.nullable,
            description: self.description,
            deprecated: self.deprecated,
            sensitive,
            format,
            rules,
            format_steps,
            steps,
            enum_values: self.enum_values,
            container,
        })
    }

    fn check_container_options(&self) -> Result<(), DefinitionError> {
        let array_only = [
            "item",
            "allowed_type",
            "candidate_policy",
            "each",
            "unique_items",
            "min_items",
            "max_items",
        ];
        for &option in &self.container_options {
            let allowed = if array_only.contains(&option) {
                self.ty == ParameterType::Array
            } else {
                self.ty == ParameterType::Object
            };
            if !allowed {
                return Err(DefinitionError::NotAContainer {
                    name: self.name.clone(),
                    option,
                    ty: self.ty.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_bounds(&self) -> Result<(), DefinitionError> {
        let inverted = |what: &str, low: String, high: String| DefinitionError::InvalidBounds {
            name: self.name.clone(),
            reason: format!("{what}: minimum {low} is greater than maximum {high}"),
        };
        if let (Some(low), Some(high)) = (self.min_length, self.max_length) {
            if low > high {
                return Err(inverted("length", low.to_string(), high.to_string()));
            }
        }
        if let (Some((low, _)), Some((high, _))) = (self.minimum, self.maximum) {
            if low > high {
                return Err(inverted("value", low.to_string(), high.to_string()));
            }
        }
        if let (Some(low), Some(high)) = (self.min_items, self.max_items) {
            if low > high {
                return Err(inverted("items", low.to_string(), high.to_string()));
            }
        }
        if let (Some(low), Some(high)) = (self.min_properties, self.max_properties) {
            if low > high {
                return Err(inverted("properties", low.to_string(), high.to_string()));
            }
        }
        if self.multiple_of.is_some_and(|f| f <= 0.0 || !f.is_finite()) {
            return Err(DefinitionError::InvalidBounds {
                name: self.name.clone(),
                reason: "multiple_of must be a positive number".to_owned(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for ParameterBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBuilder")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl TryFrom<ParameterBuilder> for ParameterDefinition {
    type Error = DefinitionError;

    fn try_from(builder: ParameterBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
