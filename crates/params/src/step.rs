//! Preparation steps.
//!
//! Steps run after validation succeeded and transform the value in order.
//! The first failing step aborts the rest.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::StepError;
use crate::values::ParameterValues;

/// What a step can see besides the value it transforms.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'v, 'a> {
    /// Name of the parameter (or property) being prepared.
    pub name: &'v str,
    /// Every value of the current invocation.
    pub values: &'v ParameterValues<'a>,
}

/// One ordered transformation of a validated value.
pub trait PreparationStep: Send + Sync + fmt::Debug {
    /// Short description, used in errors and logs.
    fn describe(&self) -> String;

    /// Text for API documentation, if the step imposes a visible constraint.
    fn documentation(&self) -> Option<String> {
        None
    }

    fn prepare(&self, value: Value, ctx: &StepContext<'_, '_>) -> Result<Value, StepError>;
}

type Callback = dyn Fn(Value, &StepContext<'_, '_>) -> Result<Value, StepError> + Send + Sync;

/// A step built from a closure.
#[derive(Clone)]
pub struct CallbackStep {
    description: String,
    documentation: Option<String>,
    callback: Arc<Callback>,
}

impl CallbackStep {
    pub fn new<F>(description: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Value, &StepContext<'_, '_>) -> Result<Value, StepError> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            documentation: None,
            callback: Arc::new(callback),
        }
    }

    /// A step that cannot fail.
    pub fn map<F>(description: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(description, move |value, _| Ok(f(value)))
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

impl fmt::Debug for CallbackStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackStep")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl PreparationStep for CallbackStep {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn documentation(&self) -> Option<String> {
        self.documentation.clone()
    }

    fn prepare(&self, value: Value, ctx: &StepContext<'_, '_>) -> Result<Value, StepError> {
        (self.callback)(value, ctx)
    }
}

/// Trims whitespace from string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimStep;

impl PreparationStep for TrimStep {
    fn describe(&self) -> String {
        "trim whitespace".to_owned()
    }

    fn prepare(&self, value: Value, _ctx: &StepContext<'_, '_>) -> Result<Value, StepError> {
        Ok(match value {
            Value::String(s) if s.trim().len() != s.len() => Value::String(s.trim().to_owned()),
            other => other,
        })
    }
}

/// Rejects values outside a fixed set.
///
/// Comparison is loose: numbers compare by numeric value and scalars compare
/// with their string form, so `"1"` matches `1`.
#[derive(Debug, Clone)]
pub struct EnumCheckStep {
    allowed: Vec<Value>,
}

impl EnumCheckStep {
    pub fn new(allowed: impl IntoIterator<Item = Value>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn allowed(&self) -> &[Value] {
        &self.allowed
    }

    fn allowed_list(&self) -> String {
        if self.allowed.is_empty() {
            return "(empty set)".to_owned();
        }
        self.allowed
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{}]", items.iter().map(render).collect::<Vec<_>>().join(", ")),
        Value::Object(map) => map.values().map(render).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => {
            let digit = if *b { "1" } else { "0" };
            s == digit || s.eq_ignore_ascii_case(&b.to_string())
        }
        _ => a == b,
    }
}

impl PreparationStep for EnumCheckStep {
    fn describe(&self) -> String {
        format!("check value against allowed values: {}", self.allowed_list())
    }

    fn prepare(&self, value: Value, _ctx: &StepContext<'_, '_>) -> Result<Value, StepError> {
        if self.allowed.iter().any(|allowed| loosely_equal(allowed, &value)) {
            Ok(value)
        } else {
            Err(StepError::invalid(format!(
                "value must be one of: {}",
                self.allowed_list()
            )))
        }
    }
}
