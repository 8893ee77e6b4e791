//! Built-in [`Format`] implementations.
//!
//! Each format contributes rules that reject malformed input and, where the
//! format has a canonical form, a step that rewrites the value into it.
//! Register them all at once with [`standard_registry`].

use std::sync::Arc;

use openparams::error::{DefinitionError, StepError};
use openparams::format::{Format, FormatRegistry};
use openparams::rule::ValidationRule;
use openparams::step::{CallbackStep, PreparationStep};
use serde_json::Value;

mod boolean;
mod byte;
mod date;
mod email;
mod numeric;
mod string;

pub use boolean::YesNoFormat;
pub use byte::ByteFormat;
pub use date::{DateFormat, DateTimeFormat};
pub use email::{EmailFormat, valid_email_local_part};
pub use numeric::{DoubleFormat, FloatFormat, Int32Format, Int64Format};
pub use string::{AlphanumericFormat, BinaryFormat, CsvFormat, PasswordFormat, UuidFormat};

pub(crate) use string::split_list;

/// A registry holding every built-in format.
pub fn standard_registry() -> Result<FormatRegistry, DefinitionError> {
    let mut registry = FormatRegistry::new();
    extend_standard(&mut registry)?;
    Ok(registry)
}

/// Adds the built-in formats to an existing registry.
///
/// Fails if the registry already holds a format under one of the built-in
/// `(type, name)` keys.
pub fn extend_standard(registry: &mut FormatRegistry) -> Result<(), DefinitionError> {
    let before = registry.len();
    registry
        .register(ByteFormat)?
        .register(BinaryFormat)?
        .register(DateFormat)?
        .register(DateTimeFormat)?
        .register(EmailFormat)?
        .register(UuidFormat)?
        .register(AlphanumericFormat::default())?
        .register(CsvFormat::default())?
        .register(YesNoFormat)?
        .register(PasswordFormat)?
        .register(Int32Format)?
        .register(Int64Format)?
        .register(FloatFormat)?
        .register(DoubleFormat)?;
    tracing::debug!(added = registry.len() - before, total = registry.len(), "standard formats registered");
    Ok(())
}

/// A rule that only inspects string values.
fn string_rule<F>(message: &'static str, check: F) -> ValidationRule
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    ValidationRule::new(message, move |value| value.as_str().is_none_or(|s| check(s)))
}

/// A step that rewrites string values and passes everything else through.
fn string_step<F>(description: &'static str, convert: F) -> Arc<dyn PreparationStep>
where
    F: Fn(&str) -> Result<Value, StepError> + Send + Sync + 'static,
{
    Arc::new(CallbackStep::new(description, move |value, _| match value {
        Value::String(s) => convert(&s),
        other => Ok(other),
    }))
}

#[cfg(test)]
pub(crate) mod testing {
    use openparams::context::ParameterValuesContext;
    use openparams::definition::ParameterDefinition;
    use openparams::error::AggregateError;
    use openparams::format::Format;
    use serde_json::Value;

    /// Prepares `raw` through a single definition carrying `format`.
    pub fn prepare<F: Format + 'static>(format: F, raw: Value) -> Result<Value, AggregateError> {
        let def = ParameterDefinition::builder("test", format.applies_to())
            .format(format)
            .build()
            .unwrap();
        def.prepare_single(raw, &ParameterValuesContext::default().without_logging())
    }

    pub fn messages(err: &AggregateError) -> Vec<&str> {
        err.iter().map(|e| e.message.as_str()).collect()
    }
}
