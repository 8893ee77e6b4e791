//! Pipeline observation.
//!
//! Every definition reports its progress through the stages of the pipeline
//! to the [`PipelineLogger`] bound on the context. Loggers only observe; they
//! cannot change the outcome.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

const MASK: &str = "******";

/// Where a value is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NotStarted,
    Deserialized,
    TypeChecked,
    Validated,
    Prepared,
    Failed,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Deserialized => "deserialized",
            Self::TypeChecked => "type_checked",
            Self::Validated => "validated",
            Self::Prepared => "prepared",
            Self::Failed => "failed",
        }
    }

    /// Whether no further stage follows.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Prepared | Self::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage transition of one definition.
#[derive(Debug, Clone, Copy)]
pub struct PipelineEvent<'e> {
    /// Name of the parameter or property.
    pub parameter: &'e str,
    /// Scope of the context, e.g. `query`.
    pub scope: &'e str,
    pub stage: Stage,
    /// The value as it leaves this stage; `None` on failure.
    pub value: Option<&'e Value>,
    /// Errors, when `stage` is [`Stage::Failed`].
    pub errors: &'e [ValidationError],
    pub sensitive: bool,
}

impl PipelineEvent<'_> {
    /// The value rendered for a log line, masked when sensitive.
    #[must_use]
    pub fn display_value(&self) -> Option<Cow<'static, str>> {
        let value = self.value?;
        if self.sensitive {
            Some(Cow::Borrowed(MASK))
        } else {
            Some(Cow::Owned(value.to_string()))
        }
    }
}

/// Receives pipeline events.
pub trait PipelineLogger: Send + Sync + fmt::Debug {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

/// Forwards events to `tracing`.
///
/// Stage transitions are emitted at `trace`, terminal stages at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PipelineLogger for TracingLogger {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        let value = event.display_value();
        let value = value.as_deref().unwrap_or("-");
        match event.stage {
            Stage::Failed => tracing::debug!(
                parameter = event.parameter,
                scope = event.scope,
                errors = event.errors.len(),
                "parameter failed"
            ),
            Stage::Prepared => tracing::debug!(
                parameter = event.parameter,
                scope = event.scope,
                value,
                "parameter prepared"
            ),
            stage => tracing::trace!(
                parameter = event.parameter,
                scope = event.scope,
                stage = %stage,
                value,
                "parameter stage"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn event(value: &Value, sensitive: bool) -> PipelineEvent<'_> {
        PipelineEvent {
            parameter: "password",
            scope: "body",
            stage: Stage::Validated,
            value: Some(value),
            errors: &[],
            sensitive,
        }
    }

    #[test]
    fn sensitive_values_are_masked() {
        let value = json!("hunter2");
        assert_eq!(event(&value, true).display_value().as_deref(), Some("******"));
        assert_eq!(
            event(&value, false).display_value().as_deref(),
            Some("\"hunter2\"")
        );
    }

    #[test]
    fn terminal_stages() {
        assert!(Stage::Prepared.is_terminal());
        assert!(Stage::Failed.is_terminal());
        assert!(!Stage::TypeChecked.is_terminal());
        assert_eq!(Stage::TypeChecked.to_string(), "type_checked");
    }

    #[test]
    fn tracing_logger_emits_without_subscriber() {
        let value = json!(1);
        TracingLogger.on_event(&event(&value, false));
    }

    #[test]
    fn tracing_logger_under_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let value = json!("x");
            TracingLogger.on_event(&event(&value, true));
            TracingLogger.on_event(&PipelineEvent {
                stage: Stage::Failed,
                value: None,
                ..event(&value, false)
            });
        });
    }
}
