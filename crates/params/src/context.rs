//! Per-scope configuration of a preparation.

use std::borrow::Cow;
use std::sync::Arc;

use crate::deserializer::Deserializer;
use crate::log::{PipelineEvent, PipelineLogger, TracingLogger};

/// Where values come from and how they are observed.
///
/// Cheap to clone; shared between a [`ParameterList`](crate::list::ParameterList)
/// and every [`ParameterValues`](crate::values::ParameterValues) it creates.
#[derive(Debug, Clone)]
pub struct ParameterValuesContext {
    scope: Cow<'static, str>,
    deserializer: Option<Arc<dyn Deserializer>>,
    logger: Option<Arc<dyn PipelineLogger>>,
}

impl ParameterValuesContext {
    /// A context with no deserializer that logs through `tracing`.
    pub fn new(scope: impl Into<Cow<'static, str>>) -> Self {
        Self {
            scope: scope.into(),
            deserializer: None,
            logger: Some(Arc::new(TracingLogger)),
        }
    }

    #[must_use]
    pub fn with_deserializer(mut self, deserializer: impl Deserializer + 'static) -> Self {
        self.deserializer = Some(Arc::new(deserializer));
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.logger = None;
        self
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    #[must_use]
    pub fn deserializer(&self) -> Option<&dyn Deserializer> {
        self.deserializer.as_deref()
    }

    #[must_use]
    pub fn has_logger(&self) -> bool {
        self.logger.is_some()
    }

    pub(crate) fn emit(&self, event: &PipelineEvent<'_>) {
        if let Some(logger) = &self.logger {
            logger.on_event(event);
        }
    }
}

impl Default for ParameterValuesContext {
    fn default() -> Self {
        Self::new("default")
    }
}
