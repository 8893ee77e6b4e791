//! Typed request parameter preparation.
//!
//! Parameters are declared once with [`ParameterDefinition`] builders and
//! grouped into a [`ParameterList`]. Preparing the list runs every parameter
//! through the same pipeline (deserialize, type check or cast, validate,
//! prepare) and returns either every prepared value or every error, each
//! addressed by a JSON pointer such as `/items/1/firstName`.
//!
//! ```
//! use openparams::prelude::*;
//! use serde_json::json;
//!
//! let list = ParameterList::builder("signup")
//!     .parameter(ParameterDefinition::integer("age").minimum(18.0))
//!     .parameter(ParameterDefinition::string("email").required(true))
//!     .build()?;
//!
//! let err = list.prepare([("age", json!(12))]).unwrap_err();
//! assert_eq!(err.pointers(), vec!["/age", "/email"]);
//! # Ok::<(), openparams::error::DefinitionError>(())
//! ```
//!
//! [`ParameterDefinition`]: definition::ParameterDefinition
//! [`ParameterList`]: list::ParameterList

pub mod container;
pub mod context;
pub mod definition;
pub mod deserializer;
mod documentation;
pub mod error;
pub mod format;
pub mod kind;
pub mod list;
pub mod log;
pub mod pointer;
pub mod rule;
pub mod step;
pub mod values;

pub mod prelude {
    pub use crate::container::CandidatePolicy;
    pub use crate::context::ParameterValuesContext;
    pub use crate::definition::{ParameterBuilder, ParameterDefinition};
    pub use crate::deserializer::Deserializer;
    pub use crate::error::{
        AggregateError, DefinitionError, DeserializeError, ErrorKind, StepError, ValidationError,
    };
    pub use crate::format::{Format, FormatRegistry};
    pub use crate::kind::ParameterType;
    pub use crate::list::{ListOptions, ParameterList, PreparedValues};
    pub use crate::log::{PipelineEvent, PipelineLogger, Stage, TracingLogger};
    pub use crate::pointer::Pointer;
    pub use crate::rule::ValidationRule;
    pub use crate::step::{CallbackStep, EnumCheckStep, PreparationStep, StepContext, TrimStep};
    pub use crate::values::ParameterValues;
}
