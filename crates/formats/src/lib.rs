//! Built-in formats, deserializers and scope presets for `openparams`.
//!
//! - [`format`]: OpenAPI string and number formats (`date-time`, `byte`,
//!   `uuid`, `int32`, ...) plus [`standard_registry`](format::standard_registry).
//! - [`deserializer`]: flat-text and JSON decoding of raw request text.
//! - [`context`]: `query`, `header`, `path` and `body` contexts with the
//!   matching deserializer bound.
//! - [`shortcuts`]: builders with the format already attached.
//!
//! ```
//! use openparams::prelude::*;
//! use openparams_formats::context::query_context;
//! use serde_json::json;
//!
//! let list = ParameterList::builder("filter")
//!     .context(query_context())
//!     .parameter(ParameterDefinition::object("range"))
//!     .parameter(ParameterDefinition::integer("limit"))
//!     .build()?;
//!
//! let prepared = list
//!     .prepare([("range", json!("from=1,to=9")), ("limit", json!("20"))])
//!     .unwrap();
//! assert_eq!(prepared["range"], json!({"from": "1", "to": "9"}));
//! assert_eq!(prepared["limit"], json!(20));
//! # Ok::<(), openparams::error::DefinitionError>(())
//! ```

pub mod context;
pub mod deserializer;
pub mod error;
pub mod format;
pub mod shortcuts;

pub mod prelude {
    pub use crate::context::{body_context, header_context, path_context, query_context};
    pub use crate::deserializer::{JsonDeserializer, StandardDeserializer};
    pub use crate::error::FormatError;
    pub use crate::format::{
        AlphanumericFormat, BinaryFormat, ByteFormat, CsvFormat, DateFormat, DateTimeFormat,
        DoubleFormat, EmailFormat, FloatFormat, Int32Format, Int64Format, PasswordFormat,
        UuidFormat, YesNoFormat, extend_standard, standard_registry,
    };
}
