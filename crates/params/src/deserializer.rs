//! The deserializer seam.
//!
//! Query strings, headers and path segments arrive as text. A [`Deserializer`]
//! bound to the context turns that text into a structured value for the
//! declared type before the type check runs. Concrete implementations live
//! in `openparams-formats`.

use std::fmt;

use serde_json::Value;

use crate::error::DeserializeError;
use crate::kind::ParameterType;

pub trait Deserializer: Send + Sync + fmt::Debug {
    /// Decodes `raw` into a value intended for `target`.
    ///
    /// The result is still type checked afterwards; returning a value of the
    /// wrong shape produces a type mismatch, not a panic.
    fn deserialize(&self, raw: &str, target: ParameterType) -> Result<Value, DeserializeError>;
}
