//! Concrete [`Deserializer`](openparams::deserializer::Deserializer)s.
//!
//! [`StandardDeserializer`] reads the flat text of query strings, headers and
//! path segments. [`JsonDeserializer`] reads JSON documents, typically the
//! fields of a request body that arrived as text.

mod json;
mod standard;

pub use json::JsonDeserializer;
pub use standard::StandardDeserializer;
