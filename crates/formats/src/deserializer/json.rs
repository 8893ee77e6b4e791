use openparams::deserializer::Deserializer;
use openparams::error::DeserializeError;
use openparams::kind::ParameterType;
use serde_json::Value;

/// Decodes text as a JSON document. Text aimed at a `string` parameter is
/// taken as is, so `hello` does not need to be written as `"hello"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl Deserializer for JsonDeserializer {
    fn deserialize(&self, raw: &str, target: ParameterType) -> Result<Value, DeserializeError> {
        if target == ParameterType::String {
            return Ok(Value::String(raw.to_owned()));
        }
        serde_json::from_str(raw).map_err(|error| {
            tracing::trace!(%target, %error, "json deserialization failed");
            DeserializeError::new(format!("invalid JSON: {error}"))
        })
    }
}
