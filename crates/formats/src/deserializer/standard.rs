use openparams::deserializer::Deserializer;
use openparams::error::DeserializeError;
use openparams::kind::ParameterType;
use serde_json::{Map, Number, Value};

use crate::format::split_list;

/// Flat-text decoding.
///
/// | target    | accepted text                          |
/// |-----------|----------------------------------------|
/// | `string`  | anything, unchanged                    |
/// | `integer` | an integer literal                     |
/// | `number`  | an integer or decimal literal          |
/// | `boolean` | `true`, `false`, `1`, `0`              |
/// | `array`   | `a,b,c` (empty text is the empty array) |
/// | `object`  | `k=v,k2=v2`                            |
///
/// Array items and object values stay strings; the item and property
/// definitions cast them further if they allow it.
#[derive(Debug, Clone, Copy)]
pub struct StandardDeserializer {
    separator: char,
    pair_separator: char,
}

impl Default for StandardDeserializer {
    fn default() -> Self {
        Self {
            separator: ',',
            pair_separator: '=',
        }
    }
}

impl StandardDeserializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator between array items and object pairs.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Separator between a key and its value inside an object pair.
    #[must_use]
    pub fn with_pair_separator(mut self, separator: char) -> Self {
        self.pair_separator = separator;
        self
    }

    fn object(&self, raw: &str) -> Result<Value, DeserializeError> {
        let mut map = Map::new();
        for pair in split_list(raw, self.separator) {
            let Value::String(pair) = pair else { continue };
            let (key, value) = pair.split_once(self.pair_separator).ok_or_else(|| {
                DeserializeError::new(format!(
                    "`{pair}` is not a `key{}value` pair",
                    self.pair_separator
                ))
            })?;
            map.insert(key.trim().to_owned(), Value::String(value.trim().to_owned()));
        }
        Ok(Value::Object(map))
    }
}

fn integer(raw: &str) -> Result<Value, DeserializeError> {
    raw.trim()
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| DeserializeError::new(format!("`{raw}` is not an integer")))
}

fn number(raw: &str) -> Result<Value, DeserializeError> {
    if let Ok(value) = integer(raw) {
        return Ok(value);
    }
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| DeserializeError::new(format!("`{raw}` is not a number")))
}

fn boolean(raw: &str) -> Result<Value, DeserializeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(Value::Bool(true)),
        "false" | "0" => Ok(Value::Bool(false)),
        _ => Err(DeserializeError::new(format!("`{raw}` is not a boolean"))),
    }
}

impl Deserializer for StandardDeserializer {
    fn deserialize(&self, raw: &str, target: ParameterType) -> Result<Value, DeserializeError> {
        let result = match target {
            ParameterType::String => Ok(Value::String(raw.to_owned())),
            ParameterType::Integer => integer(raw),
            ParameterType::Number => number(raw),
            ParameterType::Boolean => boolean(raw),
            ParameterType::Array => Ok(Value::Array(split_list(raw, self.separator))),
            ParameterType::Object => self.object(raw),
        };
        if let Err(error) = &result {
            tracing::trace!(%target, %error, "standard deserialization failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn de(raw: &str, target: ParameterType) -> Result<Value, DeserializeError> {
        StandardDeserializer::new().deserialize(raw, target)
    }

    #[test]
    fn scalars() {
        assert_eq!(de("x y", ParameterType::String).unwrap(), json!("x y"));
        assert_eq!(de(" 42 ", ParameterType::Integer).unwrap(), json!(42));
        assert_eq!(de("42", ParameterType::Number).unwrap(), json!(42));
        assert_eq!(de("25.2", ParameterType::Number).unwrap(), json!(25.2));
        assert_eq!(de("TRUE", ParameterType::Boolean).unwrap(), json!(true));
        assert_eq!(de("0", ParameterType::Boolean).unwrap(), json!(false));
    }

    #[test]
    fn scalar_failures_name_the_input() {
        assert_eq!(de("x", ParameterType::Integer).unwrap_err().message(), "`x` is not an integer");
        assert_eq!(de("1.5", ParameterType::Integer).unwrap_err().message(), "`1.5` is not an integer");
        assert_eq!(de("NaN", ParameterType::Number).unwrap_err().message(), "`NaN` is not a number");
        assert_eq!(de("yes", ParameterType::Boolean).unwrap_err().message(), "`yes` is not a boolean");
    }

    #[test]
    fn arrays() {
        assert_eq!(de("3,x,5", ParameterType::Array).unwrap(), json!(["3", "x", "5"]));
        assert_eq!(de("", ParameterType::Array).unwrap(), json!([]));
        assert_eq!(
            StandardDeserializer::new()
                .with_separator(';')
                .deserialize("a;b", ParameterType::Array)
                .unwrap(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn objects() {
        assert_eq!(
            de("a=apple,b=banana", ParameterType::Object).unwrap(),
            json!({"a": "apple", "b": "banana"})
        );
        assert_eq!(de("", ParameterType::Object).unwrap(), json!({}));
        assert_eq!(
            de("a=1=2", ParameterType::Object).unwrap(),
            json!({"a": "1=2"})
        );
        assert_eq!(
            StandardDeserializer::new()
                .with_pair_separator(':')
                .deserialize("a:1", ParameterType::Object)
                .unwrap(),
            json!({"a": "1"})
        );
    }

    #[test]
    fn object_pair_without_separator_fails() {
        let err = de("a=apple,banana", ParameterType::Object).unwrap_err();
        assert_eq!(err.message(), "`banana` is not a `key=value` pair");
    }
}
