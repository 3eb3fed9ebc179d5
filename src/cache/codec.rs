//! Value Codec Module
//!
//! Text encoding of cached values. Writes are permissive, reads only
//! reinterpret text that is clearly structured.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

// == Encode ==
/// Converts a value into the text written to the store.
///
/// Strings are written verbatim and other scalars as their textual form.
/// Objects, arrays and `null` are serialized as compact JSON.
pub fn encode(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Ok(serde_json::to_string(value)?),
    }
}

// == Decode ==
/// Converts stored text back into a value.
///
/// Only JSON whose top level is an object or an array is decoded. Anything
/// else, including text that parses as a JSON scalar, comes back as the
/// exact stored string. Nesting depth is not limited, so anything `encode`
/// wrote comes back with the same shape.
pub fn decode(raw: String) -> Value {
    match parse_unbounded(&raw) {
        Ok(structured @ (Value::Object(_) | Value::Array(_))) => structured,
        _ => Value::String(raw),
    }
}

fn parse_unbounded(raw: &str) -> serde_json::Result<Value> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}
