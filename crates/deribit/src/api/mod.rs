//! Endpoint wrappers.
//!
//! Each wrapper maps its arguments onto a params object and hands it to
//! [`DeribitClient::request`](crate::DeribitClient::request). Results are
//! returned as the parsed `result` value unless a method says otherwise.

mod account;
mod market_data;
mod public;
mod trading;

pub use trading::{Order, OrderType, SIMULATION_INFO, Side};

use serde_json::Value;

use crate::error::Error;

/// Look up `key` in an object result.
pub(crate) fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, Error> {
    value.get(key).ok_or_else(|| Error::Decode {
        message: format!("missing field `{}`", key),
    })
}

/// Look up a numeric field.
pub(crate) fn f64_field(value: &Value, key: &str) -> Result<f64, Error> {
    field(value, key)?.as_f64().ok_or_else(|| Error::Decode {
        message: format!("field `{}` is not a number", key),
    })
}

/// Look up a string field.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Result<&'a str, Error> {
    field(value, key)?.as_str().ok_or_else(|| Error::Decode {
        message: format!("field `{}` is not a string", key),
    })
}

/// Take the array out of a result.
pub(crate) fn into_array(value: Value) -> Result<Vec<Value>, Error> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::Decode {
            message: format!("expected an array, got {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
