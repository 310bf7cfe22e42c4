//! Printing command results.

use serde::Serialize;
use serde_json::Value;

use common::AppResult;

/// Serialize a command result into the value printed to stdout.
pub fn to_value<T: Serialize>(value: &T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Single-field confirmation, e.g. `{"removed": 2}`
pub fn field(name: &str, value: impl Into<Value>) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(name.to_string(), value.into());
    Value::Object(map)
}

/// Render a result. Strings print bare, everything else as pretty JSON.
pub fn render(value: &Value) -> AppResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

pub fn print(value: &Value) -> AppResult<()> {
    let text = render(value)?;
    if !text.is_empty() {
        println!("{}", text);
    }
    Ok(())
}
