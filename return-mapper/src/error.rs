use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapperError {
    /// A payload that should be a tree was some other JSON value
    #[error("Invalid payload: expected an object, got {found}")]
    InvalidPayload { found: &'static str },
}

/// Check that `value` can be treated as a data tree.
///
/// Objects qualify. `null` stands for an absent tree and is accepted too.
pub fn ensure_tree(value: &Value) -> Result<(), MapperError> {
    match value {
        Value::Object(_) | Value::Null => Ok(()),
        other => Err(MapperError::InvalidPayload {
            found: kind_of(other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
