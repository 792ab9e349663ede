//! Check model-supplied tool arguments against a tool's declared parameters.

use serde_json::Value;

use super::types::AgentToolParameters;
use crate::error::HelmError;

/// Validate arguments against a tool's parameter schema.
///
/// Checks, in order: the arguments form an object, every required parameter is
/// present, each declared parameter has the declared JSON type, and string
/// enums hold one of the allowed values. Undeclared extra fields pass through.
/// The first violation is reported as [`HelmError::InvalidArgument`].
pub fn validate_arguments(
    tool_name: &str,
    args: &Value,
    parameters: &AgentToolParameters,
) -> Result<(), HelmError> {
    let schema = &parameters.schema;
    let invalid = |detail: String| HelmError::InvalidArgument(format!("{tool_name}: {detail}"));

    let expects_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let obj = match args {
        Value::Object(obj) => obj,
        Value::Null if !expects_object => return Ok(()),
        other if expects_object => {
            return Err(invalid(format!("expected object arguments, got {}", type_name(other))))
        }
        _ => return Ok(()),
    };

    for name in parameters.required() {
        if !obj.contains_key(name) {
            return Err(invalid(format!("missing required parameter '{name}'")));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    for (key, value) in obj {
        let Some(prop) = properties.get(key) else { continue };
        if let Some(expected) = prop.get("type").and_then(Value::as_str) {
            if !matches_type(value, expected) {
                return Err(invalid(format!(
                    "parameter '{key}' expected {expected}, got {}",
                    type_name(value)
                )));
            }
        }
        if let Some(allowed) = prop.get("enum").and_then(Value::as_array) {
            if !allowed.contains(value) {
                return Err(invalid(format!("parameter '{key}' is not one of {}", Value::from(allowed.clone()))));
            }
        }
    }

    Ok(())
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
