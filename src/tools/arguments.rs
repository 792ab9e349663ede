//! Typed accessors over the JSON arguments a model supplies to a tool.

use serde::de::DeserializeOwned;

use crate::error::HelmError;

/// Arguments passed to a tool, as decoded from the model's tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    raw: serde_json::Value,
}

impl ToolArguments {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// Get a required string argument.
    pub fn get_str(&self, name: &str) -> Result<&str, HelmError> {
        self.raw
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| missing(name, "string"))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, name: &str) -> Option<&str> {
        self.raw.get(name).and_then(|v| v.as_str())
    }

    /// Get a required integer argument.
    pub fn get_i64(&self, name: &str) -> Result<i64, HelmError> {
        self.raw
            .get(name)
            .and_then(|v| v.as_i64())
            .ok_or_else(|| missing(name, "integer"))
    }

    /// Get a required boolean argument.
    pub fn get_bool(&self, name: &str) -> Result<bool, HelmError> {
        self.raw
            .get(name)
            .and_then(|v| v.as_bool())
            .ok_or_else(|| missing(name, "boolean"))
    }

    /// Deserialize all arguments into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, HelmError> {
        serde_json::from_value(self.raw.clone())
            .map_err(|e| HelmError::InvalidArgument(e.to_string()))
    }
}

fn missing(name: &str, kind: &str) -> HelmError {
    HelmError::InvalidArgument(format!("missing or non-{kind} argument '{name}'"))
}
