//! Tool-related types: parameter schemas and structured results.

use serde::{Deserialize, Serialize};

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl AgentToolParameters {
    /// Create from a raw JSON Schema value.
    pub fn from_schema(schema: serde_json::Value) -> Self {
        Self { schema }
    }

    /// Create an empty parameter schema (no parameters).
    pub fn empty() -> Self {
        Self {
            schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        }
    }

    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }

    /// Declared type of a parameter, if the schema names one.
    pub fn parameter_type(&self, name: &str) -> Option<&str> {
        self.schema
            .get("properties")?
            .get(name)?
            .get("type")?
            .as_str()
    }

    /// Names of required parameters, in declaration order.
    pub fn required(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    fn property(mut self, name: String, schema: serde_json::Value, required: bool) -> Self {
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let schema = serde_json::json!({ "type": "string", "description": description.into() });
        self.property(name.into(), schema, required)
    }

    /// Add a number property.
    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let schema = serde_json::json!({ "type": "number", "description": description.into() });
        self.property(name.into(), schema, required)
    }

    /// Add an integer property.
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let schema = serde_json::json!({ "type": "integer", "description": description.into() });
        self.property(name.into(), schema, required)
    }

    /// Add a boolean property.
    pub fn boolean(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        let schema = serde_json::json!({ "type": "boolean", "description": description.into() });
        self.property(name.into(), schema, required)
    }

    /// Add an enum (string) property.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        let schema = serde_json::json!({
            "type": "string",
            "description": description.into(),
            "enum": values,
        });
        self.property(name.into(), schema, required)
    }

    /// Build into AgentToolParameters.
    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

/// Structured result of a tool invocation.
///
/// Serializes as `{"status": "success", "report": ...}` or
/// `{"status": "error", "error_message": ...}`, which is the shape the model
/// sees in its context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success {
        report: String,
    },
    Error {
        #[serde(rename = "error_message")]
        message: String,
    },
}

impl ToolOutcome {
    pub fn success(report: impl Into<String>) -> Self {
        Self::Success {
            report: report.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The `status` tag: `"success"` or `"error"`.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    /// JSON form fed back to the model.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Success { report } => serde_json::json!({ "status": "success", "report": report }),
            Self::Error { message } => {
                serde_json::json!({ "status": "error", "error_message": message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let ok = serde_json::to_value(ToolOutcome::success("sunny")).unwrap();
        assert_eq!(ok, serde_json::json!({"status": "success", "report": "sunny"}));

        let err = serde_json::to_value(ToolOutcome::error("nope")).unwrap();
        assert_eq!(err, serde_json::json!({"status": "error", "error_message": "nope"}));
    }

    #[test]
    fn to_value_matches_serde_form() {
        let outcome = ToolOutcome::error("bad city");
        assert_eq!(outcome.to_value(), serde_json::to_value(&outcome).unwrap());
    }

    #[test]
    fn parameter_introspection() {
        let params = AgentToolParameters::object()
            .string("city", "City", true)
            .integer("days", "Days", false)
            .build();
        assert_eq!(params.parameter_type("city"), Some("string"));
        assert_eq!(params.parameter_type("days"), Some("integer"));
        assert_eq!(params.parameter_type("missing"), None);
        assert_eq!(params.required(), vec!["city"]);
    }
}
