//! Ordered tool registry with by-name dispatch.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolOutcome;
use super::validation::validate_arguments;
use crate::error::HelmError;
use crate::provider::ToolDefinition;

/// The set of tools an agent may invoke. Names are unique; order is the
/// registration order and is preserved in the definitions sent to providers.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails with [`HelmError::DuplicateTool`] when the name
    /// is already taken.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), HelmError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register an already shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), HelmError> {
        if self.get(tool.name()).is_some() {
            return Err(HelmError::DuplicateTool(tool.name().to_string()));
        }
        debug!(tool = tool.name(), "registered tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Result<Self, HelmError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Provider-facing descriptions of every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    /// Look up `name`, validate `arguments`, and run the tool.
    ///
    /// Errors:
    /// - [`HelmError::UnknownTool`] when no tool has that name.
    /// - [`HelmError::InvalidArgument`] when the arguments violate the schema.
    /// - [`HelmError::ToolExecution`] when the tool returns an error or panics.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: &serde_json::Value,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolOutcome, HelmError> {
        let tool = self
            .get(name)
            .ok_or_else(|| HelmError::UnknownTool(name.to_string()))?;
        validate_arguments(name, arguments, tool.parameters())?;

        let args = ToolArguments::new(arguments.clone());
        match AssertUnwindSafe(tool.execute(&args, ctx)).catch_unwind().await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(HelmError::ToolExecution { tool_name, message })) => {
                Err(HelmError::ToolExecution { tool_name, message })
            }
            Ok(Err(err)) => Err(HelmError::tool_execution(name, err.to_string())),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(tool = name, %message, "tool panicked");
                Err(HelmError::tool_execution(name, format!("tool panicked: {message}")))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
