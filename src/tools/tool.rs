//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::{AgentToolParameters, ToolOutcome};
use crate::error::HelmError;

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Provider-assigned id of the call being served.
    pub tool_call_id: Option<String>,
    /// Name the model used to request the tool.
    pub tool_name: Option<String>,
    /// Id of the turn this call belongs to.
    pub invocation_id: Option<uuid::Uuid>,
}

/// Core tool trait. Implement it to create custom tools.
///
/// Tools report domain failures through [`ToolOutcome::Error`]. An `Err`
/// return (or a panic) is treated as an execution fault and converted into an
/// error outcome by [`ToolRegistry::dispatch`](super::ToolRegistry::dispatch).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &AgentToolParameters;

    /// Execute the tool with validated arguments.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolOutcome, HelmError>;
}

type ToolHandler = dyn Fn(
        ToolArguments,
        ToolExecutionContext,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutcome, HelmError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
#[derive(Clone)]
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    /// Create a tool from an async closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutcome, HelmError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }

    /// Create a tool from a plain synchronous function.
    pub fn from_fn<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        f: F,
    ) -> Self
    where
        F: Fn(&ToolArguments) -> Result<ToolOutcome, HelmError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(name, description, parameters, move |args, _ctx| {
            let f = Arc::clone(&f);
            async move { f(&args) }
        })
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<ToolOutcome, HelmError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
