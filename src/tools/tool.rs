//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::schema::ToolParameters;
use crate::error::MagpieError;

/// Core tool trait — implement to create custom tools.
///
/// A tool is a pure async function from typed arguments to a JSON-shaped
/// result. Successful results carry `"status": "success"` (or
/// `"no_results"`); failures may either return an `Err` or a
/// `"status": "error"` payload — the dispatcher normalizes both.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &ToolParameters;

    /// Execute the tool with parsed arguments.
    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value, MagpieError>;
}

type ToolHandler = dyn Fn(ToolArguments) -> Pin<Box<dyn Future<Output = Result<serde_json::Value, MagpieError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct ResearchTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl ResearchTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, MagpieError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for ResearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value, MagpieError> {
        (self.handler)(args.clone()).await
    }
}

impl std::fmt::Debug for ResearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_tool_executes() {
        let tool = ResearchTool::new(
            "echo",
            "Echo the input back",
            ToolParameters::object().string("text", "text to echo", true).build(),
            |args| async move {
                let text = args.get_str("text")?.to_string();
                Ok(serde_json::json!({"status": "success", "echo": text}))
            },
        );

        let args = ToolArguments::new(serde_json::json!({"text": "hello"}));
        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result["echo"], "hello");
    }

    #[tokio::test]
    async fn missing_argument_is_an_error() {
        let tool = ResearchTool::new(
            "echo",
            "Echo the input back",
            ToolParameters::object().string("text", "text to echo", true).build(),
            |args| async move {
                let text = args.get_str("text")?.to_string();
                Ok(serde_json::json!({"echo": text}))
            },
        );

        let args = ToolArguments::new(serde_json::json!({}));
        assert!(tool.execute(&args).await.is_err());
    }
}
