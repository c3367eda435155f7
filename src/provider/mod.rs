//! Model provider trait and implementations.

pub mod http;
pub mod openai_compatible;

pub use openai_compatible::OpenAiCompatibleProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Message, ToolCall};

/// Tool definition advertised to the provider API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: serde_json::Value,
}

/// What the model said: text and any tool invocations it requested.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatReply {
    /// Convert into an assistant message for the conversation history.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

/// Boundary to the language model.
///
/// `tools: None` advertises nothing, which is how the control loop forces a
/// plain-text final answer.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Invoke the model with a message history.
    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_into_message_preserves_tool_calls() {
        let reply = ChatReply {
            content: "let me check".into(),
            tool_calls: vec![ToolCall::new(
                "call_1",
                "web_search",
                serde_json::json!({"query": "rust"}),
            )],
        };
        let msg = reply.into_message();
        assert!(msg.requests_tools());
        assert_eq!(msg.content(), "let me check");
    }
}
