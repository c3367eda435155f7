//! Message types for model communication.

use serde::{Deserialize, Serialize};

/// A message in a conversation.
///
/// Modeled as a tagged sum type so serialization and context reconstruction
/// can match exhaustively on the kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    Human {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        content: String,
        tool_call_id: String,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::System {
            content: text.into(),
        }
    }

    /// Create a human (user) message.
    pub fn human(text: impl Into<String>) -> Self {
        Self::Human {
            content: text.into(),
        }
    }

    /// Create a plain assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Create an assistant message carrying tool-call requests.
    pub fn assistant_with_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: text.into(),
            tool_calls,
        }
    }

    /// Create a tool result message correlated to the call that produced it.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// The textual content of this message.
    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::Human { content }
            | Self::Assistant { content, .. }
            | Self::ToolResult { content, .. } => content,
        }
    }

    /// Tool calls requested by this message (empty unless assistant).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Whether this message requests at least one tool invocation.
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls().is_empty()
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self, Self::ToolResult { .. })
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert!(matches!(Message::system("s"), Message::System { .. }));
        assert!(matches!(Message::human("h"), Message::Human { .. }));
        assert!(Message::assistant("a").is_assistant());
        assert!(Message::tool_result("call_1", "{}").is_tool_result());
    }

    #[test]
    fn requests_tools_only_for_assistant_with_calls() {
        let call = ToolCall::new("call_1", "web_search", serde_json::json!({"query": "rust"}));
        let with = Message::assistant_with_tool_calls("", vec![call]);
        assert!(with.requests_tools());
        assert!(!Message::assistant("done").requests_tools());
        assert!(!Message::human("hi").requests_tools());
    }

    #[test]
    fn serde_uses_kind_tag() {
        let msg = Message::human("What is photosynthesis?");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["kind"], "human");
        assert_eq!(value["content"], "What is photosynthesis?");

        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn empty_assistant_tool_calls_omitted_from_json() {
        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert!(value.get("tool_calls").is_none());
    }

    #[test]
    fn tool_result_round_trips_with_linkage() {
        let msg = Message::tool_result("call_9", r#"{"status":"success"}"#);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        match back {
            Message::ToolResult { tool_call_id, .. } => assert_eq!(tool_call_id, "call_9"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn message_with_no_content_still_serializes() {
        let msg = Message::assistant("");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["content"], "");
    }
}
