//! Provider for any OpenAI-compatible chat-completions API.
//!
//! Ollama (local and cloud) exposes this surface, so one codec covers both.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::ResearchConfig;
use crate::error::{MagpieError, Result};
use crate::types::{Message, ToolCall};

use super::http::{request_headers, shared_client, status_to_error};
use super::{ChatReply, ModelProvider, ToolDefinition};

pub struct OpenAiCompatibleProvider {
    model_id: String,
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        model_id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        temperature: f32,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            temperature,
        }
    }

    /// Build a provider from agent configuration.
    pub fn from_config(config: &ResearchConfig) -> Self {
        Self::new(
            config.model_name.clone(),
            config.base_url.clone(),
            config.api_key.clone(),
            config.temperature,
        )
    }

    fn build_request_body(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> serde_json::Value {
        let wire_messages: Vec<serde_json::Value> = messages.iter().map(message_to_wire).collect();

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": wire_messages,
            "temperature": self.temperature,
            "stream": false,
        });

        if let Some(tools) = tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                body.as_object_mut()
                    .expect("body is an object")
                    .insert("tools".into(), tool_defs.into());
            }
        }

        body
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatReply> {
        let body = self.build_request_body(messages, tools);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = %self.model_id,
            tools_enabled = tools.map(<[_]>::len).unwrap_or(0),
            "chat completion request"
        );

        let resp = shared_client()
            .post(&url)
            .headers(request_headers(self.api_key.as_deref()))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: WireChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MagpieError::api(200, "no choices in chat response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                // Some local servers omit call ids; synthesize one so
                // results can still be correlated.
                id: tc
                    .id
                    .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::String(tc.function.arguments)),
            })
            .collect();

        Ok(ChatReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

/// Collapse a message onto the chat-completions wire shape.
fn message_to_wire(msg: &Message) -> serde_json::Value {
    match msg {
        Message::System { content } => serde_json::json!({
            "role": "system",
            "content": content,
        }),
        Message::Human { content } => serde_json::json!({
            "role": "user",
            "content": content,
        }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            if tool_calls.is_empty() {
                return serde_json::json!({ "role": "assistant", "content": content });
            }
            let calls: Vec<serde_json::Value> = tool_calls
                .iter()
                .map(|tc| {
                    serde_json::json!({
                        "id": tc.id,
                        "type": "function",
                        "function": {
                            "name": tc.name,
                            "arguments": tc.arguments.to_string(),
                        }
                    })
                })
                .collect();
            serde_json::json!({
                "role": "assistant",
                "content": if content.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::String(content.clone())
                },
                "tool_calls": calls,
            })
        }
        Message::ToolResult {
            content,
            tool_call_id,
        } => serde_json::json!({
            "role": "tool",
            "tool_call_id": tool_call_id,
            "content": content,
        }),
    }
}

// Wire response types (internal)

#[derive(Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: Option<String>,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new("test-model", "http://localhost:11434/v1/", None, 0.3)
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        assert_eq!(provider().base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn body_omits_tools_when_none_advertised() {
        let body = provider().build_request_body(&[Message::human("hi")], None);
        assert!(body.get("tools").is_none());
        assert_eq!(body["model"], "test-model");
    }

    #[test]
    fn body_includes_function_tools() {
        let tools = vec![ToolDefinition {
            name: "web_search".into(),
            description: "search".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let body = provider().build_request_body(&[Message::human("hi")], Some(&tools));
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
    }

    #[test]
    fn tool_result_message_carries_linkage() {
        let wire = message_to_wire(&Message::tool_result("call_3", r#"{"status":"success"}"#));
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_3");
    }

    #[test]
    fn assistant_with_calls_serializes_arguments_as_string() {
        let msg = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new(
                "call_1",
                "web_search",
                serde_json::json!({"query": "rust"}),
            )],
        );
        let wire = message_to_wire(&msg);
        assert_eq!(wire["content"], serde_json::Value::Null);
        let args = wire["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .unwrap();
        assert!(args.contains("\"query\""));
    }
}
