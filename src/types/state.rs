//! Accumulated state of one research run.

use serde::{Deserialize, Serialize};

use super::message::Message;

/// A source reference harvested during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl Citation {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: None,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// State accumulated across one control-loop execution.
///
/// Messages and the turn counter grow monotonically; citations accumulate
/// by concatenation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResearchState {
    pub messages: Vec<Message>,
    pub citations: Vec<Citation>,
    pub turn_count: u32,
}

impl ResearchState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            citations: Vec::new(),
            turn_count: 0,
        }
    }

    /// The final answer: content of the last assistant message.
    ///
    /// Always yields a non-empty string; falls back to a fixed sentence when
    /// no assistant message exists.
    pub fn final_answer(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find_map(|m| match m {
                Message::Assistant { content, .. } if !content.is_empty() => {
                    Some(content.clone())
                }
                _ => None,
            })
            .unwrap_or_else(|| "No answer generated.".to_string())
    }

    /// Number of tool-result messages in the history.
    pub fn tool_result_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_tool_result()).count()
    }

    /// Append citations, deduplicating by URL.
    pub fn extend_citations(&mut self, citations: impl IntoIterator<Item = Citation>) {
        for citation in citations {
            if !self.citations.iter().any(|c| c.url == citation.url) {
                self.citations.push(citation);
            }
        }
    }
}
