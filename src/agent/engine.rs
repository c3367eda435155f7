//! The bounded research loop.
//!
//! A ReAct-style agent collapsed into a fixed two-step decision procedure:
//! the model gets one shot at requesting tools, every requested call is
//! executed, and the follow-up invocation runs with tools disabled so it can
//! only produce text. The `turn_count` increments once per model invocation,
//! so a completed run ends at 1 (direct answer) or 2 (one tool round).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MagpieError, Result};
use crate::provider::ModelProvider;
use crate::tools::{self, Tool};
use crate::types::{Citation, Message, ResearchState};

/// Directive appended before the forced, tool-less final invocation.
pub const FORCE_FINAL_DIRECTIVE: &str = "STOP. You have all the information you need from the \
    tools. Now write a comprehensive final answer. Write your answer as plain text. Do NOT call \
    any more tools.";

/// Substituted when the forced final invocation returns empty content.
pub const EMPTY_ANSWER_FALLBACK: &str = "I apologize, but I encountered an issue generating the \
    final answer. Please try rephrasing your question or asking something different.";

/// Keep the leading system message plus this many recent messages when
/// assembling provider context.
const MAX_CONTEXT_MESSAGES: usize = 20;

/// Where the loop currently stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    AwaitingFirstResponse,
    AwaitingToolResults,
    ForcingFinalAnswer,
    Done,
}

/// Point-in-time view of a run, yielded once per state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchSnapshot {
    pub phase: LoopPhase,
    pub state: ResearchState,
}

/// Callback for observing snapshots as the loop progresses.
pub type SnapshotSink = Arc<dyn Fn(ResearchSnapshot) + Send + Sync>;

/// Keep the system prompt and the most recent messages, dropping the middle
/// when history outgrows the window.
pub fn trim_context(messages: &[Message], max_messages: usize) -> Vec<Message> {
    if messages.len() <= max_messages {
        return messages.to_vec();
    }
    let system = messages.first().filter(|m| matches!(m, Message::System { .. }));
    match system {
        Some(system) => {
            let tail_len = max_messages.saturating_sub(1);
            let mut trimmed = vec![system.clone()];
            trimmed.extend_from_slice(&messages[messages.len() - tail_len..]);
            trimmed
        }
        None => messages[messages.len() - max_messages..].to_vec(),
    }
}

/// Pull citations out of a successful search or scrape result payload.
pub fn harvest_citations(tool_name: &str, payload: &serde_json::Value) -> Vec<Citation> {
    if payload.get("status").and_then(|s| s.as_str()) != Some("success") {
        return Vec::new();
    }

    match tool_name {
        "web_search" => payload
            .get("results")
            .and_then(|r| r.as_array())
            .map(|results| {
                results
                    .iter()
                    .filter_map(|entry| {
                        let title = entry.get("title")?.as_str()?;
                        let url = entry.get("url")?.as_str()?;
                        let mut citation = Citation::new(title, url);
                        if let Some(snippet) = entry.get("snippet").and_then(|s| s.as_str()) {
                            citation = citation.with_snippet(snippet);
                        }
                        Some(citation)
                    })
                    .collect()
            })
            .unwrap_or_default(),
        "scrape_webpage" => {
            let title = payload.get("title").and_then(|t| t.as_str());
            let url = payload.get("url").and_then(|u| u.as_str());
            match (title, url) {
                (Some(title), Some(url)) => vec![Citation::new(title, url)],
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

/// Run one bounded research loop to completion.
///
/// `initial_messages` must already contain the query (and any resumed
/// context). Errors from the provider propagate; the caller is responsible
/// for converting them into a user-facing answer.
pub async fn run_loop(
    provider: &dyn ModelProvider,
    tools: &[Arc<dyn Tool>],
    initial_messages: Vec<Message>,
    max_iterations: u32,
    sink: Option<&SnapshotSink>,
) -> Result<ResearchState> {
    let mut state = ResearchState::new(initial_messages);
    let mut iterations = 0u32;
    let tool_defs = tools::to_definitions(tools);

    let emit = |phase: LoopPhase, state: &ResearchState| {
        if let Some(sink) = sink {
            sink(ResearchSnapshot {
                phase,
                state: state.clone(),
            });
        }
    };

    emit(LoopPhase::AwaitingFirstResponse, &state);

    // Turn 1: tools advertised; the model decides whether it needs them.
    iterations += 1;
    if iterations > max_iterations {
        return Err(MagpieError::IterationCeiling(iterations));
    }
    let context = trim_context(&state.messages, MAX_CONTEXT_MESSAGES);
    let reply = provider.invoke(&context, Some(&tool_defs)).await?;
    let requested: Vec<_> = reply.tool_calls.clone();
    state.messages.push(reply.into_message());
    state.turn_count = 1;

    if requested.is_empty() {
        debug!(turns = state.turn_count, "model answered directly");
        emit(LoopPhase::Done, &state);
        return Ok(state);
    }

    emit(LoopPhase::AwaitingToolResults, &state);

    // Tool round: every requested call runs; failures become error payloads.
    debug!(calls = requested.len(), "executing tool round");
    let results = tools::execute_tool_round(tools, &requested).await;
    for (call, result) in requested.iter().zip(&results) {
        if let Ok(payload) = serde_json::from_str::<serde_json::Value>(result.content()) {
            state.extend_citations(harvest_citations(&call.name, &payload));
        }
    }
    state.messages.extend(results);

    emit(LoopPhase::ForcingFinalAnswer, &state);

    // Turn 2: forced final answer, tools disabled. The directive goes only
    // into the provider context, not the recorded history.
    iterations += 1;
    if iterations > max_iterations {
        return Err(MagpieError::IterationCeiling(iterations));
    }
    let mut context = trim_context(&state.messages, MAX_CONTEXT_MESSAGES);
    context.push(Message::human(FORCE_FINAL_DIRECTIVE));
    let reply = provider.invoke(&context, None).await?;
    let content = if reply.content.is_empty() {
        EMPTY_ANSWER_FALLBACK.to_string()
    } else {
        reply.content
    };
    state.messages.push(Message::assistant(content));
    state.turn_count = 2;

    debug!(
        turns = state.turn_count,
        citations = state.citations.len(),
        "research loop complete"
    );
    emit(LoopPhase::Done, &state);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_keeps_system_and_tail() {
        let mut messages = vec![Message::system("sys")];
        for i in 0..30 {
            messages.push(Message::human(format!("m{i}")));
        }
        let trimmed = trim_context(&messages, 5);
        assert_eq!(trimmed.len(), 5);
        assert_eq!(trimmed[0], Message::system("sys"));
        assert_eq!(trimmed[4].content(), "m29");
    }

    #[test]
    fn trim_without_system_keeps_tail_only() {
        let messages: Vec<_> = (0..10).map(|i| Message::human(format!("m{i}"))).collect();
        let trimmed = trim_context(&messages, 3);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[0].content(), "m7");
    }

    #[test]
    fn trim_is_noop_under_limit() {
        let messages = vec![Message::human("a"), Message::human("b")];
        assert_eq!(trim_context(&messages, 20), messages);
    }

    #[test]
    fn harvest_from_search_results() {
        let payload = serde_json::json!({
            "status": "success",
            "results": [
                {"title": "A", "url": "https://a.example", "snippet": "about a"},
                {"title": "B", "url": "https://b.example"},
            ],
        });
        let citations = harvest_citations("web_search", &payload);
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].snippet.as_deref(), Some("about a"));
        assert!(citations[1].snippet.is_none());
    }

    #[test]
    fn harvest_from_scrape() {
        let payload = serde_json::json!({
            "status": "success",
            "title": "Page",
            "url": "https://p.example",
            "content": "text",
        });
        let citations = harvest_citations("scrape_webpage", &payload);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].url, "https://p.example");
    }

    #[test]
    fn failed_results_yield_no_citations() {
        let payload = serde_json::json!({"status": "error", "message": "boom"});
        assert!(harvest_citations("web_search", &payload).is_empty());
        assert!(harvest_citations("calculate", &serde_json::json!({"status": "success"})).is_empty());
    }
}
