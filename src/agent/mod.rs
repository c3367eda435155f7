//! The research agent: a conversational front over the bounded loop.

pub mod engine;
pub mod prompt;

pub use engine::{
    run_loop, LoopPhase, ResearchSnapshot, SnapshotSink, EMPTY_ANSWER_FALLBACK,
    FORCE_FINAL_DIRECTIVE,
};
pub use prompt::system_prompt;

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};

use crate::config::ResearchConfig;
use crate::error::{format_tool_error, MagpieError, Result};
use crate::provider::{ModelProvider, OpenAiCompatibleProvider};
use crate::store::{context_for_resume, ConversationStore};
use crate::tools::{self, Tool};
use crate::types::{Citation, Message, ResearchState};

/// The result of one research query.
///
/// Produced for every query, including failed ones: a run that could not
/// reach the model still yields an outcome whose answer explains what went
/// wrong, with `turn_count` 0 and no citations.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutcome {
    pub final_answer: String,
    pub messages: Vec<Message>,
    pub citations: Vec<Citation>,
    pub turn_count: u32,
}

impl From<ResearchState> for ResearchOutcome {
    fn from(state: ResearchState) -> Self {
        Self {
            final_answer: state.final_answer(),
            messages: state.messages,
            citations: state.citations,
            turn_count: state.turn_count,
        }
    }
}

/// Outcome of a query executed inside a persisted conversation.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Identifier the conversation was saved under.
    pub conversation_id: String,
    pub outcome: ResearchOutcome,
}

/// A research assistant answering queries through a bounded tool loop.
pub struct ResearchAgent {
    config: ResearchConfig,
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Arc<dyn Tool>>,
}

impl ResearchAgent {
    /// Create an agent talking to the configured OpenAI-compatible endpoint
    /// with the default search and scrape tools.
    pub fn new(config: ResearchConfig) -> Self {
        let provider = Arc::new(OpenAiCompatibleProvider::from_config(&config));
        Self::with_provider(config, provider)
    }

    /// Create an agent over an explicit provider.
    pub fn with_provider(config: ResearchConfig, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            config,
            provider,
            tools: tools::default_tools(),
        }
    }

    /// Replace the tool set.
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Answer a single query with no prior context.
    ///
    /// Never fails: provider and loop errors are converted into an outcome
    /// whose final answer describes the problem.
    pub async fn research(&self, query: &str) -> ResearchOutcome {
        self.research_with_context(query, Vec::new()).await
    }

    /// Answer a query on top of prior conversation context.
    ///
    /// A system prompt is prepended unless `prior` already starts with one,
    /// so resumed conversations keep their original instructions.
    pub async fn research_with_context(
        &self,
        query: &str,
        prior: Vec<Message>,
    ) -> ResearchOutcome {
        let initial = self.assemble_messages(query, prior);
        info!(model = self.provider.model_id(), "starting research");

        match run_loop(
            self.provider.as_ref(),
            &self.tools,
            initial.clone(),
            self.config.max_iterations,
            None,
        )
        .await
        {
            Ok(state) => state.into(),
            Err(e) => failure_outcome(initial, &e),
        }
    }

    /// Streaming variant of [`research_with_context`]: yields a snapshot per
    /// loop transition. The final snapshot has phase `Done` and carries the
    /// same state the non-streaming form would return.
    pub fn stream_research(
        &self,
        query: &str,
        prior: Vec<Message>,
    ) -> BoxStream<'static, ResearchSnapshot> {
        let initial = self.assemble_messages(query, prior);
        let provider = Arc::clone(&self.provider);
        let tools = self.tools.clone();
        let max_iterations = self.config.max_iterations;

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let sink_tx = tx.clone();
        let sink: SnapshotSink = Arc::new(move |snapshot| {
            let _ = sink_tx.send(snapshot);
        });

        tokio::spawn(async move {
            let result = run_loop(
                provider.as_ref(),
                &tools,
                initial.clone(),
                max_iterations,
                Some(&sink),
            )
            .await;
            if let Err(e) = result {
                // Mirror the non-streaming failure shape as a terminal snapshot.
                let outcome = failure_outcome(initial, &e);
                let _ = tx.send(ResearchSnapshot {
                    phase: LoopPhase::Done,
                    state: ResearchState {
                        messages: outcome.messages,
                        citations: outcome.citations,
                        turn_count: outcome.turn_count,
                    },
                });
            }
        });

        UnboundedReceiverStream::new(rx).boxed()
    }

    /// Answer a query inside a stored conversation.
    ///
    /// With `conversation_id = None` a new conversation is created; otherwise
    /// the existing one is resumed (its saved messages become the prior
    /// context) and extended. The exchange is persisted before returning;
    /// storage failures propagate.
    pub async fn research_in_session(
        &self,
        store: &ConversationStore,
        conversation_id: Option<&str>,
        query: &str,
    ) -> Result<SessionOutcome> {
        let prior = match conversation_id {
            Some(id) => {
                let record = store
                    .load(id)
                    .await?
                    .ok_or_else(|| MagpieError::ConversationNotFound(id.to_string()))?;
                context_for_resume(&record)
            }
            None => Vec::new(),
        };

        let outcome = self.research_with_context(query, prior).await;

        let metadata = BTreeMap::from([
            ("model".to_string(), self.config.model_name.clone()),
            (
                "user_level".to_string(),
                self.config.user_level.as_str().to_string(),
            ),
        ]);
        let saved_id = store
            .save(
                conversation_id,
                query,
                &outcome.final_answer,
                &outcome.messages,
                &outcome.citations,
                &metadata,
            )
            .await?;

        Ok(SessionOutcome {
            conversation_id: saved_id,
            outcome,
        })
    }

    /// The final answer out of a finished state.
    pub fn get_final_answer(&self, state: &ResearchState) -> String {
        state.final_answer()
    }

    fn assemble_messages(&self, query: &str, prior: Vec<Message>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(prior.len() + 2);
        if !matches!(prior.first(), Some(Message::System { .. })) {
            messages.push(Message::system(system_prompt(self.config.user_level)));
        }
        messages.extend(prior);
        messages.push(Message::human(query));
        messages
    }
}

fn failure_outcome(initial: Vec<Message>, e: &MagpieError) -> ResearchOutcome {
    error!(error = %e, "research run failed");
    let answer = format!("An error occurred: {}", format_tool_error(e, "research"));
    let mut messages = initial;
    messages.push(Message::assistant(answer.clone()));
    ResearchOutcome {
        final_answer: answer,
        messages,
        citations: Vec::new(),
        turn_count: 0,
    }
}
