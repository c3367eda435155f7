//! Convenience re-exports for common use.

pub use crate::agent::{
    LoopPhase, ResearchAgent, ResearchOutcome, ResearchSnapshot, SessionOutcome,
};
pub use crate::config::{ResearchConfig, UserLevel};
pub use crate::error::{MagpieError, Result};
pub use crate::provider::{ChatReply, ModelProvider, OpenAiCompatibleProvider, ToolDefinition};
pub use crate::store::{ConversationRecord, ConversationStore, ConversationSummary};
pub use crate::tools::{FindingsStore, ResearchTool, Tool, ToolArguments, ToolParameters};
pub use crate::types::{Citation, Message, ResearchState, ToolCall};
