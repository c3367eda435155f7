//! Core data types: messages, citations, run state.

pub mod message;
pub mod state;

pub use message::{Message, ToolCall};
pub use state::{Citation, ResearchState};
