//! Magpie — a conversational research assistant.
//!
//! A bounded tool-calling loop over any OpenAI-compatible chat endpoint: the
//! model gets one round of tool calls (web search, scraping, calculators),
//! then is forced to write a plain-text answer. Conversations persist as JSON
//! files and can be resumed, listed, and deleted.
//!
//! # Quick Start
//!
//! ```no_run
//! use magpie::prelude::*;
//!
//! # async fn example() {
//! let agent = ResearchAgent::new(ResearchConfig::from_env());
//! let outcome = agent.research("What is the current Rust release?").await;
//! println!("{}", outcome.final_answer);
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod store;
pub mod tools;
pub mod types;
