//! Persisted conversation record shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Citation, Message};

/// One query/answer pair within a conversation. Append-only once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// A durable conversation, one JSON file per record.
///
/// `exchanges` only ever grows; `messages` and `citations` are replaced
/// wholesale on each save so they always reflect the latest full context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub exchanges: Vec<Exchange>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ConversationRecord {
    /// First query of the conversation, if any.
    pub fn first_query(&self) -> Option<&str> {
        self.exchanges.first().map(|e| e.query.as_str())
    }
}

/// Listing entry returned by `ConversationStore::list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub first_query: String,
    pub total_exchanges: usize,
}

/// Older single-exchange layout written by earlier versions. Tolerated on
/// read, upgraded in memory, never written back in this shape.
#[derive(Debug, Deserialize)]
pub struct LegacyRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl From<LegacyRecord> for ConversationRecord {
    fn from(legacy: LegacyRecord) -> Self {
        let name = derive_name(&legacy.query);
        Self {
            id: legacy.id,
            name,
            created_at: legacy.timestamp,
            last_updated: legacy.timestamp,
            exchanges: vec![Exchange {
                query: legacy.query,
                answer: legacy.answer,
                timestamp: legacy.timestamp,
            }],
            messages: legacy.messages,
            citations: legacy.citations,
            metadata: legacy.metadata,
        }
    }
}

/// Derive a display name from the first query.
///
/// Strips non-alphanumeric characters, collapses whitespace, keeps the first
/// 8 words and truncates to 50 characters at a word boundary.
pub fn derive_name(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let words: Vec<&str> = cleaned.split_whitespace().take(8).collect();

    let mut name = String::new();
    for word in words {
        let candidate_len = if name.is_empty() {
            word.len()
        } else {
            name.len() + 1 + word.len()
        };
        if candidate_len > 50 {
            break;
        }
        if !name.is_empty() {
            name.push(' ');
        }
        name.push_str(word);
    }

    if name.is_empty() {
        "Untitled conversation".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_name_strips_punctuation_and_collapses() {
        assert_eq!(
            derive_name("What is photosynthesis?"),
            "What is photosynthesis"
        );
        assert_eq!(derive_name("a,b,,c   d"), "a b c d");
    }

    #[test]
    fn derive_name_keeps_first_eight_words() {
        let name = derive_name("one two three four five six seven eight nine ten");
        assert_eq!(name, "one two three four five six seven eight");
    }

    #[test]
    fn derive_name_truncates_at_word_boundary() {
        let name = derive_name("extraordinarily lengthy interrogative sentence regarding quantum computing");
        assert!(name.len() <= 50);
        assert!(!name.ends_with(' '));
        // Never cuts a word in half.
        assert!("extraordinarily lengthy interrogative sentence regarding quantum computing"
            .contains(&name));
    }

    #[test]
    fn derive_name_empty_falls_back() {
        assert_eq!(derive_name(""), "Untitled conversation");
        assert_eq!(derive_name("?!...,"), "Untitled conversation");
    }

    #[test]
    fn legacy_record_upgrades_to_one_exchange() {
        let legacy: LegacyRecord = serde_json::from_value(serde_json::json!({
            "id": "20240101_120000",
            "timestamp": "2024-01-01T12:00:00Z",
            "query": "What is photosynthesis?",
            "answer": "Photosynthesis is...",
        }))
        .unwrap();
        let record = ConversationRecord::from(legacy);
        assert_eq!(record.exchanges.len(), 1);
        assert_eq!(record.first_query(), Some("What is photosynthesis?"));
        assert_eq!(record.name, "What is photosynthesis");
        assert_eq!(record.created_at, record.last_updated);
    }
}
