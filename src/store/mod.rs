//! JSON-file conversation persistence.
//!
//! One conversation per `{id}.json` file under a root directory. Identifiers
//! are wall-clock timestamps (`%Y%m%d_%H%M%S`), so lexicographic filename
//! order is chronological order.

pub mod record;

pub use record::{derive_name, ConversationRecord, ConversationSummary, Exchange};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{Citation, Message};

use record::LegacyRecord;

/// Maximum length of the `first_query` preview in listings.
const FIRST_QUERY_PREVIEW: usize = 100;

/// Directory-backed store of conversation records.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    root: PathBuf,
}

impl ConversationStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Allocate a fresh identifier. Same-second collisions get a numeric
    /// suffix so concurrent saves never overwrite each other.
    async fn allocate_id(&self) -> Result<String> {
        let base = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        if !tokio::fs::try_exists(self.path_for(&base)).await? {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}_{n}");
            if !tokio::fs::try_exists(self.path_for(&candidate)).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Save one completed exchange into a conversation.
    ///
    /// With `id = None` a new record is created under a freshly allocated
    /// identifier. A supplied id that resolves to no record is honored and
    /// the record created under it (a non-timestamp id forfeits the
    /// newest-first listing order, which keys on the filename). Otherwise
    /// the existing record is updated: the exchange is appended, `messages`
    /// is replaced wholesale, `citations` is replaced only when the new set
    /// is non-empty, and `last_updated` is refreshed.
    /// `name` and `created_at` never change after creation. Returns the
    /// identifier the record was saved under.
    pub async fn save(
        &self,
        id: Option<&str>,
        query: &str,
        answer: &str,
        messages: &[Message],
        citations: &[Citation],
        metadata: &BTreeMap<String, String>,
    ) -> Result<String> {
        self.save_inner(id, None, query, answer, messages, citations, metadata)
            .await
    }

    /// Like [`save`](Self::save) for a new conversation, but with an explicit
    /// display name instead of one derived from the query.
    pub async fn save_named(
        &self,
        name: &str,
        query: &str,
        answer: &str,
        messages: &[Message],
        citations: &[Citation],
        metadata: &BTreeMap<String, String>,
    ) -> Result<String> {
        self.save_inner(None, Some(name), query, answer, messages, citations, metadata)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn save_inner(
        &self,
        id: Option<&str>,
        name: Option<&str>,
        query: &str,
        answer: &str,
        messages: &[Message],
        citations: &[Citation],
        metadata: &BTreeMap<String, String>,
    ) -> Result<String> {
        let now = Utc::now();
        let existing = match id {
            Some(id) => self.load(id).await?,
            None => None,
        };

        let mut record = match existing {
            Some(record) => record,
            None => {
                let id = match id {
                    Some(id) => id.to_string(),
                    None => self.allocate_id().await?,
                };
                ConversationRecord {
                    id,
                    name: name
                        .map(str::to_string)
                        .unwrap_or_else(|| derive_name(query)),
                    created_at: now,
                    last_updated: now,
                    exchanges: Vec::new(),
                    messages: Vec::new(),
                    citations: Vec::new(),
                    metadata: BTreeMap::new(),
                }
            }
        };

        record.exchanges.push(Exchange {
            query: query.to_string(),
            answer: answer.to_string(),
            timestamp: now,
        });
        record.messages = messages.to_vec();
        if !citations.is_empty() {
            record.citations = citations.to_vec();
        }
        for (key, value) in metadata {
            record.metadata.insert(key.clone(), value.clone());
        }
        record.last_updated = now;

        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(self.path_for(&record.id), json).await?;
        debug!(id = %record.id, exchanges = record.exchanges.len(), "conversation saved");
        Ok(record.id)
    }

    /// Load a conversation by identifier. Returns `None` when no record
    /// exists; tolerates the legacy single-exchange file layout.
    pub async fn load(&self, id: &str) -> Result<Option<ConversationRecord>> {
        let path = self.path_for(id);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<ConversationRecord>(&text) {
            Ok(record) => Ok(Some(record)),
            Err(primary) => match serde_json::from_str::<LegacyRecord>(&text) {
                Ok(legacy) => {
                    debug!(%id, "upgraded legacy conversation record");
                    Ok(Some(legacy.into()))
                }
                Err(_) => Err(primary.into()),
            },
        }
    }

    /// List conversations, newest first, optionally capped at `limit`.
    ///
    /// Files that fail to parse are skipped with a warning rather than
    /// failing the whole listing.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<ConversationSummary>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(id) = name.strip_suffix(".json") {
                ids.push(id.to_string());
            }
        }

        // Timestamp ids sort lexicographically; newest first.
        ids.sort_unstable_by(|a, b| b.cmp(a));

        let mut summaries = Vec::new();
        for id in ids {
            if let Some(max) = limit {
                if summaries.len() >= max {
                    break;
                }
            }
            match self.load(&id).await {
                Ok(Some(record)) => summaries.push(summarize(&record)),
                Ok(None) => {}
                Err(e) => warn!(%id, error = %e, "skipping unreadable conversation"),
            }
        }
        Ok(summaries)
    }

    /// Delete a conversation. Returns whether a record existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn summarize(record: &ConversationRecord) -> ConversationSummary {
    let first_query = record.first_query().unwrap_or_default();
    ConversationSummary {
        id: record.id.clone(),
        name: record.name.clone(),
        created_at: record.created_at,
        last_updated: record.last_updated,
        first_query: truncate_chars(first_query, FIRST_QUERY_PREVIEW),
        total_exchanges: record.exchanges.len(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// Rebuild provider-ready context from a stored conversation.
///
/// Tool-result messages are dropped and assistant tool-call requests are
/// cleared, since the paired results no longer make sense out of their
/// original round.
pub fn context_for_resume(record: &ConversationRecord) -> Vec<Message> {
    record
        .messages
        .iter()
        .filter_map(|message| match message {
            Message::ToolResult { .. } => None,
            Message::Assistant { content, .. } => Some(Message::assistant(content.clone())),
            other => Some(other.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCall;

    fn store() -> (tempfile::TempDir, ConversationStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConversationStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let (_dir, store) = store();
        let messages = vec![Message::human("q"), Message::assistant("a")];
        let citations = vec![Citation::new("Src", "https://s.example")];

        let id = store
            .save(None, "q", "a", &messages, &citations, &BTreeMap::new())
            .await
            .unwrap();

        let record = store.load(&id).await.unwrap().unwrap();
        assert_eq!(record.exchanges.len(), 1);
        assert_eq!(record.exchanges[0].query, "q");
        assert_eq!(record.messages, messages);
        assert_eq!(record.citations, citations);
        assert_eq!(record.name, "q");
    }

    #[tokio::test]
    async fn update_appends_exchange_and_keeps_name() {
        let (_dir, store) = store();
        let id = store
            .save(None, "first question here", "a1", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        let created = store.load(&id).await.unwrap().unwrap();

        let returned = store
            .save(Some(&id), "second question", "a2", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(returned, id);

        let updated = store.load(&id).await.unwrap().unwrap();
        assert_eq!(updated.exchanges.len(), 2);
        assert_eq!(updated.exchanges[1].answer, "a2");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.last_updated >= created.last_updated);
    }

    #[tokio::test]
    async fn empty_citations_do_not_clobber_existing() {
        let (_dir, store) = store();
        let citations = vec![Citation::new("Kept", "https://kept.example")];
        let id = store
            .save(None, "q1", "a1", &[], &citations, &BTreeMap::new())
            .await
            .unwrap();

        store
            .save(Some(&id), "q2", "a2", &[], &[], &BTreeMap::new())
            .await
            .unwrap();

        let record = store.load(&id).await.unwrap().unwrap();
        assert_eq!(record.citations, citations);
    }

    #[tokio::test]
    async fn save_named_uses_explicit_name() {
        let (_dir, store) = store();
        let id = store
            .save_named("Project Alpha", "q", "a", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        let record = store.load(&id).await.unwrap().unwrap();
        assert_eq!(record.name, "Project Alpha");
    }

    #[tokio::test]
    async fn save_with_unresolved_id_creates_under_it() {
        let (_dir, store) = store();
        let returned = store
            .save(Some("20240715_093000"), "q", "a", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(returned, "20240715_093000");

        let record = store.load("20240715_093000").await.unwrap().unwrap();
        assert_eq!(record.exchanges.len(), 1);
        assert_eq!(record.name, "q");
    }

    #[tokio::test]
    async fn load_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.load("20990101_000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_skips_garbage() {
        let (dir, store) = store();
        for (id, query) in [("20240101_000000", "oldest"), ("20240601_000000", "newest")] {
            store
                .save(Some(id), query, "a", &[], &[], &BTreeMap::new())
                .await
                .unwrap();
        }
        std::fs::write(dir.path().join("20240301_000000.json"), "not json").unwrap();

        let listed = store.list(None).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["20240601_000000", "20240101_000000"]);
        assert_eq!(listed[0].first_query, "newest");

        let capped = store.list(Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, "20240601_000000");
    }

    #[tokio::test]
    async fn unparsable_entries_do_not_consume_the_list_limit() {
        let (dir, store) = store();
        store
            .save(Some("20240101_000000"), "good record", "a", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        // Sorts newest, so the limit would be spent on it if skipping counted.
        std::fs::write(dir.path().join("20990101_000000.json"), "not json").unwrap();

        let listed = store.list(Some(1)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "20240101_000000");
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (_dir, store) = store();
        let id = store
            .save(None, "q", "a", &[], &[], &BTreeMap::new())
            .await
            .unwrap();
        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn resume_context_drops_tool_plumbing() {
        let (_dir, store) = store();
        let messages = vec![
            Message::system("sys"),
            Message::human("q"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("call_1", "web_search", serde_json::json!({"query": "q"}))],
            ),
            Message::tool_result("call_1", "{\"status\":\"success\"}"),
            Message::assistant("final"),
        ];
        let id = store
            .save(None, "q", "final", &messages, &[], &BTreeMap::new())
            .await
            .unwrap();

        let record = store.load(&id).await.unwrap().unwrap();
        let context = context_for_resume(&record);
        assert_eq!(context.len(), 4);
        assert!(context.iter().all(|m| !m.is_tool_result()));
        assert!(context.iter().all(|m| m.tool_calls().is_empty()));
        assert_eq!(context[3].content(), "final");
    }

    #[tokio::test]
    async fn legacy_flat_record_loads() {
        let (dir, store) = store();
        let legacy = serde_json::json!({
            "id": "20240101_120000",
            "timestamp": "2024-01-01T12:00:00Z",
            "query": "old style question",
            "answer": "old style answer",
        });
        std::fs::write(
            dir.path().join("20240101_120000.json"),
            serde_json::to_string(&legacy).unwrap(),
        )
        .unwrap();

        let record = store.load("20240101_120000").await.unwrap().unwrap();
        assert_eq!(record.exchanges.len(), 1);
        assert_eq!(record.name, "old style question");

        let listed = store.list(None).await.unwrap();
        assert_eq!(listed[0].total_exchanges, 1);
    }
}
