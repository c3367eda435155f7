//! Findings store and its tools.
//!
//! The store is an explicitly passed handle, injected into each tool at
//! construction time, so tools stay testable in isolation. Optionally backed
//! by a JSON file.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MagpieError, Result};
use crate::tools::schema::ToolParameters;
use crate::tools::tool::{ResearchTool, Tool};

/// A single stored research finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub citation: String,
    pub timestamp: String,
    pub id: usize,
}

/// Shared handle to a collection of findings.
#[derive(Clone, Default)]
pub struct FindingsStore {
    inner: Arc<Mutex<Vec<Finding>>>,
    path: Option<PathBuf>,
}

impl FindingsStore {
    /// Create an in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that mirrors its contents to a JSON file.
    ///
    /// Existing contents at `path` are loaded when parsable; a corrupt file
    /// is treated as empty.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let existing = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Self {
            inner: Arc::new(Mutex::new(existing)),
            path: Some(path),
        }
    }

    /// Append a finding, returning the stored entry.
    pub async fn store(&self, key: &str, value: &str, citation: &str) -> Result<Finding> {
        let (finding, snapshot) = {
            let mut findings = self.inner.lock().expect("findings lock");
            let finding = Finding {
                key: key.to_string(),
                value: value.to_string(),
                citation: citation.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                id: findings.len() + 1,
            };
            findings.push(finding.clone());
            (finding, findings.clone())
        };
        self.persist(&snapshot).await?;
        Ok(finding)
    }

    /// Look up the first finding stored under `key`.
    pub fn retrieve(&self, key: &str) -> Option<Finding> {
        self.inner
            .lock()
            .expect("findings lock")
            .iter()
            .find(|f| f.key == key)
            .cloned()
    }

    /// Snapshot of all findings.
    pub fn all(&self) -> Vec<Finding> {
        self.inner.lock().expect("findings lock").clone()
    }

    async fn persist(&self, snapshot: &[Finding]) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FindingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindingsStore")
            .field("count", &self.inner.lock().map(|v| v.len()).unwrap_or(0))
            .field("path", &self.path)
            .finish()
    }
}

/// Create the `store_finding` tool bound to `store`.
pub fn store_finding_tool(store: FindingsStore) -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "store_finding",
        "Save an important finding or data point under a key for later retrieval.",
        ToolParameters::object()
            .string("key", "Category or identifier for the finding", true)
            .string("value", "The actual finding or data", true)
            .string("citation", "Source citation", false)
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let key = args.get_str("key")?.to_string();
                let value = args.get_str("value")?.to_string();
                let citation = args.get_str_opt("citation").unwrap_or("").to_string();

                match store.store(&key, &value, &citation).await {
                    Ok(finding) => Ok(serde_json::json!({
                        "status": "success",
                        "message": format!("Stored finding '{key}'"),
                        "finding": finding,
                    })),
                    Err(e) => {
                        warn!(%key, error = %e, "failed to persist finding");
                        Err(MagpieError::ToolExecution {
                            tool_name: "store_finding".into(),
                            message: e.to_string(),
                        })
                    }
                }
            }
        },
    ))
}

/// Create the `retrieve_finding` tool bound to `store`.
pub fn retrieve_finding_tool(store: FindingsStore) -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "retrieve_finding",
        "Retrieve a previously stored finding by its key.",
        ToolParameters::object()
            .string("key", "The key of the finding to retrieve", true)
            .build(),
        move |args| {
            let store = store.clone();
            async move {
                let key = args.get_str("key")?.to_string();
                match store.retrieve(&key) {
                    Some(finding) => Ok(serde_json::json!({
                        "status": "success",
                        "finding": finding,
                    })),
                    None => Ok(serde_json::json!({
                        "status": "error",
                        "message": format!("Finding with key '{key}' not found"),
                    })),
                }
            }
        },
    ))
}

/// Create the `list_findings` tool bound to `store`.
pub fn list_findings_tool(store: FindingsStore) -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "list_findings",
        "List all findings stored during this research session.",
        ToolParameters::empty(),
        move |_args| {
            let store = store.clone();
            async move {
                let findings = store.all();
                Ok(serde_json::json!({
                    "status": "success",
                    "count": findings.len(),
                    "findings": findings,
                }))
            }
        },
    ))
}
