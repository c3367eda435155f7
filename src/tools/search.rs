//! Web search tool backed by the DuckDuckGo HTML endpoint (no API key).

use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::MagpieError;
use crate::provider::http::shared_client;
use crate::tools::schema::ToolParameters;
use crate::tools::tool::{ResearchTool, Tool};

use super::html::{decode_entities, strip_tags};

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MAX_RESULTS: usize = 10;

fn result_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]*class="[^"]*result__a[^"]*"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#)
            .expect("valid regex")
    })
}

fn result_snippet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]*class="[^"]*result__snippet[^"]*"[^>]*>(.*?)</a>"#)
            .expect("valid regex")
    })
}

/// Parse DuckDuckGo result markup into (title, url, snippet) triples.
fn parse_results(html: &str, limit: usize) -> Vec<(String, String, String)> {
    let links: Vec<(String, String)> = result_link_re()
        .captures_iter(html)
        .map(|c| (decode_entities(&c[1]), strip_tags(&c[2])))
        .collect();
    let snippets: Vec<String> = result_snippet_re()
        .captures_iter(html)
        .map(|c| strip_tags(&c[1]))
        .collect();

    links
        .into_iter()
        .enumerate()
        .take(limit)
        .map(|(i, (url, title))| {
            let snippet = snippets
                .get(i)
                .cloned()
                .unwrap_or_else(|| "No description available".to_string());
            (title, url, snippet)
        })
        .collect()
}

/// Create the `web_search` tool.
pub fn web_search_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "web_search",
        "Search the web for current information. Returns titles, URLs and snippets \
         for the top results. Use for recent events, statistics and comparisons.",
        ToolParameters::object()
            .string("query", "The search query to look up", true)
            .integer("num_results", "Number of results to return (default 5, max 10)", false)
            .build(),
        |args| async move {
            let query = args.get_str("query")?.to_string();
            let num_results = args
                .get_i64_opt("num_results")
                .map(|n| n.clamp(1, MAX_RESULTS as i64) as usize)
                .unwrap_or(5);

            debug!(%query, num_results, "web search");

            let response = shared_client()
                .post(SEARCH_ENDPOINT)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .form(&[("q", query.as_str())])
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| MagpieError::ToolExecution {
                    tool_name: "web_search".into(),
                    message: e.to_string(),
                })?;

            let html = response.text().await.map_err(|e| MagpieError::ToolExecution {
                tool_name: "web_search".into(),
                message: e.to_string(),
            })?;

            let results = parse_results(&html, num_results);
            if results.is_empty() {
                return Ok(serde_json::json!({
                    "status": "no_results",
                    "message": format!("No results found for query: {query}"),
                    "results": [],
                }));
            }

            let entries: Vec<serde_json::Value> = results
                .iter()
                .enumerate()
                .map(|(i, (title, url, snippet))| {
                    serde_json::json!({
                        "id": i + 1,
                        "title": title,
                        "url": url,
                        "snippet": snippet,
                    })
                })
                .collect();

            Ok(serde_json::json!({
                "status": "success",
                "query": query,
                "count": entries.len(),
                "results": entries,
            }))
        },
    ))
}
