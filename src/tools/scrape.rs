//! Webpage scraping tools: text extraction and link extraction.

use std::sync::Arc;

use tracing::debug;

use crate::error::MagpieError;
use crate::provider::http::shared_client;
use crate::tools::schema::ToolParameters;
use crate::tools::tool::{ResearchTool, Tool};

use super::html::{anchors, page_title, strip_tags, truncate_text};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DEFAULT_MAX_LENGTH: usize = 5_000;
const DEFAULT_MAX_LINKS: usize = 20;

fn validate_url(url: &str) -> Result<(), MagpieError> {
    let ok = url.starts_with("http://") || url.starts_with("https://");
    if ok && url.len() > "https://".len() {
        Ok(())
    } else {
        Err(MagpieError::InvalidArgument(format!(
            "Invalid URL format: {url}"
        )))
    }
}

async fn fetch_page(url: &str, tool_name: &str) -> Result<String, MagpieError> {
    let response = shared_client()
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| MagpieError::ToolExecution {
            tool_name: tool_name.into(),
            message: e.to_string(),
        })?;

    response.text().await.map_err(|e| MagpieError::ToolExecution {
        tool_name: tool_name.into(),
        message: e.to_string(),
    })
}

/// Create the `scrape_webpage` tool — extracts readable text from a page.
pub fn scrape_webpage_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "scrape_webpage",
        "Extract the main text content from a webpage. Use only when a specific \
         URL needs to be read.",
        ToolParameters::object()
            .string("url", "The URL of the webpage to scrape", true)
            .integer(
                "max_length",
                "Maximum length of content to return (default 5000 chars)",
                false,
            )
            .build(),
        |args| async move {
            let url = args.get_str("url")?.to_string();
            let max_length = args
                .get_i64_opt("max_length")
                .map(|n| n.max(100) as usize)
                .unwrap_or(DEFAULT_MAX_LENGTH);

            if let Err(e) = validate_url(&url) {
                return Ok(serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                    "url": url,
                }));
            }

            debug!(%url, max_length, "scraping webpage");

            let html = fetch_page(&url, "scrape_webpage").await?;
            let title = page_title(&html).unwrap_or_else(|| "No title".to_string());
            let text = strip_tags(&html);
            let (content, truncated) = truncate_text(&text, max_length);

            Ok(serde_json::json!({
                "status": "success",
                "url": url,
                "title": title,
                "content": content,
                "truncated": truncated,
            }))
        },
    ))
}

/// Create the `extract_links` tool — lists anchors found on a page.
pub fn extract_links_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "extract_links",
        "Extract hyperlinks from a webpage, returning each link's URL and text.",
        ToolParameters::object()
            .string("url", "The URL of the webpage to inspect", true)
            .integer("max_links", "Maximum links to return (default 20)", false)
            .build(),
        |args| async move {
            let url = args.get_str("url")?.to_string();
            let max_links = args
                .get_i64_opt("max_links")
                .map(|n| n.max(1) as usize)
                .unwrap_or(DEFAULT_MAX_LINKS);

            if let Err(e) = validate_url(&url) {
                return Ok(serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                    "url": url,
                }));
            }

            let html = fetch_page(&url, "extract_links").await?;
            let links: Vec<serde_json::Value> = anchors(&html)
                .into_iter()
                .filter(|(href, _)| href.starts_with("http"))
                .take(max_links)
                .map(|(href, text)| serde_json::json!({"url": href, "text": text}))
                .collect();

            if links.is_empty() {
                return Ok(serde_json::json!({
                    "status": "no_results",
                    "message": format!("No links found at {url}"),
                    "links": [],
                }));
            }

            Ok(serde_json::json!({
                "status": "success",
                "url": url,
                "count": links.len(),
                "links": links,
            }))
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::arguments::ToolArguments;

    #[test]
    fn url_validation() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://example.com/page").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("example.com").is_err());
        assert!(validate_url("https://").is_err());
    }

    #[tokio::test]
    async fn invalid_url_yields_error_status_not_err() {
        let tool = scrape_webpage_tool();
        let args = ToolArguments::new(serde_json::json!({"url": "not-a-url"}));
        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result["status"], "error");
    }

    #[tokio::test]
    async fn extract_links_rejects_bad_url_gracefully() {
        let tool = extract_links_tool();
        let args = ToolArguments::new(serde_json::json!({"url": "nope"}));
        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result["status"], "error");
    }
}
