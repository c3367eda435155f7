//! Research tools and the uniform invocation contract.

pub mod arguments;
pub mod calculator;
pub mod document;
pub mod findings;
pub mod html;
pub mod schema;
pub mod scrape;
pub mod search;
pub mod tool;
pub mod verify;

pub use arguments::ToolArguments;
pub use findings::FindingsStore;
pub use schema::ToolParameters;
pub use tool::{ResearchTool, Tool};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::provider::ToolDefinition;
use crate::types::{Message, ToolCall};

/// The tool set advertised to the model by default: search plus scraping.
/// One focused pair keeps small models from wandering.
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![search::web_search_tool(), scrape::scrape_webpage_tool()]
}

/// Every available tool, with findings tools bound to `store`.
pub fn research_tools(store: FindingsStore) -> Vec<Arc<dyn Tool>> {
    vec![
        search::web_search_tool(),
        scrape::scrape_webpage_tool(),
        scrape::extract_links_tool(),
        calculator::calculate_tool(),
        calculator::percentage_change_tool(),
        calculator::compound_growth_rate_tool(),
        verify::verify_fact_tool(),
        verify::check_source_credibility_tool(),
        verify::format_citation_tool(),
        document::read_text_file_tool(),
        document::list_directory_tool(),
        findings::store_finding_tool(store.clone()),
        findings::retrieve_finding_tool(store.clone()),
        findings::list_findings_tool(store),
    ]
}

/// Definitions for advertising `tools` to a provider.
pub fn to_definitions(tools: &[Arc<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters().schema.clone(),
        })
        .collect()
}

/// Execute one model-requested tool call under the uniform contract.
///
/// Never fails: an unknown tool or an `Err` from `execute` becomes a
/// `{"status":"error"}` payload. The returned JSON is what goes into the
/// ToolResult message.
pub async fn dispatch_tool_call(tools: &[Arc<dyn Tool>], call: &ToolCall) -> serde_json::Value {
    let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
        warn!(tool = %call.name, "model requested unknown tool");
        return serde_json::json!({
            "status": "error",
            "message": format!("Tool '{}' not found", call.name),
        });
    };

    debug!(tool = %call.name, call_id = %call.id, "dispatching tool call");
    let args = ToolArguments::new(call.arguments.clone());
    match tool.execute(&args).await {
        Ok(value) => value,
        Err(e) => {
            warn!(tool = %call.name, error = %e, "tool execution failed");
            serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            })
        }
    }
}

/// Execute a whole round of tool calls.
///
/// Calls are dispatched concurrently; results are returned as ToolResult
/// messages in the order the model requested them, preserving the
/// request/response correlation.
pub async fn execute_tool_round(tools: &[Arc<dyn Tool>], calls: &[ToolCall]) -> Vec<Message> {
    let futures = calls.iter().map(|call| dispatch_tool_call(tools, call));
    let results = futures::future::join_all(futures).await;

    calls
        .iter()
        .zip(results)
        .map(|(call, value)| Message::tool_result(call.id.clone(), value.to_string()))
        .collect()
}
