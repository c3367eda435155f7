//! User-facing error formatting.
//!
//! Failures that reach the research boundary are turned into a sentence the
//! assistant can return instead of an answer. Classification is an ordered
//! list of substring rules evaluated top to bottom — a best-effort heuristic,
//! not a guarantee.

/// Ordered (substring, template) rules. First match wins; `{tool}` is
/// replaced with the failing component's name.
const RULES: &[(&str, &str)] = &[
    (
        "timeout",
        "The {tool} tool timed out. Please try again or use a different approach.",
    ),
    (
        "not found",
        "The {tool} tool couldn't find the requested resource. Please check the input and try again.",
    ),
    (
        "permission",
        "The {tool} tool doesn't have permission to access the resource. Please check permissions.",
    ),
];

/// Format an error from a tool or the model into a user-facing sentence.
pub fn format_tool_error(error: &dyn std::fmt::Display, tool_name: &str) -> String {
    let message = error.to_string();
    let lowered = message.to_lowercase();

    for (needle, template) in RULES {
        if lowered.contains(needle) {
            return template.replace("{tool}", tool_name);
        }
    }

    format!("The {tool_name} tool encountered an error: {message}. Please try an alternative approach.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MagpieError;

    #[test]
    fn timeout_rule_matches_case_insensitively() {
        let err = MagpieError::ModelInvocation("request Timeout after 30s".into());
        let msg = format_tool_error(&err, "web_search");
        assert_eq!(
            msg,
            "The web_search tool timed out. Please try again or use a different approach."
        );
    }

    #[test]
    fn not_found_rule() {
        let err = MagpieError::ModelInvocation("resource not found".into());
        let msg = format_tool_error(&err, "scrape_webpage");
        assert!(msg.contains("couldn't find the requested resource"));
    }

    #[test]
    fn permission_rule() {
        let err = MagpieError::ModelInvocation("permission denied".into());
        let msg = format_tool_error(&err, "agent");
        assert!(msg.contains("doesn't have permission"));
    }

    #[test]
    fn generic_fallback_includes_original_message() {
        let err = MagpieError::ModelInvocation("socket hangup".into());
        let msg = format_tool_error(&err, "agent");
        assert!(msg.contains("encountered an error"));
        assert!(msg.contains("socket hangup"));
    }

    #[test]
    fn rules_are_evaluated_in_order() {
        // A message matching two rules takes the first one.
        let err = MagpieError::ModelInvocation("timeout: resource not found".into());
        let msg = format_tool_error(&err, "agent");
        assert!(msg.contains("timed out"));
    }
}
