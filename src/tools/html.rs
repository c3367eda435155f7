//! Minimal HTML text extraction shared by the search and scrape tools.
//!
//! Heuristic, not a real parser: good enough for pulling readable text and
//! anchors out of result pages and articles.

use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The regex crate has no backreferences, so each tag pairs with its
        // own close tag explicitly.
        Regex::new(
            r"(?is)<script\b.*?</script>|<style\b.*?</style>|<nav\b.*?</nav>|<header\b.*?</header>|<footer\b.*?</footer>|<aside\b.*?</aside>|<iframe\b.*?</iframe>",
        )
        .expect("valid regex")
    })
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
            .expect("valid regex")
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"))
}

/// Decode the handful of entities that matter for readable text.
pub fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Remove scripts, styles, chrome elements and all tags; collapse whitespace.
pub fn strip_tags(html: &str) -> String {
    let without_blocks = script_style_re().replace_all(html, " ");
    let without_tags = tag_re().replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the page title, if any.
pub fn page_title(html: &str) -> Option<String> {
    title_re()
        .captures(html)
        .map(|c| strip_tags(&c[1]))
        .filter(|t| !t.is_empty())
}

/// Extract (href, anchor text) pairs.
pub fn anchors(html: &str) -> Vec<(String, String)> {
    anchor_re()
        .captures_iter(html)
        .map(|c| (decode_entities(&c[1]), strip_tags(&c[2])))
        .collect()
}

/// Truncate to a byte budget on a char boundary, flagging when cut.
pub fn truncate_text(text: &str, max_length: usize) -> (String, bool) {
    if text.len() <= max_length {
        return (text.to_string(), false);
    }
    let mut cutoff = max_length;
    while cutoff > 0 && !text.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    (format!("{}... [Content truncated]", &text[..cutoff]), true)
}
