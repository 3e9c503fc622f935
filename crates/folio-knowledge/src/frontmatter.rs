//! Metadata block parsing and markup stripping for project documents.
//!
//! The parser is deliberately permissive: recognized keys become typed
//! fields, unknown keys are dropped, and a list that fails to parse becomes
//! an empty list instead of an error.

use regex::Regex;
use std::sync::LazyLock;

static KEY_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_]+):\s*(.*)$").expect("valid regex"));
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static LAYOUT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btitle="([^"]+)""#).expect("valid regex"));
static LAYOUT_SUBTITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bsubtitle="([^"]+)""#).expect("valid regex"));

/// Component whose attributes carry a project's display title.
const LAYOUT_TAG: &str = "<ProjectLayout";

/// Typed fields of a document's leading metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// `None` when the block has no `tags` list; `Some(vec![])` when the list
    /// was present but malformed or empty.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Scalar(String),
    List(Vec<String>),
}

/// Split a raw document into its metadata and the body after the block.
///
/// A block opens with `---` at the very start of the document and closes at
/// the next `---`. Without a block the whole input is the body.
pub fn split(raw: &str) -> (Metadata, &str) {
    let Some(after_open) = raw.strip_prefix("---") else {
        return (Metadata::default(), raw);
    };
    let Some(end) = after_open.find("---") else {
        return (Metadata::default(), raw);
    };
    let block = &after_open[..end];
    let body = &after_open[end + 3..];
    (parse_block(block), body)
}

fn parse_block(block: &str) -> Metadata {
    let mut meta = Metadata::default();
    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(caps) = KEY_VALUE.captures(trimmed) else {
            continue;
        };
        let value = parse_value(caps[2].trim());
        match (&caps[1], value) {
            ("title", Value::Scalar(s)) => meta.title = non_empty(s),
            ("subtitle", Value::Scalar(s)) => meta.subtitle = non_empty(s),
            ("description", Value::Scalar(s)) => meta.description = non_empty(s),
            ("tags", Value::List(list)) => meta.tags = Some(list),
            _ => {}
        }
    }
    meta
}

fn parse_value(raw: &str) -> Value {
    if raw.starts_with('[') && raw.ends_with(']') {
        let json = raw.replace('\'', "\"");
        let list = serde_json::from_str::<Vec<serde_json::Value>>(&json)
            .map(|items| {
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(s) => Some(s),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        serde_json::Value::Bool(b) => Some(b.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        return Value::List(list);
    }
    let unquoted = raw
        .strip_prefix(['"', '\''])
        .unwrap_or(raw);
    let unquoted = unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted);
    Value::Scalar(unquoted.to_string())
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Title and subtitle attributes of the first layout tag, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutProps {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

pub fn layout_props(src: &str) -> LayoutProps {
    let Some(open) = src.find(LAYOUT_TAG) else {
        return LayoutProps::default();
    };
    let Some(close) = src[open..].find('>') else {
        return LayoutProps::default();
    };
    let props = &src[open..open + close + 1];
    LayoutProps {
        title: LAYOUT_TITLE.captures(props).map(|c| c[1].to_string()),
        subtitle: LAYOUT_SUBTITLE.captures(props).map(|c| c[1].to_string()),
    }
}

/// Reduce a markup body to searchable plain text: code fences removed, tags
/// replaced by a space, whitespace collapsed.
pub fn strip_markup(src: &str) -> String {
    let without_code = CODE_FENCE.replace_all(src, "");
    let without_tags = MARKUP_TAG.replace_all(&without_code, " ");
    WHITESPACE
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}
