//! Offline answers from the structured record alone.
//!
//! Used when the chat backend is unreachable or unconfigured. This is not
//! the weighted scorer: intent phrases first, then plain substring
//! containment over portfolio items. Keeping it this small means it only
//! needs the translation record, never the full index.

use regex::Regex;
use std::sync::LazyLock;

use crate::source::{LocaleRecord, PortfolioItem};

static ABOUT_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(about|experience|who\s+are\s+you|what\s+do\s+you\s+do)").expect("valid regex")
});
static LIST_INTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(all\s+projects|list\s+projects|show\s+projects)").expect("valid regex")
});

/// Maximum number of projects in one answer.
pub const MAX_ENTRIES: usize = 6;

pub const HINT: &str = "I couldn't find that yet. Try asking about: 'AI', 'pricing engine', 'CRM', or say 'list projects'.";
pub const NO_MATCHES: &str = "No matching projects found.";

/// Keyword matcher over one language's record.
#[derive(Debug, Clone, Copy)]
pub struct FallbackMatcher<'a> {
    record: &'a LocaleRecord,
    lang: &'a str,
}

impl<'a> FallbackMatcher<'a> {
    pub fn new(record: &'a LocaleRecord, lang: &'a str) -> Self {
        Self { record, lang }
    }

    pub fn answer(&self, query: &str) -> String {
        let lower = query.trim().to_lowercase();
        if lower.is_empty() {
            return HINT.to_string();
        }

        if ABOUT_INTENT.is_match(&lower) {
            return self.about_summary();
        }

        if LIST_INTENT.is_match(&lower) {
            return self.format_projects(self.record.portfolio_items().iter());
        }

        let matches: Vec<&PortfolioItem> = self.search(&lower);
        if matches.is_empty() {
            HINT.to_string()
        } else {
            self.format_projects(matches.into_iter())
        }
    }

    /// Items whose title, description, tags or slug contain `needle`
    /// (already lowercased).
    pub fn search(&self, needle: &str) -> Vec<&'a PortfolioItem> {
        self.record
            .portfolio_items()
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(needle)
                    || item.description.to_lowercase().contains(needle)
                    || item.tags.iter().any(|t| t.to_lowercase().contains(needle))
                    || item
                        .slug
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(needle))
            })
            .collect()
    }

    fn about_summary(&self) -> String {
        let about = self.record.about.as_ref();
        let title = about.and_then(|a| a.title.as_deref()).unwrap_or("About");
        let subtitle = about.and_then(|a| a.subtitle.as_deref()).unwrap_or("");
        let values = about
            .map(|a| {
                a.values
                    .iter()
                    .map(|v| format!("- {}: {}", v.title, v.description))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        format!("About — {title}\n{subtitle}\n\nCore values:\n{values}")
    }

    fn format_projects<'i>(&self, items: impl Iterator<Item = &'i PortfolioItem>) -> String {
        let entries: Vec<String> = items
            .take(MAX_ENTRIES)
            .map(|item| {
                let link = item
                    .slug
                    .as_ref()
                    .map(|slug| format!(" → /{}/project/{}", self.lang, slug))
                    .unwrap_or_default();
                format!(
                    "{}{}\n- {}\n- Tags: {}",
                    item.title,
                    link,
                    item.description,
                    item.tags.join(", ")
                )
            })
            .collect();
        if entries.is_empty() {
            NO_MATCHES.to_string()
        } else {
            entries.join("\n\n")
        }
    }
}
