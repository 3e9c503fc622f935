//! Prompt assembly for grounded chat.

use folio_core::types::{ChatMessage, Role};
use folio_knowledge::Snippet;

const INSTRUCTIONS: [&str; 4] = [
    "You are a helpful portfolio assistant for a personal website.",
    "Answer questions about the developer's experience and projects.",
    "Rely primarily on the provided knowledge snippets; if something is unknown, say you are not sure and suggest getting in touch.",
    "Keep answers concise and helpful. Include links as /{lang}/project/{slug} when referencing projects.",
];

pub fn system_prompt(lang: &str) -> String {
    let reply_in = if lang == "nl" {
        "If the visitor writes in Dutch, reply in Dutch; otherwise reply in English."
    } else {
        "Reply in the visitor's language, defaulting to English."
    };
    format!("{} Current language: {lang}. {reply_in}", INSTRUCTIONS.join(" "))
}

/// Numbered snippet listing injected as the second system message.
pub fn knowledge_block(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let link = s
                .slug
                .as_ref()
                .map(|slug| format!(" (/{}/project/{slug})", s.lang))
                .unwrap_or_default();
            format!(
                "(#{}) [{}] {}{}\nTags: {}\nExcerpt: {}",
                i + 1,
                s.lang,
                s.title,
                link,
                s.tags.join(", "),
                s.excerpt
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn knowledge_context(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        "No matching knowledge snippets found.".to_string()
    } else {
        format!("Knowledge snippets (top matches):\n\n{}", knowledge_block(snippets))
    }
}

/// System prompt, knowledge context, then the visitor's conversation.
///
/// Client-supplied system messages are dropped.
pub fn build_messages(lang: &str, snippets: &[Snippet], history: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(system_prompt(lang)),
        ChatMessage::system(knowledge_context(snippets)),
    ];
    messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
    messages
}
