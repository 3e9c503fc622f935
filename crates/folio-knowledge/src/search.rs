//! Keyword scoring and ranking.
//!
//! Additive model, no length normalization. Per query token:
//! - substring of the title: `weights.title`
//! - substring of the subtitle: `weights.subtitle`
//! - substring of any tag: `weights.tag`
//! - occurrences in the text, capped at `weights.body_cap`: `weights.body` each

use folio_core::config::{KnowledgeConfig, ScoringWeights};
use std::collections::HashSet;

use crate::document::Document;

/// Minimum token length in characters.
const MIN_TOKEN_LEN: usize = 2;

/// Query normalizer: lowercase, strip punctuation, drop short and stop words.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stop_words: stop_words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if is_token_char(c) { c } else { ' ' })
            .collect();
        normalized
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
            .filter(|t| !self.stop_words.contains(*t))
            .map(String::from)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(KnowledgeConfig::default().stop_words)
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || matches!(c, '#' | '-' | '_' | '/')
}

/// Weighted multi-field scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score one document against already tokenized input.
    pub fn score(&self, tokens: &[String], doc: &Document) -> u32 {
        if tokens.is_empty() {
            return 0;
        }
        let title = doc.title.to_lowercase();
        let subtitle = doc.subtitle.as_deref().map(str::to_lowercase);
        let tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();
        let body = doc.text.to_lowercase();
        let w = &self.weights;

        tokens
            .iter()
            .map(|tok| {
                let tok = tok.as_str();
                let mut score = 0;
                if title.contains(tok) {
                    score += w.title;
                }
                if subtitle.as_deref().is_some_and(|s| s.contains(tok)) {
                    score += w.subtitle;
                }
                if tags.iter().any(|t| t.contains(tok)) {
                    score += w.tag;
                }
                let hits = body.matches(tok).take(w.body_cap as usize).count() as u32;
                score + hits * w.body
            })
            .sum()
    }
}

/// A document paired with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub document: &'a Document,
    pub score: u32,
}

/// Tokenizer and scorer configured together.
#[derive(Debug, Clone, Default)]
pub struct Searcher {
    tokenizer: Tokenizer,
    scorer: Scorer,
}

impl Searcher {
    pub fn new(tokenizer: Tokenizer, scorer: Scorer) -> Self {
        Self { tokenizer, scorer }
    }

    pub fn from_config(config: &KnowledgeConfig) -> Self {
        Self::new(
            Tokenizer::new(config.stop_words.iter().cloned()),
            Scorer::new(config.weights),
        )
    }

    pub fn score(&self, query: &str, doc: &Document) -> u32 {
        self.scorer.score(&self.tokenizer.tokenize(query), doc)
    }

    /// Top `k` documents with a positive score, best first.
    ///
    /// `lang` restricts the candidates; `None` searches every language. Equal
    /// scores keep index order.
    pub fn rank<'a>(
        &self,
        documents: &'a [Document],
        query: &str,
        lang: Option<&str>,
        k: usize,
    ) -> Vec<Ranked<'a>> {
        let tokens = self.tokenizer.tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<Ranked<'a>> = documents
            .iter()
            .filter(|d| lang.is_none_or(|l| d.lang == l))
            .map(|document| Ranked {
                document,
                score: self.scorer.score(&tokens, document),
            })
            .filter(|r| r.score > 0)
            .collect();
        // `sort_by` is stable: ties stay in index order.
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;

    fn doc(id: &str, lang: &str, title: &str, text: &str, tags: &[&str]) -> Document {
        Document {
            id: id.into(),
            lang: lang.into(),
            kind: DocumentKind::PortfolioItem,
            title: title.into(),
            subtitle: None,
            slug: Some(id.into()),
            text: text.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_punctuation() {
        let tokens = Tokenizer::default().tokenize("Tell me about your AI-CRM pricing!");
        assert_eq!(tokens, vec!["your", "ai-crm", "pricing"]);
    }

    #[test]
    fn test_tokenize_keeps_symbols_and_drops_short() {
        let tokens = Tokenizer::default().tokenize("C# a/b x node_js é");
        assert_eq!(tokens, vec!["c#", "a/b", "node_js"]);
    }

    #[test]
    fn test_stop_word_only_query_is_empty() {
        let tokens = Tokenizer::default().tokenize("what do you do? Tell me!");
        assert!(tokens.is_empty());
        let docs = vec![doc("a", "en", "What", "do you", &[])];
        assert!(Searcher::default().rank(&docs, "what do you do", None, 3).is_empty());
    }

    #[test]
    fn test_title_outscores_text() {
        let searcher = Searcher::default();
        let in_title = doc("a", "en", "Pricing engine", "Fast.", &[]);
        let in_text = doc("b", "en", "Engine", "Fast pricing.", &[]);
        assert!(searcher.score("pricing", &in_title) > searcher.score("pricing", &in_text));
    }

    #[test]
    fn test_field_weights() {
        let scorer = Scorer::default();
        let mut d = doc("a", "en", "Rust service", "rust rust rust rust rust", &["Rustacean"]);
        d.subtitle = Some("Written in Rust".into());
        let tokens = vec!["rust".to_string()];
        // title 6 + subtitle 3 + tag 4 + body capped at 3
        assert_eq!(scorer.score(&tokens, &d), 16);
        assert_eq!(scorer.score(&[], &d), 0);
    }

    #[test]
    fn test_multi_token_scores_add_up() {
        let searcher = Searcher::default();
        let mut d = doc("a", "en", "Rust CLI", "Dynamic pricing engine", &["pricing"]);
        d.subtitle = Some("Pricing toolkit".into());
        // rust: title 6; pricing: subtitle 3 + tag 4 + body 1
        assert_eq!(searcher.score("rust", &d), 6);
        assert_eq!(searcher.score("pricing", &d), 8);
        assert_eq!(searcher.score("rust pricing", &d), 14);
        assert_eq!(searcher.score("Rust, and pricing?", &d), 14);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = Scorer::new(ScoringWeights {
            title: 10,
            subtitle: 0,
            tag: 0,
            body: 2,
            body_cap: 1,
        });
        let d = doc("a", "en", "Rust", "rust rust", &[]);
        assert_eq!(scorer.score(&["rust".to_string()], &d), 12);
    }

    #[test]
    fn test_rank_orders_and_excludes_zero() {
        let docs = vec![
            doc("tagged", "en", "Service", "Backend work", &["rust"]),
            doc("none", "en", "Pricing", "Python", &[]),
            doc("titled", "en", "Rust CLI", "rust, rust and more rust", &[]),
        ];
        let ranked = Searcher::default().rank(&docs, "rust", None, 3);
        let got: Vec<_> = ranked.iter().map(|r| (r.document.id.as_str(), r.score)).collect();
        assert_eq!(got, vec![("titled", 9), ("tagged", 4)]);
    }

    #[test]
    fn test_rank_ties_keep_index_order_and_limit() {
        let docs = vec![
            doc("first", "en", "AI one", "", &[]),
            doc("second", "en", "AI two", "", &[]),
            doc("third", "en", "AI three", "", &[]),
        ];
        let ranked = Searcher::default().rank(&docs, "ai", None, 2);
        let ids: Vec<_> = ranked.iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_language_isolation() {
        let docs = vec![
            doc("en-crm", "en", "CRM", "crm", &["crm"]),
            doc("nl-crm", "nl", "CRM", "crm", &["crm"]),
        ];
        let searcher = Searcher::default();
        let nl = searcher.rank(&docs, "crm", Some("nl"), 4);
        assert_eq!(nl.len(), 1);
        assert!(nl.iter().all(|r| r.document.lang == "nl"));
        assert!(searcher.rank(&docs, "crm", Some("de"), 4).is_empty());
        assert_eq!(searcher.rank(&docs, "crm", None, 4).len(), 2);
    }
}
