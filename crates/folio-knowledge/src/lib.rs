//! # Folio Knowledge Base
//!
//! Ultra-lightweight retrieval for the portfolio assistant.
//! No vector DB, no embeddings: a few dozen documents scored by keywords.
//!
//! ## Design
//! - **Two sources**: localized translation records (about + portfolio) and
//!   annotated project documents (metadata block + markup body)
//! - **Merge on (lang, slug)**: a project document enriches its portfolio
//!   entry instead of duplicating it
//! - **Weighted keyword scoring**: title > tags > subtitle > body hits
//! - **Snapshot swap**: rebuilds never touch the snapshot readers hold
//!
//! ## How it works
//! ```text
//! Visitor: "Tell me about your AI-CRM pricing!"
//!   ↓
//! tokenize → ["your", "ai-crm", "pricing"]
//!   ↓ weighted multi-field score
//! Top 4 snippets in the visitor's language
//!   ↓
//! Injected into the chat system prompt as grounding context
//!   (or answered locally by the fallback matcher)
//! ```

pub mod document;
pub mod extract;
pub mod fallback;
pub mod frontmatter;
pub mod index;
pub mod search;
pub mod source;
pub mod store;

pub use document::{Document, DocumentKind, Snippet};
pub use fallback::FallbackMatcher;
pub use index::Snapshot;
pub use search::{Ranked, Scorer, Searcher, Tokenizer};
pub use source::{LocaleRecord, Translations};
pub use store::KnowledgeStore;
