//! Document and snippet records.

use serde::{Deserialize, Serialize};

/// Where a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Summary of a language's about section.
    About,
    /// Portfolio entry from the translation record.
    PortfolioItem,
    /// Annotated project document with no portfolio entry.
    ProjectDetail,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::About => "about",
            Self::PortfolioItem => "portfolio_item",
            Self::ProjectDetail => "project_detail",
        }
    }
}

/// The unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub lang: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    /// Project link relative to the site root, when the document has a slug.
    pub fn link(&self) -> Option<String> {
        self.slug
            .as_ref()
            .map(|slug| format!("/{}/project/{}", self.lang, slug))
    }
}

/// Display-ready projection of a ranked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub lang: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub score: u32,
}

impl Snippet {
    /// Project a document, keeping the first `excerpt_chars` characters of its
    /// text. No word-boundary adjustment.
    pub fn from_document(doc: &Document, score: u32, excerpt_chars: usize) -> Self {
        Self {
            title: doc.title.clone(),
            slug: doc.slug.clone(),
            lang: doc.lang.clone(),
            tags: doc.tags.clone(),
            excerpt: doc.text.chars().take(excerpt_chars).collect(),
            score,
        }
    }
}
