//! Index building: extract both sources and merge them on `(lang, slug)`.

use chrono::{DateTime, Utc};
use folio_core::config::KnowledgeConfig;
use folio_core::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::document::Document;
use crate::extract::{self, FileDocument, join_text};
use crate::source::{self, LocaleRecord, Translations};

/// An immutable, fully built index.
#[derive(Debug, Clone)]
pub struct Snapshot {
    documents: Vec<Document>,
    translations: Translations,
    built_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(documents: Vec<Document>, translations: Translations) -> Self {
        Self {
            documents,
            translations,
            built_at: Utc::now(),
        }
    }

    /// Documents in index order. Ranking ties resolve in this order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The structured record the snapshot was built from.
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    pub fn locale(&self, lang: &str) -> Option<&LocaleRecord> {
        self.translations.get(lang)
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Build a fresh snapshot from the configured sources.
///
/// Fails only when the structured record cannot be loaded. Unreadable or
/// misplaced project files are skipped.
pub fn build(config: &KnowledgeConfig) -> Result<Snapshot> {
    let (translations, layout) = source::load_translations(config)?;
    let structured = extract::extract_structured(&translations, &config.languages);
    let structured_count = structured.len();
    let files = load_file_documents(config);
    let file_count = files.len();
    let documents = merge(structured, files);

    let languages: Vec<&str> = translations.languages().collect();
    tracing::info!(
        "📚 Knowledge index built: {} documents ({} structured, {} files, source {:?}, languages {})",
        documents.len(),
        structured_count,
        file_count,
        layout,
        languages.join(", ")
    );
    Ok(Snapshot::new(documents, translations))
}

fn content_root(config: &KnowledgeConfig) -> Option<PathBuf> {
    config
        .content_dirs
        .iter()
        .map(|dir| config.resolve_path(dir))
        .find(|dir| dir.is_dir())
}

fn load_file_documents(config: &KnowledgeConfig) -> Vec<FileDocument> {
    let Some(root) = content_root(config) else {
        tracing::debug!("No content directory found; indexing structured records only");
        return Vec::new();
    };

    let mut files = Vec::new();
    for path in extract::collect_files(&root, &config.extension) {
        let Some((lang, slug)) =
            extract::file_identity(&root, &path, &config.languages, config.default_language())
        else {
            continue;
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => files.push(FileDocument::parse(&lang, &slug, &raw)),
            Err(e) => tracing::warn!("⚠️ Skipping unreadable {}: {e}", path.display()),
        }
    }
    files
}

/// Merge file documents into the structured ones.
///
/// A file whose `(lang, slug)` is already present enriches that document in
/// place; otherwise it is appended as a `project_detail`. Slug-less documents
/// are never merge targets.
pub fn merge(structured: Vec<Document>, files: Vec<FileDocument>) -> Vec<Document> {
    let mut documents = structured;
    let mut by_key: HashMap<(String, String), usize> = HashMap::new();
    for (i, doc) in documents.iter().enumerate() {
        if let Some(slug) = &doc.slug {
            by_key.entry((doc.lang.clone(), slug.clone())).or_insert(i);
        }
    }

    for file in files {
        let key = (file.lang.clone(), file.slug.clone());
        match by_key.get(&key) {
            Some(&i) => enrich(&mut documents[i], file),
            None => {
                by_key.insert(key, documents.len());
                documents.push(file.into_document());
            }
        }
    }
    documents
}

fn enrich(doc: &mut Document, file: FileDocument) {
    let FileDocument {
        slug, meta, layout, body, ..
    } = file;

    if doc.title.is_empty() {
        doc.title = meta.title.or(layout.title).unwrap_or(slug);
    }
    if doc.tags.is_empty() {
        if let Some(tags) = meta.tags {
            doc.tags = tags;
        }
    }
    if doc.subtitle.is_none() {
        doc.subtitle = meta.subtitle.or(layout.subtitle);
    }
    if let Some(description) = &meta.description {
        doc.text = join_text(description, &doc.text);
    }
    doc.text = join_text(&doc.text, &body);
}
