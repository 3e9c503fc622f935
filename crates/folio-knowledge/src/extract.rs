//! Document extraction from translation records and project files.

use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentKind};
use crate::frontmatter::{self, LayoutProps, Metadata};
use crate::source::{AboutSection, Translations};

/// Tags attached to every about document.
pub const ABOUT_TAGS: [&str; 4] = ["about", "experience", "mission", "values"];

/// Documents from the structured record, in language order: the about
/// summary first, then portfolio items in record order.
pub fn extract_structured(translations: &Translations, languages: &[String]) -> Vec<Document> {
    let mut docs = Vec::new();
    for lang in languages {
        let Some(record) = translations.get(lang) else {
            continue;
        };

        if let Some(about) = &record.about {
            docs.push(about_document(lang, about));
        }

        for (position, item) in record.portfolio_items().iter().enumerate() {
            let key = item.slug.clone().unwrap_or_else(|| position.to_string());
            docs.push(Document {
                id: format!("{lang}-portfolio-{key}"),
                lang: lang.clone(),
                kind: DocumentKind::PortfolioItem,
                title: item.title.clone(),
                subtitle: None,
                slug: item.slug.clone(),
                text: item.description.clone(),
                tags: item.tags.clone(),
            });
        }
    }
    docs
}

fn about_document(lang: &str, about: &AboutSection) -> Document {
    let title = about.title.clone().unwrap_or_else(|| "About".to_string());
    let subtitle = about.subtitle.as_deref().unwrap_or("");
    let values = if about.values.is_empty() {
        String::new()
    } else {
        let joined = about
            .values
            .iter()
            .map(|v| format!("{}: {}", v.title, v.description))
            .collect::<Vec<_>>()
            .join(". ");
        format!(" Values: {joined}")
    };
    let text = format!("{title}. {subtitle}.{values}").trim().to_string();

    Document {
        id: format!("{lang}-about"),
        lang: lang.to_string(),
        kind: DocumentKind::About,
        title,
        subtitle: None,
        slug: None,
        text,
        tags: ABOUT_TAGS.iter().map(|t| t.to_string()).collect(),
    }
}

/// A parsed project file, kept in parts so the index builder can merge it
/// into an existing portfolio entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDocument {
    pub lang: String,
    pub slug: String,
    pub meta: Metadata,
    pub layout: LayoutProps,
    /// Plain text of the body after the metadata block.
    pub body: String,
}

impl FileDocument {
    pub fn parse(lang: &str, slug: &str, raw: &str) -> Self {
        let (meta, body) = frontmatter::split(raw);
        Self {
            lang: lang.to_string(),
            slug: slug.to_string(),
            meta,
            layout: frontmatter::layout_props(body),
            body: frontmatter::strip_markup(body),
        }
    }

    /// Standalone `project_detail` document for a file with no portfolio entry.
    pub fn into_document(self) -> Document {
        let title = self
            .meta
            .title
            .or(self.layout.title)
            .unwrap_or_else(|| self.slug.clone());
        let text = match &self.meta.description {
            Some(description) => join_text(description, &self.body),
            None => self.body,
        };
        Document {
            id: format!("{}-mdx-{}", self.lang, self.slug),
            lang: self.lang,
            kind: DocumentKind::ProjectDetail,
            title,
            subtitle: self.meta.subtitle.or(self.layout.subtitle),
            slug: Some(self.slug),
            text,
            tags: self.meta.tags.unwrap_or_default(),
        }
    }
}

/// Join two text fragments with a single space, trimming the result.
pub(crate) fn join_text(a: &str, b: &str) -> String {
    format!("{a} {b}").trim().to_string()
}

/// Recursively collect files with `extension` under `root`, sorted by path.
/// Symlinks are not followed.
pub fn collect_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk(root, extension, &mut files);
    files.sort();
    files
}

fn walk(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Skipping unreadable directory {}: {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            walk(&path, extension, out);
        } else if file_type.is_file() && path.extension().is_some_and(|e| e == extension) {
            out.push(path);
        }
    }
}

/// `(lang, slug)` of a content file: the first directory below `root` names
/// the language, the file stem is the slug. Files directly under `root` take
/// `default_lang`. Files under a directory that is not a known language yield
/// `None`.
pub fn file_identity(
    root: &Path,
    path: &Path,
    languages: &[String],
    default_lang: &str,
) -> Option<(String, String)> {
    let rel = path.strip_prefix(root).ok()?;
    let slug = rel.file_stem()?.to_str()?.to_string();
    let mut components = rel.components();
    let first = components.next()?.as_os_str().to_str()?;
    if components.next().is_none() {
        return Some((default_lang.to_string(), slug));
    }
    if languages.iter().any(|l| l == first) {
        Some((first.to_string(), slug))
    } else {
        tracing::warn!(
            "Skipping {}: '{first}' is not a configured language",
            path.display()
        );
        None
    }
}
