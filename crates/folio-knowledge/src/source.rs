//! Structured translation records and their on-disk layouts.
//!
//! Three site layouts exist in the wild. They are tried in order and the
//! first that loads is normalized into one [`Translations`] value:
//! 1. per-language files: `{i18n_dir}/{lang}.json`
//! 2. merged file: `{i18n_dir}/translations.json` keyed by language
//! 3. legacy merged file at `legacy_translations`

use folio_core::config::KnowledgeConfig;
use folio_core::error::{FolioError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One language's structured record. Unknown sections are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleRecord {
    #[serde(default)]
    pub about: Option<AboutSection>,
    #[serde(default)]
    pub portfolio: Option<PortfolioSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub values: Vec<AboutValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutValue {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSection {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<PortfolioItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl LocaleRecord {
    pub fn portfolio_items(&self) -> &[PortfolioItem] {
        self.portfolio
            .as_ref()
            .map(|p| p.items.as_slice())
            .unwrap_or_default()
    }
}

/// A list field that is not a list (or holds malformed entries) reads as empty.
fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Which layout the record was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLayout {
    PerLanguage(PathBuf),
    Merged(PathBuf),
    Legacy(PathBuf),
}

/// Normalized structured records keyed by language code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    locales: BTreeMap<String, LocaleRecord>,
}

impl Translations {
    pub fn new(locales: BTreeMap<String, LocaleRecord>) -> Self {
        Self { locales }
    }

    pub fn get(&self, lang: &str) -> Option<&LocaleRecord> {
        self.locales.get(lang)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }
}

/// Load the structured record using the ordered layout fallback.
///
/// Fails only when no layout can be loaded; that aborts an index build.
pub fn load_translations(config: &KnowledgeConfig) -> Result<(Translations, SourceLayout)> {
    let i18n_dir = config.resolve_path(&config.i18n_dir);

    match load_per_language(&i18n_dir, &config.languages) {
        Ok(t) => return Ok((t, SourceLayout::PerLanguage(i18n_dir))),
        Err(e) => tracing::debug!("per-language translations unavailable: {e}"),
    }

    let merged = i18n_dir.join("translations.json");
    match load_merged(&merged) {
        Ok(t) => return Ok((t, SourceLayout::Merged(merged))),
        Err(e) => tracing::debug!("merged translations unavailable: {e}"),
    }

    let legacy = config.resolve_path(&config.legacy_translations);
    match load_merged(&legacy) {
        Ok(t) => Ok((t, SourceLayout::Legacy(legacy))),
        Err(e) => Err(FolioError::Source(format!(
            "no translations found under {} (last error: {e})",
            i18n_dir.display()
        ))),
    }
}

fn load_per_language(dir: &Path, languages: &[String]) -> Result<Translations> {
    let mut locales = BTreeMap::new();
    for lang in languages {
        let path = dir.join(format!("{lang}.json"));
        let raw = std::fs::read_to_string(&path)?;
        let record: LocaleRecord = serde_json::from_str(&raw)?;
        locales.insert(lang.clone(), record);
    }
    Ok(Translations::new(locales))
}

fn load_merged(path: &Path) -> Result<Translations> {
    let raw = std::fs::read_to_string(path)?;
    let locales: BTreeMap<String, LocaleRecord> = serde_json::from_str(&raw)?;
    Ok(Translations::new(locales))
}
