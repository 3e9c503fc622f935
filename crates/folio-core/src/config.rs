//! Folio configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FolioError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl FolioConfig {
    /// Load config from the default path (~/.folio/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FolioError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| FolioError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Resolve the config file: explicit path, then `FOLIO_CONFIG`, then the
    /// default path. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match std::env::var("FOLIO_CONFIG") {
                Ok(path) => Self::load_from(Path::new(&path))?,
                Err(_) => Self::load()?,
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides (`PORT`).
    pub fn apply_env(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.gateway.port = port;
        }
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Folio home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".folio")
    }
}

/// Gateway (HTTP API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// When set, `POST /api/reindex` requires a matching `X-Admin-Token` header.
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_port() -> u16 { 3001 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: Vec::new(),
            admin_token: None,
        }
    }
}

/// Knowledge index configuration: where the site content lives and how it is
/// scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Site checkout that relative paths below are resolved against.
    #[serde(default = "default_site_root")]
    pub site_root: String,
    /// Closed set of language codes. The first one is the default language.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Directory holding `{lang}.json` or a merged `translations.json`.
    #[serde(default = "default_i18n_dir")]
    pub i18n_dir: String,
    /// Merged translations file of the legacy site layout.
    #[serde(default = "default_legacy_translations")]
    pub legacy_translations: String,
    /// Candidate content directories; the first existing one is indexed.
    #[serde(default = "default_content_dirs")]
    pub content_dirs: Vec<String>,
    /// Extension of annotated project documents.
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_k")]
    pub default_k: usize,
    #[serde(default = "default_chat_k")]
    pub chat_k: usize,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub weights: ScoringWeights,
}

fn default_site_root() -> String { ".".into() }
fn default_languages() -> Vec<String> {
    vec!["en", "nl"].into_iter().map(String::from).collect()
}
fn default_i18n_dir() -> String { "frontend/src/i18n".into() }
fn default_legacy_translations() -> String { "src/i18n/translations.json".into() }
fn default_content_dirs() -> Vec<String> {
    vec!["frontend/src/content", "src/content"]
        .into_iter().map(String::from).collect()
}
fn default_extension() -> String { "mdx".into() }
fn default_k() -> usize { 3 }
fn default_chat_k() -> usize { 4 }
fn default_excerpt_chars() -> usize { 800 }
fn default_stop_words() -> Vec<String> {
    vec!["the", "and", "or", "about", "tell", "me", "you", "are", "what", "do"]
        .into_iter().map(String::from).collect()
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            site_root: default_site_root(),
            languages: default_languages(),
            i18n_dir: default_i18n_dir(),
            legacy_translations: default_legacy_translations(),
            content_dirs: default_content_dirs(),
            extension: default_extension(),
            default_k: default_k(),
            chat_k: default_chat_k(),
            excerpt_chars: default_excerpt_chars(),
            stop_words: default_stop_words(),
            weights: ScoringWeights::default(),
        }
    }
}

impl KnowledgeConfig {
    /// Resolve a configured path: `~` is expanded, relative paths are joined
    /// onto `site_root`.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(path).as_ref());
        if expanded.is_absolute() {
            expanded
        } else {
            PathBuf::from(shellexpand::tilde(&self.site_root).as_ref()).join(expanded)
        }
    }

    /// Language used for content that does not name one.
    pub fn default_language(&self) -> &str {
        self.languages.first().map(String::as_str).unwrap_or("en")
    }
}

/// Per-field weights of the keyword scorer.
///
/// Defaults are heuristic: title beats tags beats subtitle beats body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_title_weight")]
    pub title: u32,
    #[serde(default = "default_subtitle_weight")]
    pub subtitle: u32,
    #[serde(default = "default_tag_weight")]
    pub tag: u32,
    #[serde(default = "default_body_weight")]
    pub body: u32,
    /// Maximum body occurrences counted per token.
    #[serde(default = "default_body_cap")]
    pub body_cap: u32,
}

fn default_title_weight() -> u32 { 6 }
fn default_subtitle_weight() -> u32 { 3 }
fn default_tag_weight() -> u32 { 4 }
fn default_body_weight() -> u32 { 1 }
fn default_body_cap() -> u32 { 3 }

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: default_title_weight(),
            subtitle: default_subtitle_weight(),
            tag: default_tag_weight(),
            body: default_body_weight(),
            body_cap: default_body_cap(),
        }
    }
}

/// Generative backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Registry name (`openai`, `groq`, `ollama`, ...) or `custom:<base url>`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Overrides the registry's environment variables when non-empty.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the registry's base URL when non-empty.
    #[serde(default)]
    pub endpoint: String,
}

fn default_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_temperature() -> f32 { 0.4 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_key: String::new(),
            endpoint: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert!((config.llm.temperature - 0.4).abs() < 0.01);
        assert_eq!(config.knowledge.languages, vec!["en", "nl"]);
        assert_eq!(config.knowledge.excerpt_chars, 800);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [gateway]
            port = 8080
            admin_token = "s3cret"

            [knowledge]
            languages = ["nl", "en"]
            chat_k = 6

            [knowledge.weights]
            title = 10

            [llm]
            provider = "groq"
            model = "llama-3.1-8b-instant"
        "#;

        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.knowledge.default_language(), "nl");
        assert_eq!(config.knowledge.chat_k, 6);
        assert_eq!(config.knowledge.weights.title, 10);
        assert_eq!(config.knowledge.weights.tag, 4);
        assert_eq!(config.llm.provider, "groq");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: FolioConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 3001);
        assert_eq!(config.knowledge.weights, ScoringWeights::default());
        assert_eq!(config.knowledge.stop_words.len(), 10);
    }

    #[test]
    fn test_resolve_path_joins_site_root() {
        let knowledge = KnowledgeConfig {
            site_root: "/srv/site".into(),
            ..Default::default()
        };
        assert_eq!(
            knowledge.resolve_path("frontend/src/i18n"),
            PathBuf::from("/srv/site/frontend/src/i18n")
        );
        assert_eq!(knowledge.resolve_path("/abs/dir"), PathBuf::from("/abs/dir"));
    }

    #[test]
    fn test_home_dir() {
        let home = FolioConfig::home_dir();
        assert!(home.to_string_lossy().contains(".folio"));
    }
}
