//! # Folio Providers
//!
//! Streaming chat backends for the portfolio assistant.
//!
//! Every supported backend speaks the OpenAI chat completions protocol, so a
//! single `OpenAiCompatibleProvider` covers them all; the registry only
//! records endpoint, auth style and key variables per name.

pub mod openai_compatible;
pub mod provider;
pub mod provider_registry;
pub mod sse;

pub use provider::{ChatStream, Provider};

use folio_core::config::LlmConfig;
use folio_core::error::{FolioError, Result};

/// Create the provider named by `config.provider`.
///
/// Accepts a registry name or `custom:<base url>`.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn Provider>> {
    let name = config.provider.trim();
    match name {
        // Custom endpoint: "custom:https://my-server.com/v1"
        other if other.starts_with("custom:") => Ok(Box::new(
            openai_compatible::OpenAiCompatibleProvider::custom(other, config)?,
        )),
        _ => {
            let registry = provider_registry::get_provider_config(name)
                .ok_or_else(|| {
                    FolioError::ProviderNotFound(format!(
                        "{name} (available: {})",
                        available_providers().join(", ")
                    ))
                })?;
            Ok(Box::new(
                openai_compatible::OpenAiCompatibleProvider::from_registry(registry, config)?,
            ))
        }
    }
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            api_key: "sk-test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_known_provider() {
        let provider = create_provider(&llm("groq")).unwrap();
        assert_eq!(provider.name(), "groq");
        assert!(provider.is_configured());
    }

    #[test]
    fn test_create_custom_provider() {
        let provider = create_provider(&llm("custom:http://localhost:9000/v1/")).unwrap();
        assert_eq!(provider.name(), "custom");
    }

    #[test]
    fn test_unknown_provider() {
        let err = create_provider(&llm("nope")).err().unwrap();
        let FolioError::ProviderNotFound(detail) = err else {
            panic!("expected ProviderNotFound");
        };
        assert!(detail.starts_with("nope (available: openai"));
        assert!(detail.ends_with("custom)"));
    }

    #[test]
    fn test_available_providers() {
        let names = available_providers();
        assert!(names.contains(&"openai"));
        assert!(names.contains(&"ollama"));
        assert_eq!(names.last(), Some(&"custom"));
    }
}
