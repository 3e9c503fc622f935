//! Provider registry — maps provider names to endpoint configurations.
//!
//! Every backend here speaks the OpenAI chat completions protocol; the
//! unified `OpenAiCompatibleProvider` uses these entries to connect.

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub name: &'static str,
    /// Base URL for the API.
    pub base_url: &'static str,
    /// Path for chat completions endpoint (appended to base_url).
    pub chat_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    /// How to send auth credentials.
    pub auth_style: AuthStyle,
    /// Environment variable to override the base URL (e.g., OLLAMA_HOST).
    pub base_url_env: Option<&'static str>,
    /// Model used when the configuration does not name one.
    pub default_model: &'static str,
}

static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_path: "/chat/completions",
        env_keys: &["OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: Some("OPENAI_API_BASE"),
        default_model: "gpt-4o-mini",
    },
    ProviderConfig {
        name: "openrouter",
        base_url: "https://openrouter.ai/api/v1",
        chat_path: "/chat/completions",
        env_keys: &["OPENROUTER_API_KEY", "OPENAI_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_model: "openai/gpt-4o-mini",
    },
    ProviderConfig {
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        chat_path: "/chat/completions",
        env_keys: &["GROQ_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_model: "llama-3.1-8b-instant",
    },
    ProviderConfig {
        name: "deepseek",
        base_url: "https://api.deepseek.com",
        chat_path: "/chat/completions",
        env_keys: &["DEEPSEEK_API_KEY"],
        auth_style: AuthStyle::Bearer,
        base_url_env: None,
        default_model: "deepseek-chat",
    },
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        chat_path: "/chat/completions",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("OLLAMA_HOST"),
        default_model: "llama3.2",
    },
];

/// Look up a provider config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    let lookup = match name {
        "open-router" | "open_router" => "openrouter",
        "local" => "ollama",
        other => other,
    };
    PROVIDERS.iter().find(|p| p.name == lookup)
}

/// List all known provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_aliases() {
        assert_eq!(get_provider_config("openai").unwrap().base_url, "https://api.openai.com/v1");
        assert_eq!(get_provider_config("local").unwrap().name, "ollama");
        assert_eq!(get_provider_config("open-router").unwrap().name, "openrouter");
        assert!(get_provider_config("brain").is_none());
    }

    #[test]
    fn test_local_providers_need_no_key() {
        let ollama = get_provider_config("ollama").unwrap();
        assert_eq!(ollama.auth_style, AuthStyle::None);
        assert!(ollama.env_keys.is_empty());
        for name in ["openai", "openrouter", "groq", "deepseek"] {
            assert_eq!(get_provider_config(name).unwrap().auth_style, AuthStyle::Bearer);
        }
    }
}
