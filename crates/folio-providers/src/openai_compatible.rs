//! Unified OpenAI-compatible provider.
//!
//! A single struct that streams chat completions from any OpenAI-compatible
//! API. Backends differ only by endpoint URL, auth style, and API key.

use async_trait::async_trait;
use folio_core::config::LlmConfig;
use folio_core::error::{FolioError, Result};
use folio_core::types::{ChatMessage, GenerateParams};
use futures::{Stream, StreamExt};
use serde_json::json;

use crate::provider::{ChatStream, Provider};
use crate::provider_registry::{AuthStyle, ProviderConfig};
use crate::sse::{SseDecoder, SseEvent, delta_content};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name (e.g., "openai", "groq", "ollama").
    name: String,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    /// Path for chat completions (e.g., "/chat/completions").
    chat_path: String,
    auth_style: AuthStyle,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a known provider config.
    ///
    /// Resolution order:
    /// - API key: `llm.api_key` > env vars > empty
    /// - Base URL: `llm.endpoint` > env override > registry default
    pub fn from_registry(registry: &ProviderConfig, config: &LlmConfig) -> Result<Self> {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
                .unwrap_or_default()
        };

        let base_url = if !config.endpoint.is_empty() {
            config.endpoint.trim_end_matches('/').to_string()
        } else {
            registry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST is usually given without the /v1 suffix
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| registry.base_url.to_string())
        };

        Ok(Self {
            name: registry.name.to_string(),
            api_key,
            base_url,
            chat_path: registry.chat_path.to_string(),
            auth_style: registry.auth_style,
            default_model: registry.default_model.to_string(),
            client: http_client()?,
        })
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, config: &LlmConfig) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();
        if base_url.is_empty() {
            return Err(FolioError::Config("custom provider needs a base URL".into()));
        }

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Ok(Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            auth_style,
            default_model: String::new(),
            client: http_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the auth header for the request.
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| FolioError::Http(e.to_string()))
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn is_configured(&self) -> bool {
        self.auth_style == AuthStyle::None || !self.api_key.is_empty()
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        params: &GenerateParams,
    ) -> Result<ChatStream> {
        if !self.is_configured() {
            return Err(FolioError::ApiKeyMissing(self.name.clone()));
        }

        let mut body = json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "stream": true,
        });
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let url = format!("{}{}", self.base_url, self.chat_path);
        let req = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            FolioError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FolioError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        tracing::debug!("📡 {} streaming {} ({} messages)", self.name, params.model, messages.len());
        Ok(Box::pin(decode_stream(self.name.clone(), resp.bytes_stream())))
    }
}

/// Turn an upstream SSE byte stream into completion text.
///
/// Ends at `[DONE]` or end of body; a transport error or an upstream error
/// payload ends it with an `Err` item.
pub fn decode_stream<S, B, E>(
    provider: String,
    upstream: S,
) -> impl Stream<Item = Result<String>> + Send + 'static
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::try_stream! {
        let mut upstream = Box::pin(upstream);
        let mut decoder = SseDecoder::new();
        let mut done = false;
        while !done {
            let events = match upstream.next().await {
                Some(chunk) => {
                    let chunk = chunk.map_err(|e| {
                        FolioError::Http(format!("{provider} stream interrupted: {e}"))
                    })?;
                    decoder.push(chunk.as_ref())
                }
                None => {
                    done = true;
                    decoder.finish()
                }
            };
            for event in events {
                match event {
                    SseEvent::Done => {
                        done = true;
                        break;
                    }
                    SseEvent::Data(payload) => {
                        if let Some(content) = delta_content(&payload)? {
                            yield content;
                        }
                    }
                }
            }
        }
    }
}
