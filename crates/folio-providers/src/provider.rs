//! Provider trait: the seam between the gateway and a chat backend.

use async_trait::async_trait;
use folio_core::error::Result;
use folio_core::types::{ChatMessage, GenerateParams};
use futures::Stream;
use std::pin::Pin;

/// Incremental completion text. An `Err` item ends the stream.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Model used when the configuration leaves it empty.
    fn default_model(&self) -> &str;

    /// Whether the credentials this backend needs are present.
    fn is_configured(&self) -> bool;

    /// Start a streaming completion.
    ///
    /// Errors returned here happen before any content is produced; errors
    /// after that arrive as stream items.
    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        params: &GenerateParams,
    ) -> Result<ChatStream>;
}
