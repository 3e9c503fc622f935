//! Workspace error type.

use thiserror::Error;

/// Errors raised anywhere in Folio.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The structured translation source could not be loaded from any
    /// candidate location. Aborts an index build.
    #[error("source unavailable: {0}")]
    Source(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("{0} API key not configured")]
    ApiKeyMissing(String),

    #[error("unknown provider: {0}")]
    ProviderNotFound(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_missing_message() {
        let err = FolioError::ApiKeyMissing("openai".into());
        assert_eq!(err.to_string(), "openai API key not configured");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FolioError = io.into();
        assert!(matches!(err, FolioError::Io(_)));
    }
}
