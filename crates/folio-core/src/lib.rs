//! # Folio Core
//!
//! Shared building blocks for the Folio workspace: the TOML configuration
//! tree, the workspace error type and the chat message types exchanged
//! between the gateway and the generative providers.

pub mod config;
pub mod error;
pub mod types;

pub use config::FolioConfig;
pub use error::{FolioError, Result};
