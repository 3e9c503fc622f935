//! # Folio Gateway
//!
//! HTTP API for the portfolio assistant, served under `/api`:
//! - `GET  /api/health`  — index size and build time
//! - `POST /api/reindex` — rebuild the knowledge snapshot (optional admin token)
//! - `POST /api/chat`    — retrieval-grounded chat, streamed as server-sent events
//! - `POST /api/search`  — raw retrieval results

pub mod prompt;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
