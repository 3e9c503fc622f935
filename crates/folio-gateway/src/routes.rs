//! API route handlers for the gateway.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use folio_core::error::FolioError;
use folio_core::types::{ChatMessage, GenerateParams, last_user_content};
use folio_knowledge::Snippet;
use folio_providers::ChatStream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;

use super::prompt;
use super::server::AppState;

/// Health check: index size and snapshot build time.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snapshot = state.knowledge.snapshot();
    Json(json!({
        "ok": true,
        "indexed": snapshot.len(),
        "built_at": snapshot.built_at().to_rfc3339(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Rebuild the knowledge snapshot. A failed rebuild keeps the previous one.
pub async fn reindex(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let knowledge = state.knowledge.clone();
    match tokio::task::spawn_blocking(move || knowledge.rebuild()).await {
        Ok(Ok(indexed)) => (StatusCode::OK, Json(json!({"ok": true, "indexed": indexed}))),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": e.to_string()})),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"ok": false, "error": format!("reindex task failed: {e}")})),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub k: Option<usize>,
}

/// Raw retrieval results.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Json<Value> {
    let lang = req.lang.as_deref().filter(|l| !l.is_empty());
    let snippets = state.knowledge.snippets(&req.query, lang, req.k);
    Json(json!({"ok": true, "count": snippets.len(), "snippets": snippets}))
}

/// Chat messages from the request body. Entries that are not `{role, content}`
/// objects with a known role are skipped.
fn parse_messages(body: &Value) -> Option<Vec<ChatMessage>> {
    let raw = body.get("messages")?.as_array()?;
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.iter()
            .filter_map(|m| match serde_json::from_value::<ChatMessage>(m.clone()) {
                Ok(msg) => Some(msg),
                Err(e) => {
                    tracing::debug!("Skipping malformed chat message: {e}");
                    None
                }
            })
            .collect(),
    )
}

/// Retrieval-grounded chat.
///
/// - 400 when `messages` is missing or empty
/// - 501 with the snippets and an offline answer when no backend is usable
/// - 500 when the backend fails before streaming starts
/// - otherwise an event stream of `{"content"}` chunks closed by `{"snippets"}`
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = payload.map(|Json(v)| v).unwrap_or(Value::Null);
    let Some(messages) = parse_messages(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "messages array is required"})),
        )
            .into_response();
    };
    let lang = body["lang"].as_str().filter(|l| !l.is_empty());
    let query = last_user_content(&messages).unwrap_or("");

    let knowledge = &state.knowledge;
    let snippets = knowledge.snippets(query, lang, Some(knowledge.config().chat_k));

    let llm = &state.config.llm;
    let provider = match &state.provider {
        Some(p) if p.is_configured() => p.clone(),
        other => {
            let name = other.as_ref().map_or(llm.provider.as_str(), |p| p.name());
            let answer = knowledge.fallback_answer(query, lang);
            tracing::debug!("No chat backend; answered {query:?} from the fallback matcher");
            return (
                StatusCode::NOT_IMPLEMENTED,
                Json(json!({
                    "error": FolioError::ApiKeyMissing(name.to_string()).to_string(),
                    "snippets": snippets,
                    "answer": answer,
                })),
            )
                .into_response();
        }
    };

    let reply_lang = lang.unwrap_or_else(|| knowledge.config().default_language());
    let prompt_messages = prompt::build_messages(reply_lang, &snippets, &messages);
    let params = GenerateParams {
        model: if llm.model.is_empty() {
            provider.default_model().to_string()
        } else {
            llm.model.clone()
        },
        temperature: llm.temperature,
        max_tokens: llm.max_tokens,
    };

    match provider.chat_stream(&prompt_messages, &params).await {
        Ok(stream) => sse_response(stream, snippets),
        Err(e) => {
            tracing::error!("❌ Chat failed ({}): {e}", provider.name());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "chat_failed", "details": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Relay completion chunks as SSE `data:` events, then the snippets.
///
/// A mid-stream failure emits an `error` event and ends the stream; content
/// already sent stands.
fn sse_response(upstream: ChatStream, snippets: Vec<Snippet>) -> Response {
    let events = async_stream::stream! {
        let mut upstream = upstream;
        while let Some(item) = upstream.next().await {
            match item {
                Ok(content) => {
                    yield Event::default().data(json!({"content": content}).to_string());
                }
                Err(e) => {
                    tracing::error!("❌ Chat stream failed: {e}");
                    yield Event::default()
                        .event("error")
                        .data(json!({"error": "chat_failed", "details": e.to_string()}).to_string());
                    return;
                }
            }
        }
        yield Event::default().data(json!({"snippets": snippets}).to_string());
    };
    Sse::new(events.map(Ok::<_, Infallible>)).into_response()
}
