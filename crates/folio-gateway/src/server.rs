//! HTTP server implementation using Axum.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use folio_core::config::{FolioConfig, GatewayConfig};
use folio_knowledge::KnowledgeStore;
use folio_providers::Provider;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FolioConfig>,
    /// Knowledge index; owns the swappable snapshot.
    pub knowledge: Arc<KnowledgeStore>,
    /// Chat backend. `None` when the configured provider is unknown.
    pub provider: Option<Arc<dyn Provider>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: FolioConfig,
        knowledge: KnowledgeStore,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            knowledge: Arc::new(knowledge),
            provider,
            start_time: Instant::now(),
        }
    }
}

/// Admin token middleware — validates the X-Admin-Token header.
async fn require_admin(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    // If no token configured, allow all
    let Some(expected) = &state.config.gateway.admin_token else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided == expected {
        return next.run(req).await;
    }

    tracing::warn!("🔒 Rejected {} {}: missing or invalid admin token", req.method(), req.uri());
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"ok": false, "error": "invalid or missing admin token"})),
    )
        .into_response()
}

fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    if config.cors_origins.is_empty() {
        // Development fallback — allow all origins
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    // Protected routes — require the admin token when one is configured
    let protected = Router::new()
        .route("/api/reindex", post(super::routes::reindex))
        .route_layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            require_admin,
        ));

    let public = Router::new()
        .route("/api/health", get(super::routes::health))
        .route("/api/chat", post(super::routes::chat))
        .route("/api/search", post(super::routes::search));

    protected
        .merge(public)
        .layer(cors_layer(&shared.config.gateway))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Build the index, connect the chat backend and serve until shutdown.
pub async fn start(config: FolioConfig) -> anyhow::Result<()> {
    let knowledge_config = config.knowledge.clone();
    let knowledge =
        tokio::task::spawn_blocking(move || KnowledgeStore::open(knowledge_config)).await??;
    tracing::info!("📚 Knowledge index ready: {} documents", knowledge.count());

    let provider: Option<Arc<dyn Provider>> = match folio_providers::create_provider(&config.llm) {
        Ok(p) => {
            if p.is_configured() {
                tracing::info!("✅ Chat provider: {}", p.name());
            } else {
                tracing::warn!(
                    "⚠️ {} API key not configured — chat will answer from the fallback matcher",
                    p.name()
                );
            }
            Some(Arc::from(p))
        }
        Err(e) => {
            tracing::warn!("⚠️ Chat provider not available: {e}");
            None
        }
    };

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(AppState::new(config, knowledge, provider));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
