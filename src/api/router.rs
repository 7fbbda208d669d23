use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::conversations;
use super::health;
use super::llm;
use super::middleware::logging_middleware;
use super::settings;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Probes
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Chat relay and catalog
        .nest("/api/llm", llm::create_llm_router())
        // Per-user keys
        .nest("/api/settings", settings::create_settings_router())
        .route(
            "/api/providers/check",
            get(settings::providers::check_providers),
        )
        // History
        .nest(
            "/api/conversations",
            conversations::create_conversations_router(),
        )
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
