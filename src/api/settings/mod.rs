//! Settings endpoints: stored vendor keys and provider availability

pub mod api_keys;
pub mod providers;

use axum::{
    routing::{delete, get},
    Router,
};

use super::state::AppState;

/// Routes mounted under `/api/settings`
pub fn create_settings_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api-keys",
            get(api_keys::list_api_keys).post(api_keys::save_api_key),
        )
        .route("/api-keys/{key_id}", delete(api_keys::delete_api_key))
}
