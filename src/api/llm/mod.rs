//! LLM endpoints

pub mod chat;
pub mod models;
pub mod relay;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_llm_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/models", get(models::list_models))
}
