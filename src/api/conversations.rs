//! Conversation history endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::middleware::RequireUser;
use super::state::AppState;
use super::types::{ApiError, Json};
use crate::domain::{Conversation, ConversationMessage, MessageRole};
use crate::infrastructure::services::{
    AppendMessageRequest, ConversationDetail, ConversationSummary, CreateConversationRequest,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model_provider: String,
    #[serde(default)]
    pub model_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameConversationBody {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendMessageBody {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tokens_used: Option<u32>,
}

/// Routes mounted under `/api/conversations`
pub fn create_conversations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations).post(create_conversation))
        .route(
            "/{conversation_id}",
            get(get_conversation)
                .put(rename_conversation)
                .delete(delete_conversation),
        )
        .route("/{conversation_id}/messages", post(append_message))
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let conversations = state.conversations.list(&user_id).await?;
    debug!(user_id = %user_id, count = conversations.len(), "Listed conversations");

    Ok(Json(conversations))
}

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<CreateConversationBody>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let conversation = state
        .conversations
        .create(
            &user_id,
            CreateConversationRequest {
                title: body.title,
                model_provider: body.model_provider,
                model_name: body.model_name,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let detail = state.conversations.get(&user_id, &conversation_id).await?;
    Ok(Json(detail))
}

/// PUT /api/conversations/{id}
pub async fn rename_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(conversation_id): Path<String>,
    Json(body): Json<RenameConversationBody>,
) -> Result<Json<Conversation>, ApiError> {
    let conversation = state
        .conversations
        .rename(&user_id, &conversation_id, &body.title)
        .await?;

    Ok(Json(conversation))
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(conversation_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .conversations
        .delete(&user_id, &conversation_id)
        .await?;

    Ok(Json(json!({ "message": "Conversation deleted successfully" })))
}

/// POST /api/conversations/{id}/messages
pub async fn append_message(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(conversation_id): Path<String>,
    Json(body): Json<AppendMessageBody>,
) -> Result<(StatusCode, Json<ConversationMessage>), ApiError> {
    let message = state
        .conversations
        .append_message(
            &user_id,
            &conversation_id,
            AppendMessageRequest {
                role: body.role,
                content: body.content,
                tokens_used: body.tokens_used,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
