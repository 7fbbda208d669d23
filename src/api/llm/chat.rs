//! Chat endpoint: buffered JSON or SSE relay

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::relay::sse_response;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ChatRequest;

/// POST /api/llm/chat
///
/// The adapter is built from the caller's credential for this request only
/// and dropped with it.
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let credential = state
        .credentials
        .resolve(user.id(), &request.provider)
        .await?;
    let provider = state
        .provider_factory
        .create(&request.provider, credential.api_key())?;

    info!(
        provider = %request.provider,
        model = %request.model,
        stream = request.stream,
        messages = request.messages.len(),
        credential_source = ?credential.source(),
        "Processing chat request"
    );

    if request.stream {
        let source = provider.chat_stream(&request).await?;
        return Ok(sse_response(source));
    }

    let response = provider.chat(&request).await?;
    info!(
        provider = %response.provider,
        tokens_used = response.tokens_used,
        finish_reason = ?response.finish_reason,
        "Chat completed"
    );

    Ok(Json(response).into_response())
}
