//! Per-user vendor API key endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::ApiKeySummary;
use crate::infrastructure::services::{SaveApiKeyRequest, SaveOutcome};

/// Body of `POST /api/settings/api-keys`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveApiKeyBody {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub key_name: String,
    #[serde(default)]
    pub api_key: String,
}

impl From<SaveApiKeyBody> for SaveApiKeyRequest {
    fn from(body: SaveApiKeyBody) -> Self {
        Self {
            provider: body.provider,
            key_name: body.key_name,
            api_key: body.api_key,
        }
    }
}

/// GET /api/settings/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<ApiKeySummary>>, ApiError> {
    debug!(user_id = %user_id, "Listing API keys");

    let keys = state.api_keys.list(&user_id).await?;
    Ok(Json(keys))
}

/// POST /api/settings/api-keys
///
/// 201 when a key is created, 200 when an existing name is rotated.
pub async fn save_api_key(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<SaveApiKeyBody>,
) -> Result<Response, ApiError> {
    let outcome = state.api_keys.save(&user_id, body.into()).await?;

    let response = match outcome {
        SaveOutcome::Created(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        SaveOutcome::Updated(summary) => (StatusCode::OK, Json(summary)).into_response(),
    };

    Ok(response)
}

/// DELETE /api/settings/api-keys/{id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(key_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.api_keys.delete(&user_id, &key_id).await?;

    Ok(Json(json!({ "message": "API key deleted successfully" })))
}
