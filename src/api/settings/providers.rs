//! Provider availability for the model picker

use std::collections::BTreeMap;

use axum::extract::State;

use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

/// GET /api/providers/check
///
/// Anonymous callers only see the environment fallback.
pub async fn check_providers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<BTreeMap<&'static str, bool>>, ApiError> {
    let availability = state
        .credentials
        .availability(user.id().unwrap_or_default())
        .await?;

    Ok(Json(availability))
}
