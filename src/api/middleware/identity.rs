//! Caller identity set by the fronting authentication layer

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::types::ApiError;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Optional caller identity; anonymous requests get `None`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(extract_user_id(&parts.headers)?))
    }
}

/// Extractor for routes that only make sense for a known user
#[derive(Debug, Clone)]
pub struct RequireUser(pub String);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = extract_user_id(&parts.headers)?
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        debug!(user_id = %user_id, "Resolved caller");
        Ok(RequireUser(user_id))
    }
}

/// Read the caller id; blank values count as absent
pub fn extract_user_id(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid x-user-id header encoding"))?
        .trim();

    Ok((!value.is_empty()).then(|| value.to_string()))
}
