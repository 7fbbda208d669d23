//! Request extraction and error types shared by the handlers

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType, CREDENTIAL_HINT};
pub use json::Json;
