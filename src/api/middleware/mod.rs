//! API middleware components

pub mod identity;
pub mod logging;

pub use identity::{CurrentUser, RequireUser, USER_ID_HEADER};
pub use logging::{logging_middleware, redact_json_sensitive_fields, truncate_for_log};
