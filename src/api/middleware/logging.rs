//! Request/response logging middleware with credential redaction

use std::time::Instant;

use axum::{
    body::{to_bytes, Body},
    extract::MatchedPath,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, Level};

use super::identity::USER_ID_HEADER;

/// Bodies above this size are not buffered for logging
const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

/// Logged bodies are cut to this many bytes
const LOGGED_BODY_PREVIEW: usize = 512;

const SENSITIVE_JSON_FIELDS: [&str; 8] = [
    "apiKey",
    "api_key",
    "encryptedKey",
    "password",
    "secret",
    "token",
    "access_token",
    "authorization",
];

static SENSITIVE_JSON_PATTERNS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    SENSITIVE_JSON_FIELDS
        .iter()
        .filter_map(|field| {
            Regex::new(&format!(r#""{}"\s*:\s*"(?:[^"\\]|\\.)*""#, field))
                .ok()
                .map(|re| (re, format!(r#""{}":"[REDACTED]""#, field)))
        })
        .collect()
});

/// Log each request and its outcome.
///
/// Does not open its own span: `TraceLayer` already does, and nesting a
/// second one per request duplicates every field.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = matched_path(&request);
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    info!(
        method = %method,
        path = %path,
        user_id = %user_id,
        headers = %redact_headers(request.headers()),
        "Incoming request"
    );

    let request = if tracing::enabled!(Level::DEBUG) && is_small_json(request.headers()) {
        log_json_body(request).await
    } else {
        request
    };

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}

/// Buffer a JSON body, log a redacted preview and hand the bytes back
async fn log_json_body(request: Request<Body>) -> Request<Body> {
    let (parts, body) = request.into_parts();

    match to_bytes(body, MAX_LOGGED_BODY_BYTES).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            debug!(
                body = %truncate_for_log(&redact_json_sensitive_fields(&text), LOGGED_BODY_PREVIEW),
                "Request body"
            );
            Request::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            debug!(error = %e, "Could not read request body for logging");
            Request::from_parts(parts, Body::empty())
        }
    }
}

fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// JSON body with a declared length small enough to buffer
fn is_small_json(headers: &HeaderMap) -> bool {
    let json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let small = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .is_some_and(|len| len <= MAX_LOGGED_BODY_BYTES);

    json && small
}

/// Render loggable headers with credentials masked
fn redact_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .filter(|(name, _)| should_log_header(name.as_str()))
        .map(|(name, value)| {
            let value = if is_sensitive_header(name.as_str()) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            format!("{}={}", name.as_str(), value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "x-api-key" | "cookie" | "set-cookie" | "proxy-authorization"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "authorization"
            | "x-api-key"
            | "cookie"
    )
}

/// Replace string values of credential-bearing JSON fields
pub fn redact_json_sensitive_fields(json: &str) -> String {
    SENSITIVE_JSON_PATTERNS
        .iter()
        .fold(json.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, replacement.as_str()).into_owned()
        })
}

/// Cut `s` to at most `max_len` bytes on a char boundary
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...[truncated {} bytes]", &s[..end], s.len() - end)
}
