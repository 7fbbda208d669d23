use thiserror::Error;

/// Substrings (lowercase) that mark a vendor failure as a rejected credential
const AUTH_MARKERS: [&str; 4] = ["api key", "unauthorized", "invalid key", "authentication"];

/// Substrings (lowercase) that mark a vendor failure as throttling
const RATE_LIMIT_MARKERS: [&str; 3] = ["rate limit", "rate_limit", "quota"];

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("No valid API key found for {provider}")]
    NoCredential { provider: String },

    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("API request failed: {status} - {body}")]
    UpstreamAuth {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("API request failed: {status} - {body}")]
    UpstreamRateLimit {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("API request failed: {status} - {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Request to {provider} failed: {message}")]
    Network { provider: String, message: String },

    #[error("Invalid response from {provider} API: {message}")]
    Protocol { provider: String, message: String },

    #[error("Encryption error: {message}")]
    Crypto { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn no_credential(provider: impl Into<String>) -> Self {
        Self::NoCredential {
            provider: provider.into(),
        }
    }

    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Build the error for a non-2xx vendor response.
    ///
    /// Vendors do not share a structured error code, so the status line and
    /// raw body are matched case-insensitively against known markers to tell
    /// credential rejections and throttling apart from other failures.
    pub fn upstream(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let provider = provider.into();
        let body = body.into();
        let haystack = format!("API request failed: {} - {}", status, body).to_lowercase();

        if AUTH_MARKERS.iter().any(|m| haystack.contains(m)) {
            Self::UpstreamAuth {
                provider,
                status,
                body,
            }
        } else if RATE_LIMIT_MARKERS.iter().any(|m| haystack.contains(m)) {
            Self::UpstreamRateLimit {
                provider,
                status,
                body,
            }
        } else {
            Self::Upstream {
                provider,
                status,
                body,
            }
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn protocol(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the user has to fix their credential configuration
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::NoCredential { .. } | Self::UpstreamAuth { .. })
    }
}
