use crate::domain::llm::ProviderId;

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Decrypted from the caller's stored keys
    UserStore,
    /// Process-wide fallback from the environment
    Environment,
}

/// Plaintext API key for a single outbound call.
///
/// Lives only as long as one request; `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential {
    provider: ProviderId,
    api_key: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(provider: ProviderId, api_key: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            source,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}
