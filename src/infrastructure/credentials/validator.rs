use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ValidationMode;
use crate::domain::{ChatRequest, ProviderFactory, ProviderId};

/// Output budget of the probe call
const PROBE_MAX_TOKENS: u32 = 5;

/// Shortest key any vendor accepts
const MIN_KEY_LEN: usize = 10;

/// Decides whether a candidate key is usable before it is stored.
///
/// A positive answer is best effort: keys can still fail later on quota or
/// revocation, which surfaces at call time.
#[derive(Debug, Clone)]
pub struct CredentialValidator {
    factory: Arc<dyn ProviderFactory>,
    mode: ValidationMode,
}

impl CredentialValidator {
    pub fn new(factory: Arc<dyn ProviderFactory>, mode: ValidationMode) -> Self {
        Self { factory, mode }
    }

    pub async fn validate(&self, provider: ProviderId, api_key: &str) -> bool {
        match self.mode {
            ValidationMode::Probe => self.probe(provider, api_key).await,
            ValidationMode::Format => format_looks_valid(provider, api_key),
        }
    }

    /// One minimal chat call on the adapter's cheapest model
    async fn probe(&self, provider: ProviderId, api_key: &str) -> bool {
        let adapter = match self.factory.create(provider.as_str(), api_key) {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Cannot probe API key");
                return false;
            }
        };

        let Some(model) = adapter.available_models().first().copied() else {
            warn!(provider = %provider, "Adapter lists no models to probe with");
            return false;
        };

        let request = ChatRequest::builder()
            .user("Test")
            .model(model)
            .provider(provider.as_str())
            .max_tokens(PROBE_MAX_TOKENS)
            .temperature(0.0)
            .build();

        match adapter.chat(&request).await {
            Ok(_) => {
                info!(provider = %provider, model = model, "API key probe succeeded");
                true
            }
            Err(e) => {
                warn!(provider = %provider, model = model, error = %e, "API key probe failed");
                false
            }
        }
    }
}

/// Offline plausibility check on a key's shape
pub fn format_looks_valid(provider: ProviderId, api_key: &str) -> bool {
    if api_key.len() <= MIN_KEY_LEN {
        return false;
    }

    match provider {
        ProviderId::OpenAi => api_key.starts_with("sk-"),
        ProviderId::Anthropic => api_key.starts_with("sk-ant-"),
        ProviderId::Google | ProviderId::Cohere => api_key.len() > 20,
        ProviderId::HuggingFace => api_key.starts_with("hf_"),
    }
}
