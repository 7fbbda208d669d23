use tracing::debug;

use super::anthropic::{AnthropicProvider, DEFAULT_ANTHROPIC_BASE_URL};
use super::http_client::HttpClientTrait;
use super::openai::{OpenAiProvider, DEFAULT_OPENAI_BASE_URL};
use crate::domain::{DomainError, LlmProvider, ProviderFactory, ProviderId};

/// Vendor endpoints the adapters talk to
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        }
    }
}

/// Maps a provider id to a fresh adapter bound to one credential.
///
/// Catalog vendors without an adapter are rejected the same way as
/// unknown ids.
#[derive(Debug, Clone)]
pub struct ProviderRegistry<C: HttpClientTrait + Clone + 'static> {
    client: C,
    endpoints: ProviderEndpoints,
}

impl<C: HttpClientTrait + Clone + 'static> ProviderRegistry<C> {
    pub fn new(client: C) -> Self {
        Self::with_endpoints(client, ProviderEndpoints::default())
    }

    pub fn with_endpoints(client: C, endpoints: ProviderEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Provider ids that have an adapter
    pub fn supported_providers() -> Vec<ProviderId> {
        vec![ProviderId::OpenAi, ProviderId::Anthropic]
    }
}

impl<C: HttpClientTrait + Clone + 'static> ProviderFactory for ProviderRegistry<C> {
    fn create(&self, provider: &str, api_key: &str) -> Result<Box<dyn LlmProvider>, DomainError> {
        let id: ProviderId = provider.parse()?;
        if api_key.trim().is_empty() {
            return Err(DomainError::no_credential(id.as_str()));
        }
        debug!(provider = %id, "Creating provider adapter");

        match id {
            ProviderId::OpenAi => Ok(Box::new(OpenAiProvider::with_base_url(
                self.client.clone(),
                api_key,
                &self.endpoints.openai_base_url,
            ))),
            ProviderId::Anthropic => Ok(Box::new(AnthropicProvider::with_base_url(
                self.client.clone(),
                api_key,
                &self.endpoints.anthropic_base_url,
            ))),
            ProviderId::Google | ProviderId::Cohere | ProviderId::HuggingFace => {
                Err(DomainError::unsupported_provider(provider))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    fn registry() -> ProviderRegistry<MockHttpClient> {
        ProviderRegistry::new(MockHttpClient::new())
    }

    #[test]
    fn test_adapter_reports_requested_name() {
        let registry = registry();

        for id in ProviderRegistry::<MockHttpClient>::supported_providers() {
            let adapter = registry.create(id.as_str(), "key").unwrap();
            assert_eq!(adapter.provider_name(), id);
            assert!(!adapter.available_models().is_empty());
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = registry().create("mistral", "key").unwrap_err();
        match err {
            DomainError::UnsupportedProvider { provider } => assert_eq!(provider, "mistral"),
            other => panic!("expected UnsupportedProvider, got {:?}", other),
        }
    }

    #[test]
    fn test_catalog_vendor_without_adapter_rejected() {
        let registry = registry();

        for id in ["google", "cohere", "huggingface"] {
            assert!(matches!(
                registry.create(id, "key"),
                Err(DomainError::UnsupportedProvider { .. })
            ));
        }
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let registry = registry();

        for key in ["", "   "] {
            match registry.create("openai", key) {
                Err(DomainError::NoCredential { provider }) => assert_eq!(provider, "openai"),
                Err(other) => panic!("expected NoCredential, got {:?}", other),
                Ok(_) => panic!("blank key must not build an adapter"),
            }
        }
    }

    #[test]
    fn test_custom_endpoints_are_used() {
        let endpoints = ProviderEndpoints {
            openai_base_url: "http://localhost:9999".to_string(),
            ..ProviderEndpoints::default()
        };
        let registry = ProviderRegistry::with_endpoints(MockHttpClient::new(), endpoints);

        assert!(registry.create("openai", "sk-test").is_ok());
    }
}
