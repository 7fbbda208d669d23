use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

use crate::domain::{CredentialProvider, ProviderId};

/// Fallback API keys read from process environment variables
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    mappings: HashMap<ProviderId, String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, provider: ProviderId, env_var: impl Into<String>) -> Self {
        self.mappings.insert(provider, env_var.into());
        self
    }

    pub fn with_defaults(mut self) -> Self {
        for provider in ProviderId::ALL {
            self.mappings
                .insert(provider, Self::default_var(provider).to_string());
        }
        self
    }

    /// Conventional variable name for a provider's key
    pub fn default_var(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::OpenAi => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Google => "GOOGLE_API_KEY",
            ProviderId::Cohere => "COHERE_API_KEY",
            ProviderId::HuggingFace => "HUGGINGFACE_API_KEY",
        }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new().with_defaults()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn fallback_key(&self, provider: ProviderId) -> Option<String> {
        let var = self.mappings.get(&provider)?;

        env::var(var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}
