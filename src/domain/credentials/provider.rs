use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::llm::ProviderId;

/// Process-wide fallback source of API keys (environment, secret manager, ...)
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug {
    /// The fallback key for `provider`, if one is configured
    async fn fallback_key(&self, provider: ProviderId) -> Option<String>;

    /// Source name for logging
    fn source_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct MockCredentialProvider {
        keys: HashMap<ProviderId, String>,
    }

    impl MockCredentialProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_key(mut self, provider: ProviderId, key: impl Into<String>) -> Self {
            self.keys.insert(provider, key.into());
            self
        }
    }

    #[async_trait]
    impl CredentialProvider for MockCredentialProvider {
        async fn fallback_key(&self, provider: ProviderId) -> Option<String> {
            self.keys.get(&provider).cloned()
        }

        fn source_name(&self) -> &'static str {
            "mock"
        }
    }
}
