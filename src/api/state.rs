//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Conversation, ProviderFactory, Storage, StoredApiKey};
use crate::infrastructure::credentials::CredentialResolver;
use crate::infrastructure::services::{ApiKeyService, ConversationService};

/// Storage handles probed by the readiness check
#[derive(Debug, Clone)]
pub struct StorageHandles {
    pub api_keys: Arc<dyn Storage<StoredApiKey>>,
    pub conversations: Arc<dyn Storage<Conversation>>,
}

/// Application state shared by every handler.
///
/// Holds no vendor adapters: those are built per request from a resolved
/// credential and dropped when the request ends.
#[derive(Debug, Clone)]
pub struct AppState {
    pub provider_factory: Arc<dyn ProviderFactory>,
    pub credentials: CredentialResolver,
    pub api_keys: ApiKeyService,
    pub conversations: ConversationService,
    pub storage: StorageHandles,
}

impl AppState {
    pub fn new(
        provider_factory: Arc<dyn ProviderFactory>,
        credentials: CredentialResolver,
        api_keys: ApiKeyService,
        conversations: ConversationService,
        storage: StorageHandles,
    ) -> Self {
        Self {
            provider_factory,
            credentials,
            api_keys,
            conversations,
            storage,
        }
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::config::ValidationMode;
    use crate::domain::{
        ConversationMessage, MockCredentialProvider, MockLlmProvider, MockProviderFactory,
        PrefixCipher, SecretCipher,
    };
    use crate::infrastructure::credentials::CredentialValidator;
    use crate::infrastructure::storage::InMemoryStorage;

    /// State wired with in-memory storage, the prefix cipher and a scripted
    /// provider factory
    pub fn state_with(factory: MockProviderFactory, fallback: MockCredentialProvider) -> AppState {
        let factory: Arc<dyn ProviderFactory> = Arc::new(factory);
        let cipher: Arc<dyn SecretCipher> = Arc::new(PrefixCipher);
        let api_key_store: Arc<dyn Storage<StoredApiKey>> = Arc::new(InMemoryStorage::new());
        let conversation_store: Arc<dyn Storage<Conversation>> = Arc::new(InMemoryStorage::new());
        let message_store: Arc<dyn Storage<ConversationMessage>> = Arc::new(InMemoryStorage::new());

        let validator = CredentialValidator::new(factory.clone(), ValidationMode::Probe);

        AppState::new(
            factory,
            CredentialResolver::new(api_key_store.clone(), cipher.clone(), Arc::new(fallback)),
            ApiKeyService::new(api_key_store.clone(), cipher, validator),
            ConversationService::new(conversation_store.clone(), message_store),
            StorageHandles {
                api_keys: api_key_store,
                conversations: conversation_store,
            },
        )
    }

    /// State whose factory hands out `provider`, with no fallback keys
    pub fn state_for(provider: MockLlmProvider) -> AppState {
        state_with(MockProviderFactory::new(provider), MockCredentialProvider::new())
    }
}
