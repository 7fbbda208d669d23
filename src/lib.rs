//! LLM chat relay
//!
//! One chat interface over several LLM vendors:
//! - Vendor adapters behind a common provider trait
//! - Live token relay to the browser over Server-Sent Events
//! - Encrypted per-user vendor API keys with an environment fallback
//! - Per-user conversation history

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AppState, StorageHandles};
use domain::{
    Conversation, ConversationMessage, ProviderFactory, SecretCipher, Storage, StoredApiKey,
};
use infrastructure::{
    credentials::{AesGcmCipher, CredentialResolver, CredentialValidator, EnvCredentialProvider},
    llm::{HttpClient, ProviderRegistry},
    services::{ApiKeyService, ConversationService},
    storage::InMemoryStorage,
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default())
}

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let http_client = HttpClient::with_timeout(config.providers.request_timeout())?;
    let provider_factory: Arc<dyn ProviderFactory> = Arc::new(ProviderRegistry::with_endpoints(
        http_client,
        config.providers.endpoints(),
    ));
    info!(
        adapters = ?ProviderRegistry::<HttpClient>::supported_providers(),
        timeout_secs = ?config.providers.request_timeout_secs,
        "Provider registry ready"
    );

    if config.security.uses_development_key() {
        warn!("security.encryption_key is not set; using the development key for stored API keys");
    }
    let cipher: Arc<dyn SecretCipher> =
        Arc::new(AesGcmCipher::new(config.security.encryption_key_or_default())?);

    let api_key_store: Arc<dyn Storage<StoredApiKey>> = Arc::new(InMemoryStorage::new());
    let conversation_store: Arc<dyn Storage<Conversation>> = Arc::new(InMemoryStorage::new());
    let message_store: Arc<dyn Storage<ConversationMessage>> = Arc::new(InMemoryStorage::new());

    let credentials = CredentialResolver::new(
        api_key_store.clone(),
        cipher.clone(),
        Arc::new(EnvCredentialProvider::default()),
    );
    let validator = CredentialValidator::new(provider_factory.clone(), config.credentials.validation);
    info!(mode = ?config.credentials.validation, "API key validation configured");

    Ok(AppState::new(
        provider_factory,
        credentials,
        ApiKeyService::new(api_key_store.clone(), cipher, validator),
        ConversationService::new(conversation_store.clone(), message_store),
        StorageHandles {
            api_keys: api_key_store,
            conversations: conversation_store,
        },
    ))
}
