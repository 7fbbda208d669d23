//! API key service - per-user encrypted vendor keys

use std::sync::Arc;

use tracing::info;

use crate::domain::storage::Storage;
use crate::domain::{ApiKeySummary, DomainError, ProviderId, RecordId, SecretCipher, StoredApiKey};
use crate::infrastructure::credentials::CredentialValidator;

/// Request to store (or replace) a key
#[derive(Debug, Clone)]
pub struct SaveApiKeyRequest {
    pub provider: String,
    pub key_name: String,
    pub api_key: String,
}

/// Whether a save inserted a new record or rotated an existing one
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(ApiKeySummary),
    Updated(ApiKeySummary),
}

impl SaveOutcome {
    pub fn summary(&self) -> &ApiKeySummary {
        match self {
            Self::Created(summary) | Self::Updated(summary) => summary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiKeyService {
    storage: Arc<dyn Storage<StoredApiKey>>,
    cipher: Arc<dyn SecretCipher>,
    validator: CredentialValidator,
}

impl ApiKeyService {
    pub fn new(
        storage: Arc<dyn Storage<StoredApiKey>>,
        cipher: Arc<dyn SecretCipher>,
        validator: CredentialValidator,
    ) -> Self {
        Self {
            storage,
            cipher,
            validator,
        }
    }

    /// The caller's keys, newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<ApiKeySummary>, DomainError> {
        let mut keys = self
            .storage
            .find(&|k: &StoredApiKey| k.user_id() == user_id)
            .await?;

        keys.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(keys.iter().map(StoredApiKey::summary).collect())
    }

    /// Validate, encrypt and upsert on `(user, provider, key_name)`.
    ///
    /// A key that fails validation is still stored, flagged invalid.
    pub async fn save(
        &self,
        user_id: &str,
        request: SaveApiKeyRequest,
    ) -> Result<SaveOutcome, DomainError> {
        let key_name = request.key_name.trim();
        let api_key = request.api_key.trim();

        if request.provider.trim().is_empty() || key_name.is_empty() || api_key.is_empty() {
            return Err(DomainError::validation("Missing required fields"));
        }

        let provider: ProviderId = request.provider.trim().parse()?;
        let is_valid = self.validator.validate(provider, api_key).await;
        let encrypted_key = self.cipher.encrypt(api_key)?;

        let existing = self
            .storage
            .find(&|k: &StoredApiKey| k.matches(user_id, provider) && k.key_name() == key_name)
            .await?
            .into_iter()
            .next();

        let outcome = match existing {
            Some(mut stored) => {
                stored.rotate(encrypted_key, is_valid);
                let stored = self.storage.update(stored).await?;
                SaveOutcome::Updated(stored.summary())
            }
            None => {
                let stored =
                    StoredApiKey::new(user_id, provider, key_name, encrypted_key, is_valid);
                let stored = self.storage.create(stored).await?;
                SaveOutcome::Created(stored.summary())
            }
        };

        info!(
            provider = %provider,
            key_name = key_name,
            is_valid = is_valid,
            created = matches!(outcome, SaveOutcome::Created(_)),
            "Stored API key"
        );

        Ok(outcome)
    }

    /// Delete one of the caller's keys; other users' ids are reported missing
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        let record_id = RecordId::new(id);

        let owned = self
            .storage
            .get(&record_id)
            .await?
            .filter(|k| k.user_id() == user_id);

        if owned.is_none() || !self.storage.delete(&record_id).await? {
            return Err(DomainError::not_found("API key not found"));
        }

        info!(key_id = id, "Deleted API key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationMode;
    use crate::domain::{MockLlmProvider, MockProviderFactory, PrefixCipher};
    use crate::infrastructure::storage::InMemoryStorage;

    fn service(provider: MockLlmProvider) -> (ApiKeyService, Arc<InMemoryStorage<StoredApiKey>>) {
        let storage = Arc::new(InMemoryStorage::new());
        let validator =
            CredentialValidator::new(Arc::new(MockProviderFactory::new(provider)), ValidationMode::Probe);
        let service = ApiKeyService::new(storage.clone(), Arc::new(PrefixCipher), validator);
        (service, storage)
    }

    fn request(provider: &str, name: &str, key: &str) -> SaveApiKeyRequest {
        SaveApiKeyRequest {
            provider: provider.to_string(),
            key_name: name.to_string(),
            api_key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_update_same_name() {
        let (service, storage) = service(MockLlmProvider::new(ProviderId::OpenAi));

        let first = service
            .save("user-1", request("openai", "default", "sk-one"))
            .await
            .unwrap();
        let second = service
            .save("user-1", request("openai", "default", "sk-two"))
            .await
            .unwrap();

        assert!(matches!(first, SaveOutcome::Created(_)));
        assert!(matches!(second, SaveOutcome::Updated(_)));
        assert_eq!(first.summary().id, second.summary().id);

        let stored = storage.list().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].encrypted_key(), "enc:sk-two");
    }

    #[tokio::test]
    async fn test_failed_probe_stores_invalid_key() {
        let (service, _) =
            service(MockLlmProvider::new(ProviderId::OpenAi).with_upstream_error(401, "Unauthorized"));

        let outcome = service
            .save("user-1", request("openai", "default", "sk-bad"))
            .await
            .unwrap();

        assert!(!outcome.summary().is_valid);
    }

    #[tokio::test]
    async fn test_missing_fields_and_bad_provider() {
        let (service, storage) = service(MockLlmProvider::new(ProviderId::OpenAi));

        assert!(matches!(
            service.save("user-1", request("openai", "", "sk")).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            service.save("user-1", request("acme", "default", "sk")).await,
            Err(DomainError::UnsupportedProvider { .. })
        ));
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_hides_secret() {
        let (service, _) = service(MockLlmProvider::new(ProviderId::OpenAi));

        service.save("user-1", request("openai", "a", "sk-a")).await.unwrap();
        service.save("user-1", request("openai", "b", "sk-b")).await.unwrap();
        service.save("user-2", request("openai", "c", "sk-c")).await.unwrap();

        let keys = service.list("user-1").await.unwrap();

        assert_eq!(keys.len(), 2);
        assert!(keys[0].created_at >= keys[1].created_at);
        assert!(!serde_json::to_string(&keys).unwrap().contains("sk-"));
    }

    #[tokio::test]
    async fn test_delete_only_own_keys() {
        let (service, _) = service(MockLlmProvider::new(ProviderId::OpenAi));
        let outcome = service
            .save("user-1", request("openai", "default", "sk-one"))
            .await
            .unwrap();
        let id = outcome.summary().id.clone();

        assert!(matches!(
            service.delete("user-2", &id).await,
            Err(DomainError::NotFound { .. })
        ));

        service.delete("user-1", &id).await.unwrap();

        assert!(matches!(
            service.delete("user-1", &id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
