use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    Credential, CredentialProvider, CredentialSource, DomainError, ProviderId, SecretCipher,
    Storage, StoredApiKey,
};

/// Finds the API key to use for one outbound call.
///
/// The caller's newest valid stored key wins; otherwise the process-wide
/// fallback is used.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    api_keys: Arc<dyn Storage<StoredApiKey>>,
    cipher: Arc<dyn SecretCipher>,
    fallback: Arc<dyn CredentialProvider>,
}

impl CredentialResolver {
    pub fn new(
        api_keys: Arc<dyn Storage<StoredApiKey>>,
        cipher: Arc<dyn SecretCipher>,
        fallback: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            api_keys,
            cipher,
            fallback,
        }
    }

    pub async fn resolve(
        &self,
        user_id: Option<&str>,
        provider: &str,
    ) -> Result<Credential, DomainError> {
        let id: ProviderId = provider.parse()?;

        if let Some(user_id) = user_id {
            if let Some(stored) = self.newest_valid_key(user_id, id).await? {
                let api_key = self.cipher.decrypt(stored.encrypted_key())?;
                debug!(provider = %id, key_name = stored.key_name(), "Using stored API key");
                return Ok(Credential::new(id, api_key, CredentialSource::UserStore));
            }
        }

        match self.fallback.fallback_key(id).await {
            Some(api_key) => {
                debug!(provider = %id, source = self.fallback.source_name(), "Using fallback API key");
                Ok(Credential::new(id, api_key, CredentialSource::Environment))
            }
            None => Err(DomainError::no_credential(id.as_str())),
        }
    }

    /// Whether a credential could be resolved for each catalog provider
    pub async fn availability(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<&'static str, bool>, DomainError> {
        let owned = self
            .api_keys
            .find(&|k: &StoredApiKey| k.user_id() == user_id && k.is_valid())
            .await?;

        let mut availability = BTreeMap::new();
        for id in ProviderId::ALL {
            let available = owned.iter().any(|k| k.provider() == id)
                || self.fallback.fallback_key(id).await.is_some();
            availability.insert(id.as_str(), available);
        }

        Ok(availability)
    }

    async fn newest_valid_key(
        &self,
        user_id: &str,
        provider: ProviderId,
    ) -> Result<Option<StoredApiKey>, DomainError> {
        let candidates = self
            .api_keys
            .find(&|k: &StoredApiKey| k.matches(user_id, provider) && k.is_valid())
            .await?;

        Ok(candidates.into_iter().max_by_key(|k| k.created_at()))
    }
}
