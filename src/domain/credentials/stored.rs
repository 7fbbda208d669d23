//! Per-user encrypted API key record

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::llm::ProviderId;
use crate::domain::storage::{RecordId, StorageEntity};

/// An API key bound to one `(user, provider, key_name)` triple.
///
/// Only the ciphertext is held; the plaintext never reaches storage.
#[derive(Debug, Clone)]
pub struct StoredApiKey {
    id: RecordId,
    user_id: String,
    provider: ProviderId,
    key_name: String,
    encrypted_key: String,
    is_valid: bool,
    created_at: DateTime<Utc>,
}

impl StoredApiKey {
    pub fn new(
        user_id: impl Into<String>,
        provider: ProviderId,
        key_name: impl Into<String>,
        encrypted_key: impl Into<String>,
        is_valid: bool,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            user_id: user_id.into(),
            provider,
            key_name: key_name.into(),
            encrypted_key: encrypted_key.into(),
            is_valid,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn encrypted_key(&self) -> &str {
        &self.encrypted_key
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True when this record belongs to `user_id` and targets `provider`
    pub fn matches(&self, user_id: &str, provider: ProviderId) -> bool {
        self.user_id == user_id && self.provider == provider
    }

    /// Replace the secret, keeping id and creation time
    pub fn rotate(&mut self, encrypted_key: impl Into<String>, is_valid: bool) {
        self.encrypted_key = encrypted_key.into();
        self.is_valid = is_valid;
    }

    pub fn summary(&self) -> ApiKeySummary {
        ApiKeySummary {
            id: self.id.to_string(),
            provider: self.provider,
            key_name: self.key_name.clone(),
            is_valid: self.is_valid,
            created_at: self.created_at,
        }
    }
}

impl StorageEntity for StoredApiKey {
    type Key = RecordId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Public view of a stored key; never carries the secret
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySummary {
    pub id: String,
    pub provider: ProviderId,
    pub key_name: String,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}
