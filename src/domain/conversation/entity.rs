use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::llm::MessageRole;
use crate::domain::storage::{RecordId, StorageEntity};

/// Longest title derived from a first message
const DERIVED_TITLE_LEN: usize = 50;

/// A chat thread owned by one user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: RecordId,
    pub user_id: String,
    pub title: String,
    pub model_provider: String,
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        model_provider: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: RecordId::generate(),
            user_id: user_id.into(),
            title: title.into(),
            model_provider: model_provider.into(),
            model_name: model_name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Conversation {
    type Key = RecordId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// One persisted message of a conversation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: RecordId,
    pub conversation_id: RecordId,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(
        conversation_id: RecordId,
        role: MessageRole,
        content: impl Into<String>,
        tokens_used: Option<u32>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            conversation_id,
            role,
            content: content.into(),
            tokens_used,
            created_at: Utc::now(),
        }
    }
}

impl StorageEntity for ConversationMessage {
    type Key = RecordId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}

/// Title for a conversation started from `content`
pub fn derive_title(content: &str) -> String {
    let trimmed = content.trim();

    if trimmed.chars().count() <= DERIVED_TITLE_LEN {
        return trimmed.to_string();
    }

    let head: String = trimmed.chars().take(DERIVED_TITLE_LEN).collect();
    format!("{}...", head)
}
