//! Conversation service - per-user chat history

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::conversation::derive_title;
use crate::domain::storage::Storage;
use crate::domain::{Conversation, ConversationMessage, DomainError, MessageRole, RecordId};

/// Title given to conversations created without one
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// Request to start a conversation
#[derive(Debug, Clone)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
    pub model_provider: String,
    pub model_name: String,
}

/// Request to append one message
#[derive(Debug, Clone)]
pub struct AppendMessageRequest {
    pub role: MessageRole,
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Conversation listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub message_count: usize,
}

/// Conversation with its messages, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub messages: Vec<ConversationMessage>,
}

#[derive(Debug, Clone)]
pub struct ConversationService {
    conversations: Arc<dyn Storage<Conversation>>,
    messages: Arc<dyn Storage<ConversationMessage>>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn Storage<Conversation>>,
        messages: Arc<dyn Storage<ConversationMessage>>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// The caller's conversations, most recently active first
    pub async fn list(&self, user_id: &str) -> Result<Vec<ConversationSummary>, DomainError> {
        let mut conversations = self
            .conversations
            .find(&|c: &Conversation| c.is_owned_by(user_id))
            .await?;
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let message_count = self.messages_of(&conversation.id).await?.len();
            summaries.push(ConversationSummary {
                conversation,
                message_count,
            });
        }

        Ok(summaries)
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateConversationRequest,
    ) -> Result<Conversation, DomainError> {
        if request.model_provider.trim().is_empty() || request.model_name.trim().is_empty() {
            return Err(DomainError::validation("Missing required fields"));
        }

        let title = request
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string());

        let conversation =
            Conversation::new(user_id, title, request.model_provider, request.model_name);
        debug!(conversation_id = %conversation.id, "Creating conversation");

        self.conversations.create(conversation).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<ConversationDetail, DomainError> {
        let conversation = self.owned(user_id, id).await?;
        let mut messages = self.messages_of(&conversation.id).await?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(ConversationDetail {
            conversation,
            messages,
        })
    }

    pub async fn rename(
        &self,
        user_id: &str,
        id: &str,
        title: &str,
    ) -> Result<Conversation, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Title is required"));
        }

        let mut conversation = self.owned(user_id, id).await?;
        conversation.rename(title);

        self.conversations.update(conversation).await
    }

    /// Delete a conversation together with its messages
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        let conversation = self.owned(user_id, id).await?;

        for message in self.messages_of(&conversation.id).await? {
            self.messages.delete(&message.id).await?;
        }

        self.conversations.delete(&conversation.id).await?;
        debug!(conversation_id = id, "Deleted conversation");
        Ok(())
    }

    /// Append a message and bump the conversation's activity time.
    ///
    /// The first user message replaces a default title.
    pub async fn append_message(
        &self,
        user_id: &str,
        id: &str,
        request: AppendMessageRequest,
    ) -> Result<ConversationMessage, DomainError> {
        if request.content.trim().is_empty() {
            return Err(DomainError::validation("Missing required fields"));
        }

        let mut conversation = self.owned(user_id, id).await?;

        if request.role == MessageRole::User && conversation.title == DEFAULT_CONVERSATION_TITLE {
            let has_user_message = self
                .messages_of(&conversation.id)
                .await?
                .iter()
                .any(|m| m.role == MessageRole::User);

            if !has_user_message {
                conversation.title = derive_title(&request.content);
            }
        }

        let tokens_used = request.tokens_used.filter(|t| *t > 0);
        let message = ConversationMessage::new(
            conversation.id.clone(),
            request.role,
            request.content,
            tokens_used,
        );
        let message = self.messages.create(message).await?;

        conversation.touch();
        self.conversations.update(conversation).await?;

        Ok(message)
    }

    async fn owned(&self, user_id: &str, id: &str) -> Result<Conversation, DomainError> {
        self.conversations
            .get(&RecordId::new(id))
            .await?
            .filter(|c| c.is_owned_by(user_id))
            .ok_or_else(|| DomainError::not_found("Conversation not found"))
    }

    async fn messages_of(
        &self,
        conversation_id: &RecordId,
    ) -> Result<Vec<ConversationMessage>, DomainError> {
        self.messages
            .find(&|m: &ConversationMessage| &m.conversation_id == conversation_id)
            .await
    }
}
