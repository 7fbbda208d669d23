//! Infrastructure services

mod api_key_service;
mod conversation_service;

pub use api_key_service::{ApiKeyService, SaveApiKeyRequest, SaveOutcome};
pub use conversation_service::{
    AppendMessageRequest, ConversationDetail, ConversationService, ConversationSummary,
    CreateConversationRequest, DEFAULT_CONVERSATION_TITLE,
};
