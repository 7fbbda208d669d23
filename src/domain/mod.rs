//! Domain layer - Core business logic and entities

pub mod conversation;
pub mod credentials;
pub mod error;
pub mod llm;
pub mod storage;

pub use conversation::{Conversation, ConversationMessage};
pub use credentials::{
    ApiKeySummary, Credential, CredentialProvider, CredentialSource, SecretCipher, StoredApiKey,
};
pub use error::DomainError;
pub use llm::{
    ChatRequest, ChatRequestBuilder, ChatResponse, FinishReason, LlmProvider, Message, MessageRole,
    ProviderDescriptor, ProviderFactory, ProviderId, TextStream,
};
pub use storage::{RecordId, Storage, StorageEntity, StorageKey};

#[cfg(test)]
pub use credentials::{MockCredentialProvider, PrefixCipher};
#[cfg(test)]
pub use llm::{MockLlmProvider, MockProviderFactory};
