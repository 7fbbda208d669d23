//! LLM provider domain models and traits

mod catalog;
mod message;
mod provider;
mod provider_id;
mod request;
mod response;

pub use catalog::{find_descriptor, ProviderDescriptor, AVAILABLE_PROVIDERS};
pub use message::{Message, MessageRole};
pub use provider::{LlmProvider, ProviderFactory, TextStream};
pub use provider_id::ProviderId;
pub use request::{ChatRequest, ChatRequestBuilder, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use response::{estimate_tokens, ChatResponse, FinishReason};

#[cfg(test)]
pub use provider::mock::{MockLlmProvider, MockProviderFactory};
