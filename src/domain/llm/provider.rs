use async_trait::async_trait;
use futures::Stream;
use std::fmt::Debug;
use std::pin::Pin;

use super::{ChatRequest, ChatResponse, ProviderId};
use crate::domain::DomainError;

/// Incremental assistant text, in emission order. An `Err` item is terminal.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Capability set every vendor adapter implements so callers never branch
/// on vendor identity.
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Fixed identity of this adapter
    fn provider_name(&self) -> ProviderId;

    /// Vendor model ids; the first entry is the cheapest and is used to
    /// smoke-test credentials
    fn available_models(&self) -> Vec<&'static str>;

    /// Vendor-specific authentication headers
    fn auth_headers(&self) -> Vec<(&'static str, String)>;

    /// Reject malformed requests before any network traffic
    fn validate_request(&self, request: &ChatRequest) -> Result<(), DomainError> {
        request.validate()
    }

    /// Send a buffered chat request
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, DomainError>;

    /// Send a streaming chat request.
    ///
    /// Failures before the vendor starts answering are returned as `Err`;
    /// failures after that arrive as the last item of the stream.
    async fn chat_stream(&self, request: &ChatRequest) -> Result<TextStream, DomainError>;
}

/// Builds a provider adapter for one request from a short-lived credential
pub trait ProviderFactory: Send + Sync + Debug {
    fn create(&self, provider: &str, api_key: &str) -> Result<Box<dyn LlmProvider>, DomainError>;
}
