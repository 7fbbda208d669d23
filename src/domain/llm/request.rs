use serde::{Deserialize, Serialize};

use super::Message;
use crate::domain::DomainError;

/// Temperature used when the caller does not set one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Output budget used when the caller does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Normalized chat request shared by every provider adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    pub fn new(
        messages: Vec<Message>,
        model: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            model: model.into(),
            provider: provider.into(),
            temperature: None,
            max_tokens: None,
            stream: false,
        }
    }

    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::new()
    }

    pub fn effective_temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Check the request shape before anything leaves the process
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.messages.is_empty() {
            return Err(DomainError::validation("Messages are required"));
        }

        if self.model.trim().is_empty() {
            return Err(DomainError::validation("Model is required"));
        }

        if self.provider.trim().is_empty() {
            return Err(DomainError::validation("Provider is required"));
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(DomainError::validation(
                    "Temperature must be between 0 and 2",
                ));
            }
        }

        if self.max_tokens == Some(0) {
            return Err(DomainError::validation("maxTokens must be a positive integer"));
        }

        Ok(())
    }
}

/// Builder for ChatRequest
#[derive(Debug, Default)]
pub struct ChatRequestBuilder {
    messages: Vec<Message>,
    model: String,
    provider: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    stream: bool,
}

impl ChatRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn build(self) -> ChatRequest {
        ChatRequest {
            messages: self.messages,
            model: self.model,
            provider: self.provider,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: self.stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ChatRequest {
        ChatRequest::builder()
            .system("You are a helpful assistant")
            .user("Hello!")
            .model("gpt-4o")
            .provider("openai")
            .build()
    }

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::builder()
            .system("You are a helpful assistant")
            .user("Hello!")
            .model("gpt-4o")
            .provider("openai")
            .temperature(0.2)
            .max_tokens(100)
            .build();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(100));
        assert!(!request.stream);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_defaults_apply_only_when_unset() {
        let request = valid_request();
        assert_eq!(request.effective_temperature(), DEFAULT_TEMPERATURE);
        assert_eq!(request.effective_max_tokens(), DEFAULT_MAX_TOKENS);

        let request = ChatRequest::builder()
            .user("Hi")
            .model("m")
            .provider("p")
            .temperature(0.0)
            .build();
        assert_eq!(request.effective_temperature(), 0.0);
    }

    #[test]
    fn test_empty_messages_rejected() {
        let request = ChatRequest::new(vec![], "gpt-4o", "openai");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn test_missing_model_rejected() {
        let mut request = valid_request();
        request.model = "  ".to_string();
        assert!(matches!(
            request.validate(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_out_of_range_sampling_rejected() {
        let mut request = valid_request();
        request.temperature = Some(2.5);
        assert!(request.validate().is_err());

        let mut request = valid_request();
        request.max_tokens = Some(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case_body() {
        let json = r#"{
            "messages": [{"role": "user", "content": "Hi"}],
            "model": "m1",
            "provider": "p1",
            "maxTokens": 50,
            "stream": true
        }"#;

        let request: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.max_tokens, Some(50));
        assert!(request.stream);
        assert_eq!(request.temperature, None);
    }
}
