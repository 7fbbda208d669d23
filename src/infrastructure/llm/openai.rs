use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::sse::{decode_text_stream, SseLine};
use crate::domain::{
    ChatRequest, ChatResponse, DomainError, FinishReason, LlmProvider, Message, ProviderId,
    TextStream,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "openai";
const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI chat completions adapter
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        serde_json::json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.effective_temperature(),
            "max_tokens": request.effective_max_tokens(),
            "stream": stream,
        })
    }

    fn parse_response(
        &self,
        request: &ChatRequest,
        json: serde_json::Value,
    ) -> Result<ChatResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::protocol(PROVIDER, format!("Failed to parse response: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::protocol(PROVIDER, "No choices in response"))?;

        let content = choice.message.content.unwrap_or_default();
        let finish_reason = choice
            .finish_reason
            .as_deref()
            .map(parse_finish_reason)
            .unwrap_or(FinishReason::Unknown);

        Ok(
            ChatResponse::new(response.id, content, request.model.clone(), PROVIDER)
                .with_tokens_used(response.usage.map(|u| u.total_tokens))
                .with_finish_reason(finish_reason),
        )
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    fn provider_name(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn available_models(&self) -> Vec<&'static str> {
        vec![
            "gpt-4o-mini",
            "gpt-4o",
            "gpt-4-turbo",
            "gpt-4",
            "gpt-3.5-turbo",
            "gpt-3.5-turbo-16k",
        ]
    }

    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Authorization", self.auth_header.clone()),
            ("Content-Type", "application/json".to_string()),
        ]
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, DomainError> {
        self.validate_request(request)?;

        let url = self.chat_completions_url();
        let body = self.build_request(request, false);
        debug!(model = %request.model, messages = request.messages.len(), "Sending OpenAI chat request");

        let response = self
            .client
            .post_json(PROVIDER, &url, self.auth_headers(), &body)
            .await?;

        self.parse_response(request, response)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<TextStream, DomainError> {
        self.validate_request(request)?;

        let url = self.chat_completions_url();
        let body = self.build_request(request, true);
        debug!(model = %request.model, messages = request.messages.len(), "Opening OpenAI chat stream");

        let byte_stream = self
            .client
            .post_json_stream(PROVIDER, &url, self.auth_headers(), &body)
            .await?;

        Ok(decode_text_stream(PROVIDER, byte_stream, parse_stream_line))
    }
}

/// One `data:` payload of a chat completions stream
fn parse_stream_line(payload: &str) -> Result<SseLine, DomainError> {
    if payload == DONE_SENTINEL {
        return Ok(SseLine::Done);
    }

    let chunk: OpenAiStreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(_) => return Ok(SseLine::Skip),
    };

    if let Some(error) = chunk.error {
        return Err(DomainError::protocol(PROVIDER, error.message));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty());

    Ok(content.map(SseLine::Text).unwrap_or(SseLine::Skip))
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Unknown,
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> OpenAiMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    error: Option<OpenAiStreamError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamError {
    #[serde(default = "default_stream_error")]
    message: String,
}

fn default_stream_error() -> String {
    "Stream error".to_string()
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiDelta,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
}
