use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http_client::HttpClientTrait;
use super::sse::{decode_text_stream, SseLine};
use crate::domain::{
    ChatRequest, ChatResponse, DomainError, FinishReason, LlmProvider, Message, MessageRole,
    ProviderId, TextStream,
};

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

const PROVIDER: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages API adapter
#[derive(Debug)]
pub struct AnthropicProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> AnthropicProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        let (system, messages) = split_system_messages(&request.messages);

        let anthropic_messages: Vec<AnthropicMessage> =
            messages.into_iter().map(AnthropicMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": anthropic_messages,
            "max_tokens": request.effective_max_tokens(),
            "temperature": request.effective_temperature(),
            "stream": stream,
        });

        if let Some(system_content) = system {
            body["system"] = serde_json::json!(system_content);
        }

        body
    }

    fn parse_response(
        &self,
        request: &ChatRequest,
        json: serde_json::Value,
    ) -> Result<ChatResponse, DomainError> {
        let response: AnthropicResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::protocol(PROVIDER, format!("Failed to parse response: {}", e)))?;

        let first = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::protocol(PROVIDER, "No content in response"))?;

        let tokens_used = response
            .usage
            .map(|u| u.input_tokens + u.output_tokens);

        let finish_reason = response
            .stop_reason
            .as_deref()
            .map(parse_stop_reason)
            .unwrap_or(FinishReason::Unknown);

        Ok(ChatResponse::new(
            response.id,
            first.text.unwrap_or_default(),
            request.model.clone(),
            PROVIDER,
        )
        .with_tokens_used(tokens_used)
        .with_finish_reason(finish_reason))
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for AnthropicProvider<C> {
    fn provider_name(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn available_models(&self) -> Vec<&'static str> {
        vec![
            "claude-3-5-haiku-20241022",
            "claude-3-haiku-20240307",
            "claude-sonnet-4-20250514",
            "claude-3-5-sonnet-20241022",
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
        ]
    }

    fn auth_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ("Content-Type", "application/json".to_string()),
        ]
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, DomainError> {
        self.validate_request(request)?;

        let url = self.messages_url();
        let body = self.build_request(request, false);
        debug!(model = %request.model, messages = request.messages.len(), "Sending Anthropic chat request");

        let response = self
            .client
            .post_json(PROVIDER, &url, self.auth_headers(), &body)
            .await?;

        self.parse_response(request, response)
    }

    async fn chat_stream(&self, request: &ChatRequest) -> Result<TextStream, DomainError> {
        self.validate_request(request)?;

        let url = self.messages_url();
        let body = self.build_request(request, true);
        debug!(model = %request.model, messages = request.messages.len(), "Opening Anthropic chat stream");

        let byte_stream = self
            .client
            .post_json_stream(PROVIDER, &url, self.auth_headers(), &body)
            .await?;

        Ok(decode_text_stream(PROVIDER, byte_stream, parse_stream_line))
    }
}

/// Pull system messages out of the turn list; Anthropic takes them as a
/// single top-level `system` string joined with newlines.
fn split_system_messages(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
    let (system, turns): (Vec<&Message>, Vec<&Message>) = messages
        .iter()
        .partition(|m| m.role == MessageRole::System);

    let system_content = system
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let system = if system_content.is_empty() {
        None
    } else {
        Some(system_content)
    };

    (system, turns)
}

/// One `data:` payload of a messages stream
fn parse_stream_line(payload: &str) -> Result<SseLine, DomainError> {
    let event: AnthropicStreamEvent = match serde_json::from_str(payload) {
        Ok(event) => event,
        Err(_) => return Ok(SseLine::Skip),
    };

    match event.event_type.as_str() {
        "content_block_delta" => Ok(event
            .delta
            .and_then(|d| d.text)
            .filter(|text| !text.is_empty())
            .map(SseLine::Text)
            .unwrap_or(SseLine::Skip)),
        "message_stop" => Ok(SseLine::Done),
        "error" => {
            let message = event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Stream error".to_string());
            Err(DomainError::protocol(PROVIDER, message))
        }
        _ => Ok(SseLine::Skip),
    }
}

fn parse_stop_reason(reason: &str) -> FinishReason {
    match reason {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        _ => FinishReason::Unknown,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> AnthropicMessage<'a> {
    fn from_domain(message: &'a Message) -> Self {
        let role = match message.role {
            MessageRole::User => "user",
            _ => "assistant",
        };

        Self {
            role,
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    id: String,
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<AnthropicDelta>,
    error: Option<AnthropicStreamError>,
}

#[derive(Debug, Deserialize)]
struct AnthropicDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;
    use futures::StreamExt;

    const TEST_URL: &str = "https://api.anthropic.com/v1/messages";

    fn request() -> ChatRequest {
        ChatRequest::builder()
            .system("A")
            .user("B")
            .system("C")
            .assistant("D")
            .model("claude-3-5-sonnet-20241022")
            .provider("anthropic")
            .build()
    }

    fn ok_response() -> serde_json::Value {
        serde_json::json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": "Hello there" }],
            "model": "claude-3-5-sonnet-20241022",
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 12, "output_tokens": 3 }
        })
    }

    #[test]
    fn test_system_messages_are_hoisted() {
        let request = request();
        let (system, turns) = split_system_messages(&request.messages);

        assert_eq!(system.as_deref(), Some("A\nC"));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "B");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "D");
    }

    #[tokio::test]
    async fn test_anthropic_chat_wire_format() {
        let client = MockHttpClient::new().with_response(TEST_URL, ok_response());
        let provider = AnthropicProvider::new(client.clone(), "sk-ant-test");

        let response = provider.chat(&request()).await.unwrap();

        assert_eq!(response.id, "msg_123");
        assert_eq!(response.content, "Hello there");
        assert_eq!(response.tokens_used, 15);
        assert_eq!(response.provider, "anthropic");
        assert_eq!(response.finish_reason, FinishReason::Stop);

        let sent = client.last_request().unwrap();
        assert_eq!(sent.body["system"], "A\nC");
        assert_eq!(
            sent.body["messages"],
            serde_json::json!([
                { "role": "user", "content": "B" },
                { "role": "assistant", "content": "D" }
            ])
        );
        assert_eq!(sent.body["max_tokens"], 2048);
        assert!(sent.headers.iter().any(|(k, v)| *k == "x-api-key" && v == "sk-ant-test"));
        assert!(sent
            .headers
            .iter()
            .any(|(k, v)| *k == "anthropic-version" && v == ANTHROPIC_VERSION));
    }

    #[tokio::test]
    async fn test_no_system_field_without_system_messages() {
        let client = MockHttpClient::new().with_response(TEST_URL, ok_response());
        let provider = AnthropicProvider::new(client.clone(), "sk-ant-test");
        let req = ChatRequest::builder()
            .user("Hi")
            .model("claude-3-5-haiku-20241022")
            .provider("anthropic")
            .build();

        provider.chat(&req).await.unwrap();

        assert!(client.last_request().unwrap().body.get("system").is_none());
    }

    #[tokio::test]
    async fn test_empty_content_is_protocol_error() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({ "id": "msg", "content": [], "stop_reason": "end_turn" }),
        );
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        let err = provider.chat(&request()).await.unwrap_err();
        assert!(matches!(err, DomainError::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_anthropic_auth_error() {
        let client = MockHttpClient::new().with_error(
            TEST_URL,
            401,
            r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#,
        );
        let provider = AnthropicProvider::new(client, "bad");

        let err = provider.chat(&request()).await.unwrap_err();
        assert!(err.is_credential_problem());
    }

    #[tokio::test]
    async fn test_anthropic_stream() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![
                "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{}}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":",
                "{\"type\":\"text_delta\",\"text\":\"hi\"}}\n\n",
                "event: ping\ndata: {\"type\":\"ping\"}\n\n",
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\" there\"}}\n\n",
                "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
            ],
        );
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        let stream = provider.chat_stream(&request()).await.unwrap();
        let fragments: Vec<String> = stream.map(|r| r.unwrap()).collect().await;

        assert_eq!(fragments, vec!["hi", " there"]);
    }

    #[tokio::test]
    async fn test_stream_error_event_is_terminal() {
        let client = MockHttpClient::new().with_stream_response(
            TEST_URL,
            vec![
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"par\"}}\n\n",
                "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"tial\"}}\n\n",
            ],
        );
        let provider = AnthropicProvider::new(client, "sk-ant-test");

        let items: Vec<_> = provider.chat_stream(&request()).await.unwrap().collect().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "par");
        assert!(matches!(items[1], Err(DomainError::Protocol { .. })));
    }

    #[tokio::test]
    async fn test_empty_messages_never_reach_network() {
        let client = MockHttpClient::new();
        let provider = AnthropicProvider::new(client.clone(), "sk-ant-test");
        let req = ChatRequest::new(vec![], "claude-3-5-haiku-20241022", "anthropic");

        assert!(provider.chat(&req).await.is_err());
        assert!(provider.chat_stream(&req).await.is_err());
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_parse_stop_reason() {
        assert_eq!(parse_stop_reason("end_turn"), FinishReason::Stop);
        assert_eq!(parse_stop_reason("max_tokens"), FinishReason::Length);
        assert_eq!(parse_stop_reason("tool_use"), FinishReason::Unknown);
    }
}
