use serde::{Deserialize, Serialize};

/// Reason why the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Unknown,
}

/// Rough token count for text whose usage the vendor did not report.
///
/// Approximation only: one token is taken as four characters, rounded up.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.div_ceil(4)
}

/// Buffered response from an LLM provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub content: String,
    pub tokens_used: u32,
    pub model: String,
    pub provider: String,
    pub finish_reason: FinishReason,
}

impl ChatResponse {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        model: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let tokens_used = estimate_tokens(&content);

        Self {
            id: id.into(),
            content,
            tokens_used,
            model: model.into(),
            provider: provider.into(),
            finish_reason: FinishReason::Unknown,
        }
    }

    /// Use the vendor-reported count; zero or missing keeps the estimate
    pub fn with_tokens_used(mut self, tokens: Option<u32>) -> Self {
        if let Some(tokens) = tokens.filter(|t| *t > 0) {
            self.tokens_used = tokens;
        }
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = reason;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("Echo: Hi"), 2);
    }

    #[test]
    fn test_reported_usage_wins_over_estimate() {
        let response = ChatResponse::new("id-1", "Hello!", "gpt-4o", "openai")
            .with_tokens_used(Some(18));
        assert_eq!(response.tokens_used, 18);

        let response = ChatResponse::new("id-1", "Hello there", "gpt-4o", "openai")
            .with_tokens_used(None);
        assert_eq!(response.tokens_used, 3);
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = ChatResponse::new("id-1", "Hi", "m1", "p1")
            .with_finish_reason(FinishReason::ContentFilter);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["tokensUsed"], 1);
        assert_eq!(json["finishReason"], "content_filter");
    }
}
