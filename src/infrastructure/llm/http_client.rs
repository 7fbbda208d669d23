use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Outbound JSON-over-HTTP calls to a vendor (mockable)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// POST `body` and decode the whole JSON reply.
    ///
    /// Non-2xx replies become classified upstream errors carrying the
    /// status and the raw body.
    async fn post_json(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&'static str, String)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    /// POST `body` and hand back the reply body as it arrives.
    ///
    /// Dropping the returned stream releases the connection.
    async fn post_json_stream(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&'static str, String)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client with an optional whole-request timeout; `None` waits forever
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            DomainError::configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&'static str, String)>,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::network(provider, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream(provider, status, error_body));
        }

        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&'static str, String)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(provider, url, headers, body).await?;

        response
            .json()
            .await
            .map_err(|e| DomainError::protocol(provider, format!("Failed to parse response: {}", e)))
    }

    async fn post_json_stream(
        &self,
        provider: &str,
        url: &str,
        headers: Vec<(&'static str, String)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(provider, url, headers, body).await?;

        use futures::StreamExt;
        let provider = provider.to_string();
        let stream = response.bytes_stream().map(move |result| {
            result.map_err(|e| DomainError::network(&provider, format!("Stream error: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use futures::stream;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    /// A request the mock received
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(&'static str, String)>,
        pub body: serde_json::Value,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MockHttpClient {
        responses: Arc<RwLock<HashMap<String, serde_json::Value>>>,
        stream_responses: Arc<RwLock<HashMap<String, Vec<Bytes>>>>,
        errors: Arc<RwLock<HashMap<String, (u16, String)>>>,
        recorded: Arc<RwLock<Vec<RecordedRequest>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: serde_json::Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_stream_response(self, url: impl Into<String>, chunks: Vec<&str>) -> Self {
            let chunks = chunks
                .into_iter()
                .map(|c| Bytes::from(c.to_string()))
                .collect();
            self.stream_responses
                .write()
                .unwrap()
                .insert(url.into(), chunks);
            self
        }

        pub fn with_stream_bytes(self, url: impl Into<String>, chunks: Vec<Bytes>) -> Self {
            self.stream_responses
                .write()
                .unwrap()
                .insert(url.into(), chunks);
            self
        }

        pub fn with_error(
            self,
            url: impl Into<String>,
            status: u16,
            body: impl Into<String>,
        ) -> Self {
            self.errors
                .write()
                .unwrap()
                .insert(url.into(), (status, body.into()));
            self
        }

        /// Number of outbound calls attempted
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<RecordedRequest> {
            self.recorded.read().unwrap().last().cloned()
        }

        fn record(
            &self,
            provider: &str,
            url: &str,
            headers: Vec<(&'static str, String)>,
            body: &serde_json::Value,
        ) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.recorded.write().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers,
                body: body.clone(),
            });

            if let Some((status, body)) = self.errors.read().unwrap().get(url) {
                return Err(DomainError::upstream(provider, *status, body.clone()));
            }

            Ok(())
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            provider: &str,
            url: &str,
            headers: Vec<(&'static str, String)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, DomainError> {
            self.record(provider, url, headers, body)?;

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::network(provider, format!("No mock response for {}", url)))
        }

        async fn post_json_stream(
            &self,
            provider: &str,
            url: &str,
            headers: Vec<(&'static str, String)>,
            body: &serde_json::Value,
        ) -> Result<ByteStream, DomainError> {
            self.record(provider, url, headers, body)?;

            let chunks = self
                .stream_responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_default();

            Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
        }
    }
}
