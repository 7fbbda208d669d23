//! Server-Sent Events relay from a provider text stream to the browser

use std::convert::Infallible;

use axum::{
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::domain::TextStream;

/// Events buffered between the relay task and the HTTP body
const RELAY_BUFFER: usize = 32;

/// Data of the completion event
pub const DONE_SENTINEL: &str = "[DONE]";

/// Lifecycle of one relayed stream. `Completed` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Streaming,
    Completed,
    Failed,
}

impl RelayState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One event sent to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Content(String),
    Done,
    Error(String),
}

impl RelayEvent {
    /// SSE `data:` payload
    pub fn data(&self) -> String {
        match self {
            Self::Content(fragment) => json!({ "content": fragment }).to_string(),
            Self::Done => DONE_SENTINEL.to_string(),
            Self::Error(message) => json!({ "error": message }).to_string(),
        }
    }

    pub fn into_event(self) -> Event {
        Event::default().data(self.data())
    }
}

/// Guards the single-terminal-event rule
#[derive(Debug)]
pub struct Relay {
    state: RelayState,
    fragments: usize,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        Self {
            state: RelayState::Idle,
            fragments: 0,
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn on_fragment(&mut self, fragment: String) -> Option<RelayEvent> {
        if self.state.is_terminal() {
            return None;
        }

        self.state = RelayState::Streaming;
        self.fragments += 1;
        Some(RelayEvent::Content(fragment))
    }

    pub fn on_end(&mut self) -> Option<RelayEvent> {
        if self.state.is_terminal() {
            return None;
        }

        self.state = RelayState::Completed;
        Some(RelayEvent::Done)
    }

    pub fn on_error(&mut self, message: impl Into<String>) -> Option<RelayEvent> {
        if self.state.is_terminal() {
            return None;
        }

        self.state = RelayState::Failed;
        Some(RelayEvent::Error(message.into()))
    }
}

/// Pump `source` into a channel from a dedicated task.
///
/// The task stops pulling as soon as the receiver goes away; dropping
/// `source` at that point releases the vendor connection.
pub fn spawn_relay(mut source: TextStream) -> ReceiverStream<RelayEvent> {
    let (tx, rx) = mpsc::channel(RELAY_BUFFER);

    tokio::spawn(async move {
        let mut relay = Relay::new();

        while !relay.state().is_terminal() {
            let next = tokio::select! {
                biased;
                _ = tx.closed() => {
                    debug!(fragments = relay.fragments, "Client disconnected, dropping upstream stream");
                    break;
                }
                item = source.next() => item,
            };

            let event = match next {
                Some(Ok(fragment)) => relay.on_fragment(fragment),
                Some(Err(e)) => {
                    warn!(error = %e, fragments = relay.fragments, "Upstream stream failed");
                    relay.on_error(e.to_string())
                }
                None => relay.on_end(),
            };

            if let Some(event) = event {
                if tx.send(event).await.is_err() {
                    debug!("Client disconnected before event delivery");
                    break;
                }
            }
        }

        debug!(state = ?relay.state(), fragments = relay.fragments, "Relay finished");
    });

    ReceiverStream::new(rx)
}

/// SSE response relaying `source` to the client
pub fn sse_response(source: TextStream) -> Response {
    let events = spawn_relay(source).map(|event| Ok::<_, Infallible>(event.into_event()));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use futures::stream;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn source(items: Vec<Result<&str, DomainError>>) -> TextStream {
        Box::pin(stream::iter(
            items
                .into_iter()
                .map(|item| item.map(str::to_string))
                .collect::<Vec<_>>(),
        ))
    }

    #[test]
    fn test_event_payloads() {
        assert_eq!(RelayEvent::Content("Hel".into()).data(), r#"{"content":"Hel"}"#);
        assert_eq!(RelayEvent::Done.data(), "[DONE]");
        assert_eq!(
            RelayEvent::Error("boom".into()).data(),
            r#"{"error":"boom"}"#
        );
    }

    #[test]
    fn test_terminal_states_absorb() {
        let mut relay = Relay::new();
        assert_eq!(relay.state(), RelayState::Idle);

        assert!(relay.on_fragment("a".into()).is_some());
        assert_eq!(relay.state(), RelayState::Streaming);

        assert_eq!(relay.on_error("x"), Some(RelayEvent::Error("x".into())));
        assert_eq!(relay.on_end(), None);
        assert_eq!(relay.on_fragment("b".into()), None);
        assert_eq!(relay.on_error("y"), None);
        assert_eq!(relay.state(), RelayState::Failed);
    }

    #[test]
    fn test_empty_source_completes() {
        let mut relay = Relay::new();
        assert_eq!(relay.on_end(), Some(RelayEvent::Done));
        assert_eq!(relay.state(), RelayState::Completed);
    }

    #[tokio::test]
    async fn test_fragments_then_single_done() {
        let events: Vec<_> = spawn_relay(source(vec![Ok("Hel"), Ok("lo")])).collect().await;

        assert_eq!(
            events,
            vec![
                RelayEvent::Content("Hel".into()),
                RelayEvent::Content("lo".into()),
                RelayEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_mid_stream_error_is_last_event() {
        let events: Vec<_> = spawn_relay(source(vec![
            Ok("partial"),
            Err(DomainError::network("openai", "connection reset")),
            Ok("never sent"),
        ]))
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], RelayEvent::Content("partial".into()));
        assert_eq!(
            events[1],
            RelayEvent::Error("Request to openai failed: connection reset".into())
        );
    }

    #[tokio::test]
    async fn test_client_disconnect_drops_source() {
        let (guard_tx, guard_rx) = oneshot::channel::<()>();
        let pending: TextStream = Box::pin(stream::pending().map(move |item| {
            let _guard = &guard_tx;
            item
        }));

        let events = spawn_relay(pending);
        drop(events);

        let dropped = tokio::time::timeout(Duration::from_secs(1), guard_rx)
            .await
            .expect("relay task should release the source");
        assert!(dropped.is_err());
    }

    #[tokio::test]
    async fn test_sse_response_headers() {
        let response = sse_response(source(vec![Ok("x")]));

        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
    }
}
