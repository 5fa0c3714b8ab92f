use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{Message, StreamEvent};

/// Errors a backend can report while producing a response.
#[derive(Debug)]
pub enum TransportError {
    /// Endpoint misconfigured (bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Endpoint answered with a non-success status.
    Api { status: u16, message: String },
    /// A stream chunk could not be decoded.
    Parse(String),
    /// The endpoint reported an error inside the stream. Shown verbatim.
    Remote(String),
    /// The session stopped listening.
    ChannelClosed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Config(msg) => write!(f, "config error: {msg}"),
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
            TransportError::Remote(msg) => f.write_str(msg),
            TransportError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Everything a backend needs to produce the next assistant response.
pub struct ChatRequest<'a> {
    pub chat_id: &'a str,
    pub messages: &'a [Message],
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Streams one assistant response, sending increments to `sender`.
    /// Returning `Ok` means the response finished normally.
    async fn stream_chat(
        &self,
        request: ChatRequest<'_>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), TransportError>;
}
