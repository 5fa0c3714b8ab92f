//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::action::HapticKind;
use crate::platform::{Clipboard, ClipboardError, Haptics};
use crate::transport::{
    ChatBackend, ChatRequest, ChatSession, ChatSnapshot, ChatTransport, RequestStatus,
    StreamEvent, TransportError,
};

enum Script {
    Events(Vec<StreamEvent>),
    Pending,
    Fail(String),
}

/// A backend that replays a fixed response instead of calling an endpoint.
pub struct ScriptedBackend {
    script: Script,
}

impl ScriptedBackend {
    pub fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            script: Script::Events(events),
        }
    }

    /// Never answers; the request stays in flight until stopped.
    pub fn pending() -> Self {
        Self {
            script: Script::Pending,
        }
    }

    /// Fails with a remote error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            script: Script::Fail(message.to_string()),
        }
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(
        &self,
        _request: ChatRequest<'_>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), TransportError> {
        match &self.script {
            Script::Events(events) => {
                for event in events {
                    sender
                        .send(event.clone())
                        .await
                        .map_err(|_| TransportError::ChannelClosed)?;
                }
                Ok(())
            }
            Script::Pending => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Script::Fail(message) => Err(TransportError::Remote(message.clone())),
        }
    }
}

/// Subscribes to `transport` and records every snapshot it publishes.
pub fn collect_snapshots<T: ChatTransport + ?Sized>(transport: &T) -> Arc<Mutex<Vec<ChatSnapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    transport.subscribe(Box::new(move |snapshot| {
        sink.lock().unwrap().push(snapshot);
    }));
    seen
}

/// Polls the session until it reports `status`. Panics after two seconds.
pub async fn wait_for_status<B: ChatBackend + 'static>(
    session: &ChatSession<B>,
    status: RequestStatus,
) -> ChatSnapshot {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let snapshot = session.snapshot();
        if snapshot.status == status {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {:?}, last status {:?}",
            status,
            snapshot.status
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Clipboard that remembers what it was given.
#[derive(Default)]
pub struct RecordingClipboard {
    pub copied: Mutex<Vec<String>>,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Haptics sink that remembers every notification.
#[derive(Default)]
pub struct RecordingHaptics {
    pub fired: Mutex<Vec<HapticKind>>,
}

impl Haptics for RecordingHaptics {
    fn notify(&self, kind: HapticKind) {
        self.fired.lock().unwrap().push(kind);
    }
}

/// A transport that records calls and publishes whatever snapshot it is handed.
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Mutex<Vec<String>>,
    pub stops: Mutex<usize>,
    snapshot: Mutex<ChatSnapshot>,
}

impl ChatTransport for FakeTransport {
    fn snapshot(&self) -> ChatSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn subscribe(&self, _listener: crate::transport::Listener) {}

    fn send_message(&self, text: String) {
        self.sent.lock().unwrap().push(text);
    }

    fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
    }
}
