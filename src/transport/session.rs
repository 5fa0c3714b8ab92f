//! # Chat Session
//!
//! The store every view reads from. A `ChatSession` owns the message
//! sequence and the request status; nothing else mutates them. Views never
//! poll it: they register a listener and receive a fresh [`ChatSnapshot`]
//! after every change.
//!
//! ```text
//! send_message ──► backend task ──► StreamEvent ──► apply() ──► listeners
//!      ▲                                                          │
//!      └──────────────── stop() aborts the task ◄─────────────────┘
//! ```
//!
//! Each request carries a generation number. `stop()` bumps it, so events
//! from an aborted task that were already queued are dropped instead of
//! resurrecting the response.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::backend::{ChatBackend, ChatRequest, TransportError};
use super::types::{
    ChatSnapshot, Message, Part, RequestStatus, Role, StreamEvent, WEATHER_TOOL, WeatherOutput,
};

/// Callback registered by a view. Invoked with the latest snapshot on every change.
pub type Listener = Box<dyn Fn(ChatSnapshot) + Send + Sync>;

/// The contract views consume: read, subscribe, send, stop.
pub trait ChatTransport: Send + Sync {
    fn snapshot(&self) -> ChatSnapshot;
    fn subscribe(&self, listener: Listener);
    /// Returns immediately; progress arrives through listeners.
    fn send_message(&self, text: String);
    fn stop(&self);
}

struct Inner {
    snapshot: ChatSnapshot,
    generation: u64,
    /// Id of the assistant message receiving the current stream.
    streaming_id: Option<String>,
    abort: Option<AbortHandle>,
}

struct Shared {
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<Arc<Listener>>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking listener must not wedge the session.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver `snapshot` to every listener, outside the state lock.
    fn notify(&self, snapshot: ChatSnapshot) {
        let listeners: Vec<Arc<Listener>> = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for listener in listeners {
            listener(snapshot.clone());
        }
    }

    fn apply(&self, generation: u64, event: StreamEvent) {
        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation {
                debug!("Dropping stale stream event from generation {generation}");
                return;
            }
            inner.snapshot.status = RequestStatus::Streaming;

            let message = ensure_assistant(&mut inner, &event);
            match event {
                StreamEvent::Start { .. } => {}
                StreamEvent::TextStart => message.parts.push(Part::text("")),
                StreamEvent::TextDelta(delta) => message.append_text(&delta),
                StreamEvent::ToolInput { call_id, name } => {
                    message.parts.push(Part::ToolResult {
                        call_id,
                        name,
                        output: None,
                    });
                }
                StreamEvent::ToolOutput { call_id, output } => {
                    attach_tool_output(message, call_id, output);
                }
            }
            inner.snapshot.clone()
        };
        self.notify(snapshot);
    }

    fn finish(&self, generation: u64, result: Result<(), TransportError>) {
        let snapshot = {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            match result {
                Ok(()) => {
                    info!("Response finished");
                    inner.snapshot.status = RequestStatus::Ready;
                }
                Err(e) => {
                    warn!("Response failed: {e}");
                    inner.snapshot.status = RequestStatus::Error;
                    inner.snapshot.error = Some(e.to_string());
                }
            }
            inner.streaming_id = None;
            inner.abort = None;
            inner.snapshot.clone()
        };
        self.notify(snapshot);
    }
}

/// Returns the assistant message receiving this stream, creating it on the
/// first event.
fn ensure_assistant<'a>(inner: &'a mut Inner, event: &StreamEvent) -> &'a mut Message {
    let existing = inner.streaming_id.as_ref().and_then(|id| {
        inner
            .snapshot
            .messages
            .iter()
            .position(|m| &m.id == id)
    });

    let index = match existing {
        Some(index) => index,
        None => {
            let id = match event {
                StreamEvent::Start {
                    message_id: Some(id),
                } => id.clone(),
                _ => uuid::Uuid::new_v4().to_string(),
            };
            debug!("Assistant message {id} started");
            inner.streaming_id = Some(id.clone());
            inner
                .snapshot
                .messages
                .push(Message::new(id, Role::Assistant, Vec::new()));
            inner.snapshot.messages.len() - 1
        }
    };
    &mut inner.snapshot.messages[index]
}

fn attach_tool_output(message: &mut Message, call_id: String, output: serde_json::Value) {
    let index = message.parts.iter().position(
        |part| matches!(part, Part::ToolResult { call_id: id, .. } if *id == call_id),
    );

    let Some(index) = index else {
        debug!("Tool output for unknown call {call_id}");
        message.parts.push(Part::ToolResult {
            call_id,
            name: String::new(),
            output: None,
        });
        return;
    };

    if let Part::ToolResult {
        name, output: slot, ..
    } = &mut message.parts[index]
    {
        if name.as_str() != WEATHER_TOOL {
            debug!("Ignoring output of non-weather tool {call_id}");
            return;
        }
        match serde_json::from_value::<WeatherOutput>(output) {
            Ok(weather) => *slot = Some(weather),
            Err(e) => warn!("Weather output for {call_id} unreadable: {e}"),
        }
    }
}

/// A conversation backed by a [`ChatBackend`].
pub struct ChatSession<B> {
    backend: Arc<B>,
    chat_id: String,
    shared: Arc<Shared>,
}

impl<B: ChatBackend + 'static> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            chat_id: uuid::Uuid::new_v4().to_string(),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    snapshot: ChatSnapshot::default(),
                    generation: 0,
                    streaming_id: None,
                    abort: None,
                }),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }
}

impl<B: ChatBackend + 'static> ChatTransport for ChatSession<B> {
    fn snapshot(&self) -> ChatSnapshot {
        self.shared.lock().snapshot.clone()
    }

    fn subscribe(&self, listener: Listener) {
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(listener));
    }

    fn send_message(&self, text: String) {
        let (generation, messages, snapshot) = {
            let mut inner = self.shared.lock();
            if inner.snapshot.status.in_flight() {
                warn!("send_message ignored: a response is already in flight");
                return;
            }
            inner.snapshot.messages.push(Message::user(text));
            inner.snapshot.status = RequestStatus::Submitted;
            inner.snapshot.error = None;
            inner.generation += 1;
            inner.streaming_id = None;
            (
                inner.generation,
                inner.snapshot.messages.clone(),
                inner.snapshot.clone(),
            )
        };
        info!(
            "Sending message via {} ({} messages in transcript)",
            self.backend.name(),
            messages.len()
        );
        self.shared.notify(snapshot);

        let backend = self.backend.clone();
        let shared = self.shared.clone();
        let chat_id = self.chat_id.clone();
        let handle = tokio::spawn(async move {
            let (tx, mut rx) = mpsc::channel::<StreamEvent>(100);
            let request = ChatRequest {
                chat_id: &chat_id,
                messages: &messages,
            };
            let stream = backend.stream_chat(request, tx);
            let forward = async {
                while let Some(event) = rx.recv().await {
                    shared.apply(generation, event);
                }
            };
            let (result, ()) = tokio::join!(stream, forward);
            shared.finish(generation, result);
        });

        let mut inner = self.shared.lock();
        if inner.generation == generation {
            inner.abort = Some(handle.abort_handle());
        }
    }

    fn stop(&self) {
        let snapshot = {
            let mut inner = self.shared.lock();
            if let Some(handle) = inner.abort.take() {
                handle.abort();
            }
            inner.generation += 1;
            inner.streaming_id = None;
            match inner.snapshot.status {
                RequestStatus::Submitted | RequestStatus::Streaming => {
                    info!("Response stopped by user");
                }
                // Stopping after a failure dismisses the error
                RequestStatus::Error => {
                    info!("Error dismissed by user");
                    inner.snapshot.error = None;
                }
                RequestStatus::Ready => return,
            }
            inner.snapshot.status = RequestStatus::Ready;
            inner.snapshot.clone()
        };
        self.shared.notify(snapshot);
    }
}
