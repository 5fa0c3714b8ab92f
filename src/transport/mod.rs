//! # Chat Transport
//!
//! The collaborator the UI talks to. It owns the transcript and the request
//! status; the UI only reads snapshots and issues `send_message` / `stop`.

pub mod backend;
pub mod http;
pub mod session;
pub mod types;

pub use backend::{ChatBackend, ChatRequest, TransportError};
pub use http::HttpBackend;
pub use session::{ChatSession, ChatTransport, Listener};
pub use types::{
    ChatSnapshot, Message, Part, RequestStatus, Role, StreamEvent, WEATHER_TOOL, WeatherOutput,
};
