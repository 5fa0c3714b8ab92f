use serde::{Deserialize, Serialize};

/// Name of the only tool whose results the transcript knows how to draw.
pub const WEATHER_TOOL: &str = "weather";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Output of the weather tool as delivered by the endpoint.
///
/// Both fields are lenient: a result that arrives without a temperature is
/// still drawn, with a placeholder instead of a number.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WeatherOutput {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// One structured fragment of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        text: String,
    },
    ToolResult {
        call_id: String,
        name: String,
        /// `None` until the tool output arrives, or when it could not be read
        /// as weather data.
        output: Option<WeatherOutput>,
    },
    /// A part type this client doesn't understand. Kept so part indices stay
    /// stable, never drawn.
    Unknown,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn weather(location: impl Into<String>, temperature: Option<f64>) -> Self {
        Part::ToolResult {
            call_id: uuid::Uuid::new_v4().to_string(),
            name: WEATHER_TOOL.to_string(),
            output: Some(WeatherOutput {
                location: location.into(),
                temperature,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn new(id: impl Into<String>, role: Role, parts: Vec<Part>) -> Self {
        Self {
            id: id.into(),
            role,
            parts,
        }
    }

    /// A fresh user message with a random id.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            Role::User,
            vec![Part::text(text)],
        )
    }

    /// The first weather tool result carried by this message, if any.
    pub fn weather(&self) -> Option<&WeatherOutput> {
        self.parts.iter().find_map(|part| match part {
            Part::ToolResult {
                name,
                output: Some(output),
                ..
            } if name == WEATHER_TOOL => Some(output),
            _ => None,
        })
    }

    /// Appends streamed text to the trailing text part, or starts a new one.
    pub fn append_text(&mut self, delta: &str) {
        if let Some(Part::Text { text }) = self.parts.last_mut() {
            text.push_str(delta);
            return;
        }
        self.parts.push(Part::text(delta));
    }
}

/// Lifecycle of the request currently outstanding against the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Ready,
    Submitted,
    Streaming,
    Error,
}

impl RequestStatus {
    /// True while a response is pending or arriving.
    pub fn in_flight(self) -> bool {
        matches!(self, RequestStatus::Submitted | RequestStatus::Streaming)
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Ready => "ready",
            RequestStatus::Submitted => "waiting",
            RequestStatus::Streaming => "streaming",
            RequestStatus::Error => "error",
        }
    }
}

/// Everything a subscriber needs to redraw, captured at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub status: RequestStatus,
    pub error: Option<String>,
}

/// An increment delivered by a backend while a response streams in.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The assistant message has begun. The endpoint may name its id.
    Start { message_id: Option<String> },
    /// A new text part begins.
    TextStart,
    TextDelta(String),
    /// The model invoked a tool; its output follows later.
    ToolInput { call_id: String, name: String },
    ToolOutput {
        call_id: String,
        output: serde_json::Value,
    },
}
