//! HTTP backend for the chat endpoint.
//!
//! POSTs the whole conversation as JSON and reads the reply as a stream of
//! server-sent events, one JSON chunk per `data:` line, ending with
//! `data: [DONE]`. Only the chunk types the transcript can show are
//! translated; everything else is logged and skipped.

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc::Sender;

use super::backend::{ChatBackend, ChatRequest, TransportError};
use super::types::{Message, Part, Role, StreamEvent};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize, Debug)]
struct WireRequest<'a> {
    id: &'a str,
    messages: Vec<WireMessage<'a>>,
    trigger: &'static str,
}

#[derive(Serialize, Debug)]
struct WireMessage<'a> {
    id: &'a str,
    role: Role,
    parts: Vec<Value>,
}

/// One decoded `data:` payload.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum WireChunk {
    Start {
        #[serde(rename = "messageId", default)]
        message_id: Option<String>,
    },
    TextStart {},
    TextDelta {
        delta: String,
    },
    ToolInputAvailable {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(rename = "toolName")]
        tool_name: String,
    },
    ToolOutputAvailable {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        #[serde(default)]
        output: Value,
    },
    Error {
        #[serde(rename = "errorText")]
        error_text: String,
    },
    Finish {},
    #[serde(other)]
    Other,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn part_to_wire(part: &Part) -> Option<Value> {
    match part {
        Part::Text { text } => Some(json!({ "type": "text", "text": text })),
        Part::ToolResult {
            call_id,
            name,
            output: Some(output),
        } if !name.is_empty() => Some(json!({
            "type": format!("tool-{name}"),
            "toolCallId": call_id,
            "state": "output-available",
            "input": {},
            "output": output,
        })),
        _ => None,
    }
}

fn message_to_wire(message: &Message) -> WireMessage<'_> {
    WireMessage {
        id: &message.id,
        role: message.role,
        parts: message.parts.iter().filter_map(part_to_wire).collect(),
    }
}

/// What to do after one SSE line.
#[derive(Debug, PartialEq)]
enum LineOutcome {
    Continue,
    Event(StreamEvent),
    Done,
    Failed(String),
}

fn parse_line(line: &str) -> Result<LineOutcome, TransportError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(LineOutcome::Continue);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(LineOutcome::Continue);
    }
    if data == "[DONE]" {
        return Ok(LineOutcome::Done);
    }

    let chunk: WireChunk =
        serde_json::from_str(data).map_err(|e| TransportError::Parse(e.to_string()))?;
    let outcome = match chunk {
        WireChunk::Start { message_id } => LineOutcome::Event(StreamEvent::Start { message_id }),
        WireChunk::TextStart {} => LineOutcome::Event(StreamEvent::TextStart),
        WireChunk::TextDelta { delta } if delta.is_empty() => LineOutcome::Continue,
        WireChunk::TextDelta { delta } => LineOutcome::Event(StreamEvent::TextDelta(delta)),
        WireChunk::ToolInputAvailable {
            tool_call_id,
            tool_name,
        } => LineOutcome::Event(StreamEvent::ToolInput {
            call_id: tool_call_id,
            name: tool_name,
        }),
        WireChunk::ToolOutputAvailable {
            tool_call_id,
            output,
        } => LineOutcome::Event(StreamEvent::ToolOutput {
            call_id: tool_call_id,
            output,
        }),
        WireChunk::Error { error_text } => LineOutcome::Failed(error_text),
        WireChunk::Finish {} => LineOutcome::Continue,
        WireChunk::Other => {
            debug!("Skipping chunk: {data}");
            LineOutcome::Continue
        }
    };
    Ok(outcome)
}

/// Raw response bytes waiting for their newline. Decoding happens per
/// complete line so a character split across network reads stays intact.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<Result<String, TransportError>> {
        let end = self.bytes.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(
            String::from_utf8(line)
                .map_err(|e| TransportError::Parse(format!("invalid UTF-8 in stream: {e}"))),
        )
    }
}

// ============================================================================
// Backend Implementation
// ============================================================================

pub struct HttpBackend {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, api_path: &str) -> Self {
        let endpoint = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            api_path.trim_start_matches('/')
        );
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn stream_chat(
        &self,
        request: ChatRequest<'_>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), TransportError> {
        let body = WireRequest {
            id: request.chat_id,
            messages: request.messages.iter().map(message_to_wire).collect(),
            trigger: "submit-message",
        };
        info!(
            "POST {} ({} messages)",
            self.endpoint,
            body.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    TransportError::Config(e.to_string())
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Chat endpoint error: {status} - {message}");
            return Err(TransportError::Api { status, message });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = LineBuffer::default();
        let mut event_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransportError::Network(e.to_string()))?;
            buffer.push(&chunk);

            while let Some(line) = buffer.next_line() {
                match parse_line(line?.trim())? {
                    LineOutcome::Continue => {}
                    LineOutcome::Event(event) => {
                        event_count += 1;
                        if sender.send(event).await.is_err() {
                            warn!("Stream event send failed: receiver dropped");
                            return Err(TransportError::ChannelClosed);
                        }
                    }
                    LineOutcome::Done => {
                        info!("Stream complete: {event_count} events");
                        return Ok(());
                    }
                    LineOutcome::Failed(text) => return Err(TransportError::Remote(text)),
                }
            }
        }

        info!("Stream ended without [DONE]: {event_count} events");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let backend = HttpBackend::new("http://localhost:8081/", "/api/chat");
        assert_eq!(backend.endpoint(), "http://localhost:8081/api/chat");
        let backend = HttpBackend::new("http://localhost:8081", "api/chat");
        assert_eq!(backend.endpoint(), "http://localhost:8081/api/chat");
    }

    #[test]
    fn test_parse_text_delta() {
        let outcome = parse_line(r#"data: {"type":"text-delta","id":"t1","delta":"Hi"}"#).unwrap();
        assert_eq!(outcome, LineOutcome::Event(StreamEvent::TextDelta("Hi".into())));
    }

    #[test]
    fn test_parse_done_and_blank_lines() {
        assert_eq!(parse_line("data: [DONE]").unwrap(), LineOutcome::Done);
        assert_eq!(parse_line("").unwrap(), LineOutcome::Continue);
        assert_eq!(parse_line(": keep-alive").unwrap(), LineOutcome::Continue);
    }

    #[test]
    fn test_parse_tool_output() {
        let line = r#"data: {"type":"tool-output-available","toolCallId":"call_1","output":{"location":"Belgrade","temperature":21}}"#;
        match parse_line(line).unwrap() {
            LineOutcome::Event(StreamEvent::ToolOutput { call_id, output }) => {
                assert_eq!(call_id, "call_1");
                assert_eq!(output["temperature"], 21);
            }
            other => panic!("Expected ToolOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_chunk() {
        let outcome = parse_line(r#"data: {"type":"error","errorText":"rate limited"}"#).unwrap();
        assert_eq!(outcome, LineOutcome::Failed("rate limited".into()));
    }

    #[test]
    fn test_unknown_chunk_types_are_skipped() {
        let outcome = parse_line(r#"data: {"type":"reasoning-delta","delta":"hmm"}"#).unwrap();
        assert_eq!(outcome, LineOutcome::Continue);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_line("data: {not json"),
            Err(TransportError::Parse(_))
        ));
    }

    #[test]
    fn test_line_buffer_keeps_split_multibyte_char() {
        let line = "data: {\"type\":\"text-delta\",\"id\":\"t1\",\"delta\":\"21°F in Niš\"}\n";
        let bytes = line.as_bytes();
        // Split right after the first byte of '°' (0xC2)
        let split = line.find('°').unwrap() + 1;
        assert_eq!(bytes[split - 1], 0xC2);

        let mut buffer = LineBuffer::default();
        buffer.push(&bytes[..split]);
        assert!(buffer.next_line().is_none());
        buffer.push(&bytes[split..]);

        let decoded = buffer.next_line().unwrap().unwrap();
        assert_eq!(
            parse_line(decoded.trim()).unwrap(),
            LineOutcome::Event(StreamEvent::TextDelta("21°F in Niš".into()))
        );
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_line_buffer_rejects_invalid_utf8() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"data: \xff\xfe\n");
        assert!(matches!(
            buffer.next_line(),
            Some(Err(TransportError::Parse(_)))
        ));
    }

    #[test]
    fn test_message_to_wire_skips_unknown_parts() {
        let msg = Message::new(
            "m1",
            Role::Assistant,
            vec![
                Part::text("hello"),
                Part::Unknown,
                Part::weather("Belgrade", Some(21.0)),
            ],
        );
        let wire = message_to_wire(&msg);
        assert_eq!(wire.parts.len(), 2);
        assert_eq!(wire.parts[0]["type"], "text");
        assert_eq!(wire.parts[1]["type"], "tool-weather");
        assert_eq!(wire.parts[1]["output"]["location"], "Belgrade");
    }
}
