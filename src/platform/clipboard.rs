//! Clipboard access with two transports:
//! 1. OSC 52, the terminal clipboard escape sequence (works over SSH)
//! 2. The system clipboard via `arboard`
//!
//! Terminals never acknowledge OSC 52, so a successful write says nothing
//! about whether the text arrived. Both transports are always tried.

use std::fmt;
use std::io::Write;

use base64::Engine;
use log::debug;

/// Destination for copied text.
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug)]
pub enum ClipboardError {
    /// OSC 52 write failed.
    Osc52(String),
    /// System clipboard operation failed.
    System(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Writes through the controlling terminal and the system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        copy_with(text, copy_osc52, copy_system)
    }
}

/// Runs both transports. Fails only when neither accepted the text, and then
/// reports the system clipboard error.
fn copy_with(
    text: &str,
    osc52: impl FnOnce(&str) -> Result<(), ClipboardError>,
    system: impl FnOnce(&str) -> Result<(), ClipboardError>,
) -> Result<(), ClipboardError> {
    let terminal = osc52(text);
    if let Err(e) = &terminal {
        debug!("{e}");
    }
    match system(text) {
        Ok(()) => Ok(()),
        Err(e) if terminal.is_ok() => {
            debug!("{e}, relying on OSC 52");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// `ESC ] 52 ; c ; <base64> ESC \`, where `c` selects the system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    format!("\x1b]52;c;{encoded}\x1b\\")
}

fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| ClipboardError::Osc52(e.to_string()))
}

fn copy_system(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::System(e.to_string()))
}
