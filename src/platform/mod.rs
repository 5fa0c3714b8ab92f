//! # Platform
//!
//! Side-effect sinks the TUI adapter executes effects against. Both are
//! best-effort: a failure is logged and the UI carries on.

pub mod clipboard;
pub mod haptics;

pub use clipboard::{Clipboard, ClipboardError, TerminalClipboard};
pub use haptics::{Haptics, TerminalBell};
