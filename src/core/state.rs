//! # Application State
//!
//! Core state for the weather chat. Domain logic only: no TUI types.
//! Presentation state (scroll position, draft, focus) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── snapshot: ChatSnapshot        // latest transcript + status from the transport
//! ├── views: ViewStates             // per-message unit / copied / feedback, by id
//! ├── suggestions: Vec<String>      // chips offered on an empty transcript
//! ├── notice: Option<Notice>        // transient confirmation ("Copied: ...")
//! ├── callbacks: ActionCallbacks    // optional hooks for copy / like / dislike
//! └── haptics: bool                 // whether haptic effects are emitted
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::config::ResolvedConfig;
use crate::core::feedback::ActionCallbacks;
use crate::core::view_state::ViewStates;
use crate::transport::{ChatSnapshot, Message, RequestStatus};

/// A confirmation shown in the title bar, owned by the message that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message_id: String,
    pub text: String,
}

pub struct App {
    pub snapshot: ChatSnapshot,
    pub views: ViewStates,
    pub suggestions: Vec<String>,
    pub notice: Option<Notice>,
    pub callbacks: ActionCallbacks,
    pub haptics: bool,
}

impl App {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            snapshot: ChatSnapshot::default(),
            views: ViewStates::new(),
            suggestions,
            notice: None,
            callbacks: ActionCallbacks::default(),
            haptics: true,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        let mut app = Self::new(config.suggestions.clone());
        app.haptics = config.haptics;
        app
    }

    pub fn messages(&self) -> &[Message] {
        &self.snapshot.messages
    }

    pub fn status(&self) -> RequestStatus {
        self.snapshot.status
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.snapshot.messages.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_from_config() {
        let config = ResolvedConfig {
            haptics: false,
            ..Default::default()
        };
        let app = App::from_config(&config);
        assert!(!app.haptics);
        assert_eq!(app.suggestions.len(), 2);
        assert_eq!(app.status(), RequestStatus::Ready);
        assert!(app.messages().is_empty());
        assert!(app.notice.is_none());
    }
}
