//! Per-message view state, keyed by message id.
//!
//! Entries are created the first time a message id shows up in a snapshot
//! and dropped as soon as the id is gone from the transcript. Anything that
//! arrives for a dropped id (a late copy-reset timer, say) finds nothing and
//! does nothing.

use std::collections::{HashMap, HashSet};

use crate::core::feedback::ActionFeedback;
use crate::core::temperature::TemperatureDisplay;
use crate::transport::Message;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MessageViewState {
    pub temperature: TemperatureDisplay,
    pub actions: ActionFeedback,
}

impl MessageViewState {
    pub const fn new() -> Self {
        Self {
            temperature: TemperatureDisplay::new(),
            actions: ActionFeedback::new(),
        }
    }
}

/// Stand-in for messages that have no entry yet.
pub static DETACHED: MessageViewState = MessageViewState::new();

#[derive(Debug, Default)]
pub struct ViewStates {
    states: HashMap<String, MessageViewState>,
}

impl ViewStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-derives view state from the latest transcript.
    pub fn sync(&mut self, messages: &[Message]) {
        for message in messages {
            let state = self.states.entry(message.id.clone()).or_default();
            if let Some(weather) = message.weather() {
                state.temperature.observe(weather.temperature);
            }
        }

        if self.states.len() > messages.len() {
            let live: HashSet<&str> = messages.iter().map(|m| m.id.as_str()).collect();
            self.states.retain(|id, _| live.contains(id.as_str()));
        }
    }

    pub fn get(&self, id: &str) -> Option<&MessageViewState> {
        self.states.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MessageViewState> {
        self.states.get_mut(id)
    }

    /// The entry for `id`, or the detached default.
    pub fn view(&self, id: &str) -> &MessageViewState {
        self.states.get(id).unwrap_or(&DETACHED)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
