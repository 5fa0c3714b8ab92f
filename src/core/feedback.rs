//! Acknowledgement state behind the copy / like / dislike controls.

use std::time::Duration;

/// How long the copy control shows its confirmation before reverting.
pub const COPY_RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    None,
    Good,
    Bad,
}

/// Which controls the panel currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleControls {
    pub copy: bool,
    pub like: bool,
    pub dislike: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFeedback {
    pub copied: bool,
    pub feedback: Feedback,
}

impl ActionFeedback {
    pub const fn new() -> Self {
        Self {
            copied: false,
            feedback: Feedback::None,
        }
    }

    pub fn mark_copied(&mut self) {
        self.copied = true;
    }

    pub fn reset_copied(&mut self) {
        self.copied = false;
    }

    /// Records a thumbs-up. Refused once the thumbs-down is chosen, since that
    /// control is no longer on screen.
    pub fn like(&mut self) -> bool {
        if self.feedback == Feedback::Bad {
            return false;
        }
        self.feedback = Feedback::Good;
        true
    }

    pub fn dislike(&mut self) -> bool {
        if self.feedback == Feedback::Good {
            return false;
        }
        self.feedback = Feedback::Bad;
        true
    }

    pub fn controls(&self) -> VisibleControls {
        VisibleControls {
            copy: true,
            like: self.feedback != Feedback::Bad,
            dislike: self.feedback != Feedback::Good,
        }
    }
}

type Hook = Box<dyn Fn(&str) + Send>;

/// Optional hooks run after the local state of an action has changed.
/// Each receives the message id.
#[derive(Default)]
pub struct ActionCallbacks {
    pub on_copy: Option<Hook>,
    pub on_like: Option<Hook>,
    pub on_dislike: Option<Hook>,
}

impl ActionCallbacks {
    pub fn copied(&self, message_id: &str) {
        if let Some(hook) = &self.on_copy {
            hook(message_id);
        }
    }

    pub fn liked(&self, message_id: &str) {
        if let Some(hook) = &self.on_like {
            hook(message_id);
        }
    }

    pub fn disliked(&self, message_id: &str) {
        if let Some(hook) = &self.on_dislike {
            hook(message_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_no_feedback_shows_both() {
        let state = ActionFeedback::new();
        assert_eq!(
            state.controls(),
            VisibleControls {
                copy: true,
                like: true,
                dislike: true
            }
        );
    }

    #[test]
    fn test_good_hides_dislike() {
        let mut state = ActionFeedback::new();
        assert!(state.like());
        let controls = state.controls();
        assert!(controls.like);
        assert!(!controls.dislike);
    }

    #[test]
    fn test_bad_hides_like() {
        let mut state = ActionFeedback::new();
        assert!(state.dislike());
        let controls = state.controls();
        assert!(!controls.like);
        assert!(controls.dislike);
    }

    #[test]
    fn test_feedback_is_not_reversible() {
        let mut state = ActionFeedback::new();
        state.like();
        assert!(!state.dislike());
        assert_eq!(state.feedback, Feedback::Good);
        // Pressing the chosen control again keeps it
        assert!(state.like());
        assert_eq!(state.feedback, Feedback::Good);
    }

    #[test]
    fn test_copied_flag() {
        let mut state = ActionFeedback::new();
        state.mark_copied();
        assert!(state.copied);
        state.reset_copied();
        assert!(!state.copied);
    }

    #[test]
    fn test_callbacks_fire_with_message_id() {
        let count = Arc::new(AtomicUsize::new(0));
        let hook_count = count.clone();
        let callbacks = ActionCallbacks {
            on_like: Some(Box::new(move |id: &str| {
                assert_eq!(id, "m1");
                hook_count.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };
        callbacks.liked("m1");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_callbacks_are_noops() {
        let callbacks = ActionCallbacks::default();
        callbacks.copied("m1");
        callbacks.liked("m1");
        callbacks.disliked("m1");
    }
}
