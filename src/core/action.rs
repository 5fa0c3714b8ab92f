//! # Actions
//!
//! Everything that can happen in the app becomes an `Action`.
//! User presses Enter? That's `Action::Submit(draft)`.
//! The transport publishes a new transcript? That's `Action::Snapshot(snapshot)`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns the side effects the adapter must perform. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Vec<Effect>
//! ```

use log::debug;

use crate::core::state::{App, Notice};
use crate::transport::{ChatSnapshot, RequestStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The transport published a new transcript / status.
    Snapshot(ChatSnapshot),
    /// Send the draft. Carries the raw, untrimmed text.
    Submit(String),
    /// Stop the in-flight response, or dismiss an error.
    Stop,
    ToggleUnit(String),
    Copy(String),
    /// The copy confirmation for this message id has timed out.
    CopyReset(String),
    Like(String),
    Dislike(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    SoftImpact,
    Success,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendMessage(String),
    StopGeneration,
    CopyToClipboard(String),
    /// Deliver `Action::CopyReset(id)` once the confirmation delay has passed.
    ScheduleCopyReset(String),
    Haptic(HapticKind),
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Snapshot(snapshot) => apply_snapshot(app, snapshot),
        Action::Submit(text) => {
            if text.trim().is_empty() || app.status() != RequestStatus::Ready {
                return vec![];
            }
            vec![Effect::SendMessage(text)]
        }
        Action::Stop => match app.status() {
            RequestStatus::Submitted | RequestStatus::Streaming | RequestStatus::Error => {
                vec![Effect::StopGeneration]
            }
            RequestStatus::Ready => vec![],
        },
        Action::ToggleUnit(id) => {
            let toggled = app
                .views
                .get_mut(&id)
                .is_some_and(|view| view.temperature.toggle_unit());
            if toggled && app.haptics {
                vec![Effect::Haptic(HapticKind::SoftImpact)]
            } else {
                vec![]
            }
        }
        Action::Copy(id) => copy(app, id),
        Action::CopyReset(id) => {
            // The message may be gone by the time the timer fires
            let Some(view) = app.views.get_mut(&id) else {
                return vec![];
            };
            view.actions.reset_copied();
            if app.notice.as_ref().is_some_and(|n| n.message_id == id) {
                app.notice = None;
            }
            vec![]
        }
        Action::Like(id) => {
            if app.views.get_mut(&id).is_some_and(|view| view.actions.like()) {
                app.callbacks.liked(&id);
            }
            vec![]
        }
        Action::Dislike(id) => {
            if app.views.get_mut(&id).is_some_and(|view| view.actions.dislike()) {
                app.callbacks.disliked(&id);
            }
            vec![]
        }
        Action::Quit => vec![Effect::Quit],
    }
}

fn apply_snapshot(app: &mut App, snapshot: ChatSnapshot) -> Vec<Effect> {
    let previous = app.snapshot.status;
    if previous != snapshot.status {
        debug!("Status {} -> {}", previous.label(), snapshot.status.label());
    }
    app.snapshot = snapshot;
    app.views.sync(&app.snapshot.messages);

    let orphaned = app
        .notice
        .as_ref()
        .is_some_and(|notice| app.views.get(&notice.message_id).is_none());
    if orphaned {
        app.notice = None;
    }

    let finished = previous.in_flight()
        && app.snapshot.status == RequestStatus::Ready
        && !app.snapshot.messages.is_empty();
    if finished && app.haptics {
        vec![Effect::Haptic(HapticKind::Success)]
    } else {
        vec![]
    }
}

fn copy(app: &mut App, id: String) -> Vec<Effect> {
    let Some(location) = app
        .message(&id)
        .and_then(|m| m.weather())
        .map(|w| w.location.clone())
    else {
        return vec![];
    };
    let Some(view) = app.views.get_mut(&id) else {
        return vec![];
    };

    let text = view.temperature.summary(&location);
    view.actions.mark_copied();
    app.notice = Some(Notice {
        message_id: id.clone(),
        text: format!("Copied: {text}"),
    });
    app.callbacks.copied(&id);

    vec![
        Effect::CopyToClipboard(text),
        Effect::ScheduleCopyReset(id),
    ]
}
