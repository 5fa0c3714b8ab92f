//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates terminal events into `core::Action` values and executes the
//! effects the core hands back.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (request in flight, transcript gliding): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms, redraws only on events, snapshots or resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
mod components;
mod effects;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::{Position, Rect};

use crate::core::action::{Action, update};
use crate::core::config::ResolvedConfig;
use crate::core::feedback::ActionCallbacks;
use crate::core::state::App;
use crate::platform::{TerminalBell, TerminalClipboard};
use crate::transport::{ChatSession, ChatTransport, HttpBackend, RequestStatus};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBar, InputEvent, SuggestionEvent, SuggestionsState, Target, TranscriptState,
};
use crate::tui::effects::EffectRunner;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

pub use effects::schedule_copy_reset;

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Navigate messages with arrow keys and act on the selection
    /// (c/l/d/u). Typing anything else switches to Input.
    Cursor,
    /// Text editing in the input bar. Esc switches to Cursor.
    Input,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub transcript: TranscriptState,
    pub input_bar: InputBar,
    pub suggestions: SuggestionsState,
    pub input_mode: InputMode,
    /// Regions from the last draw, for mouse hit testing
    pub regions: ui::Regions,
}

impl TuiState {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            transcript: TranscriptState::new(),
            input_bar: InputBar::new(),
            suggestions: SuggestionsState::new(suggestions),
            input_mode: InputMode::Input, // User expects to type immediately
            regions: ui::Regions::default(),
        }
    }

    fn chips_visible(&self, app: &App) -> bool {
        app.messages().is_empty()
            && app.snapshot.error.is_none()
            && self.input_bar.draft.is_empty()
            && !self.suggestions.items.is_empty()
    }

    fn selected_id(&self, app: &App) -> Option<String> {
        let index = self.transcript.selected_index?;
        app.messages().get(index).map(|m| m.id.clone())
    }
}

/// Translates one terminal event into core actions, updating TUI-local
/// state along the way.
pub fn handle_event(app: &App, tui: &mut TuiState, event: TuiEvent) -> Vec<Action> {
    tui.input_bar.status = app.status();
    let len = app.messages().len();

    match event {
        TuiEvent::Quit => return vec![Action::Quit],
        TuiEvent::Resize => return vec![],
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::PageUp | TuiEvent::PageDown => {
            tui.transcript.handle_event(&event);
            return vec![];
        }
        TuiEvent::ScrollLeft | TuiEvent::ScrollRight => {
            tui.suggestions.handle_event(&event);
            return vec![];
        }
        TuiEvent::MouseMove(column, row) => {
            if let Some((index, _)) = transcript_hit(app, tui, column, row) {
                tui.transcript.selected_index = Some(index);
            }
            return vec![];
        }
        TuiEvent::Click(column, row) => return click(app, tui, column, row),
        // Esc stops a response in flight or dismisses an error
        TuiEvent::Escape if app.status() != RequestStatus::Ready => return vec![Action::Stop],
        TuiEvent::FocusNext | TuiEvent::FocusPrev => {
            if tui.chips_visible(app) {
                tui.suggestions.handle_event(&event);
            }
            return vec![];
        }
        TuiEvent::Submit if tui.chips_visible(app) && tui.suggestions.focused.is_some() => {
            return match tui.suggestions.handle_event(&event) {
                Some(SuggestionEvent::Select(text)) => select_suggestion(tui, &text),
                None => vec![],
            };
        }
        _ => {}
    }

    match tui.input_mode {
        InputMode::Input => match event {
            TuiEvent::Escape => {
                tui.input_mode = InputMode::Cursor;
                tui.transcript.selected_index = len.checked_sub(1);
                vec![]
            }
            TuiEvent::Up => {
                tui.transcript.handle_event(&TuiEvent::ScrollUp);
                vec![]
            }
            TuiEvent::Down => {
                tui.transcript.handle_event(&TuiEvent::ScrollDown);
                vec![]
            }
            _ => {
                tui.suggestions.clear_focus();
                input_actions(tui.input_bar.handle_event(&event))
            }
        },
        InputMode::Cursor => match event {
            TuiEvent::Up => {
                tui.transcript.select_previous(len);
                vec![]
            }
            TuiEvent::Down => {
                tui.transcript.select_next(len);
                vec![]
            }
            TuiEvent::InputChar('q') => vec![Action::Quit],
            TuiEvent::InputChar(c @ ('c' | 'l' | 'd' | 'u')) => {
                let Some(id) = tui.selected_id(app) else {
                    return vec![];
                };
                vec![match c {
                    'c' => Action::Copy(id),
                    'l' => Action::Like(id),
                    'd' => Action::Dislike(id),
                    _ => Action::ToggleUnit(id),
                }]
            }
            // Typing switches to Input mode and forwards the event
            TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
                enter_input_mode(tui);
                input_actions(tui.input_bar.handle_event(&event))
            }
            TuiEvent::Submit => {
                enter_input_mode(tui);
                vec![]
            }
            _ => vec![],
        },
    }
}

fn enter_input_mode(tui: &mut TuiState) {
    tui.input_mode = InputMode::Input;
    tui.transcript.selected_index = None;
}

fn input_actions(event: Option<InputEvent>) -> Vec<Action> {
    match event {
        Some(InputEvent::Submit(text)) => vec![Action::Submit(text)],
        Some(InputEvent::Stop) => vec![Action::Stop],
        Some(InputEvent::ContentChanged) | None => vec![],
    }
}

/// A chip goes through the draft so it takes the same path as typed text.
fn select_suggestion(tui: &mut TuiState, text: &str) -> Vec<Action> {
    tui.suggestions.clear_focus();
    tui.input_bar.set_draft(text);
    input_actions(tui.input_bar.submit())
}

fn transcript_hit(
    app: &App,
    tui: &TuiState,
    column: u16,
    row: u16,
) -> Option<(usize, Option<Target>)> {
    if app.snapshot.error.is_some() {
        return None;
    }
    tui.transcript
        .hit_test(tui.regions.transcript, column, row, app.messages(), &app.views)
}

fn click(app: &App, tui: &mut TuiState, column: u16, row: u16) -> Vec<Action> {
    let position = Position { x: column, y: row };
    let event = TuiEvent::Click(column, row);

    if tui.regions.input.contains(position) {
        enter_input_mode(tui);
        return input_actions(tui.input_bar.handle_event(&event));
    }
    if tui.regions.suggestions.is_some_and(|r: Rect| r.contains(position)) {
        return match tui.suggestions.handle_event(&event) {
            Some(SuggestionEvent::Select(text)) => select_suggestion(tui, &text),
            None => vec![],
        };
    }

    let Some((index, target)) = transcript_hit(app, tui, column, row) else {
        return vec![];
    };
    tui.transcript.selected_index = Some(index);
    let (Some(target), Some(message)) = (target, app.messages().get(index)) else {
        return vec![];
    };
    let id = message.id.clone();
    vec![match target {
        Target::Copy => Action::Copy(id),
        Target::Like => Action::Like(id),
        Target::Dislike => Action::Dislike(id),
        Target::SwitchUnit => Action::ToggleUnit(id),
    }]
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals that
        // don't speak it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Feedback hooks installed by the binary. They only log.
fn logging_callbacks() -> ActionCallbacks {
    ActionCallbacks {
        on_copy: Some(Box::new(|id: &str| info!("Feedback: copied message {}", id))),
        on_like: Some(Box::new(|id: &str| info!("Feedback: liked message {}", id))),
        on_dislike: Some(Box::new(|id: &str| info!("Feedback: disliked message {}", id))),
    }
}

/// Runs the chat screen until the user quits. Must be called inside a tokio
/// runtime; the backend stream and timers are spawned onto it.
pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = HttpBackend::new(&config.base_url, &config.api_path);
    info!("Chat endpoint: {}", backend.endpoint());
    let session: Arc<dyn ChatTransport> = Arc::new(ChatSession::new(backend));

    let mut app = App::from_config(&config);
    app.callbacks = logging_callbacks();
    let mut tui = TuiState::new(config.suggestions.clone());

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let snapshot_tx = tx.clone();
    session.subscribe(Box::new(move |snapshot| {
        if snapshot_tx.send(Action::Snapshot(snapshot)).is_err() {
            debug!("Snapshot dropped: event loop gone");
        }
    }));

    let mut runner = EffectRunner::new(
        session,
        Arc::new(TerminalClipboard),
        Arc::new(TerminalBell::new(config.haptics)),
        tx,
    );

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        let animating = app.status().in_flight() || tui.transcript.gliding;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in handle_event(&app, &mut tui, event) {
                debug!("Event loop dispatching: {:?}", action);
                if runner.run_all(update(&mut app, action)) {
                    break 'main;
                }
            }
        }

        // Snapshots and timer callbacks from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if runner.run_all(update(&mut app, action)) {
                break 'main;
            }
        }
    }

    runner.shutdown();
    ratatui::restore();
    info!("Weather Today shutting down");
    Ok(())
}
