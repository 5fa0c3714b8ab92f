//! # InputBar Component
//!
//! Draft editor plus the primary action button.
//!
//! ## Responsibilities
//!
//! - Capture text input while the chat is `Ready`
//! - Handle editing (backspace, delete, cursor movement, paste)
//! - Submit the raw draft on Enter or button click
//! - Swap the button to `Stop` while a response is in flight
//!
//! ## State Management
//!
//! The draft and cursor are internal state. The request status is a prop
//! refreshed by the parent before every render and event.

mod editing;

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::transport::RequestStatus;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use editing::{
    LEFT_INSET, MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, cursor_row_col, line_count, line_end,
    line_start, next_char_boundary, prev_char_boundary, wrap_options,
};

pub const PLACEHOLDER: &str = "Enter location to get the weather for";

/// High-level events emitted by the InputBar
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The draft was submitted; carries the raw text
    Submit(String),
    /// The user asked to stop the in-flight response
    Stop,
    ContentChanged,
}

/// What the primary button currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryButton {
    Ok { enabled: bool },
    Stop,
}

impl PrimaryButton {
    pub fn for_state(status: RequestStatus, draft: &str) -> Self {
        if status.in_flight() {
            return PrimaryButton::Stop;
        }
        PrimaryButton::Ok {
            enabled: status == RequestStatus::Ready && !draft.trim().is_empty(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrimaryButton::Ok { .. } => "[ Ok ]",
            PrimaryButton::Stop => "[ Stop ]",
        }
    }

    pub fn enabled(self) -> bool {
        match self {
            PrimaryButton::Ok { enabled } => enabled,
            PrimaryButton::Stop => true,
        }
    }

    fn width(self) -> u16 {
        self.label().width() as u16
    }
}

/// Draft editor with an Ok/Stop button on its right edge.
pub struct InputBar {
    pub draft: String,
    /// Request status (Prop)
    pub status: RequestStatus,
    /// Whether keystrokes go to the draft (Input mode)
    pub focused: bool,
    /// Cursor byte offset into `draft`
    cursor: usize,
    scroll_offset: u16,
    /// Where the button was last drawn, for click hit testing
    button_area: Rect,
}

impl Default for InputBar {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBar {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
            status: RequestStatus::Ready,
            focused: true,
            cursor: 0,
            scroll_offset: 0,
            button_area: Rect::default(),
        }
    }

    pub fn editable(&self) -> bool {
        self.status == RequestStatus::Ready
    }

    pub fn button(&self) -> PrimaryButton {
        PrimaryButton::for_state(self.status, &self.draft)
    }

    /// Replace the draft, cursor at the end.
    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
        self.cursor = self.draft.len();
        self.scroll_offset = 0;
    }

    /// Takes the draft if it has content. Only possible while `Ready`.
    pub fn submit(&mut self) -> Option<InputEvent> {
        if !self.editable() || self.draft.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.draft);
        self.cursor = 0;
        self.scroll_offset = 0;
        Some(InputEvent::Submit(text))
    }

    /// Height for the current draft at `width`, clamped to the visible line limit.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let lines = line_count(&self.draft, self.text_width(width));
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Click at screen position. Only the button reacts.
    pub fn click(&mut self, column: u16, row: u16) -> Option<InputEvent> {
        if !self.button_area.contains(Position { x: column, y: row }) {
            return None;
        }
        match self.button() {
            PrimaryButton::Stop => Some(InputEvent::Stop),
            PrimaryButton::Ok { enabled: true } => self.submit(),
            PrimaryButton::Ok { enabled: false } => None,
        }
    }

    fn text_width(&self, width: u16) -> u16 {
        // left inset, gap before the button, button, right border
        width.saturating_sub(LEFT_INSET + 1 + self.button().width() + 1)
    }

    fn update_scroll_offset(&mut self, width: u16) {
        if line_count(&self.draft, width) <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }
        let (row, _) = cursor_row_col(&self.draft, self.cursor, width);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }

    fn visible_text(&self, width: u16) -> String {
        if self.scroll_offset == 0 || width == 0 {
            return self.draft.clone();
        }
        let lines = textwrap::wrap(&self.draft, wrap_options(width));
        let start = (self.scroll_offset as usize).min(lines.len());
        let end = (start + MAX_VISIBLE_LINES as usize).min(lines.len());
        lines[start..end].join("\n")
    }

    fn edit(&mut self, event: &TuiEvent) -> bool {
        let text = &self.draft;
        let pos = self.cursor;
        match event {
            TuiEvent::InputChar(c) => {
                self.draft.insert(pos, *c);
                self.cursor += c.len_utf8();
            }
            TuiEvent::Paste(pasted) => {
                self.draft.insert_str(pos, pasted);
                self.cursor += pasted.len();
            }
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(text, pos);
                self.draft.drain(prev..pos);
                self.cursor = prev;
            }
            TuiEvent::Delete if pos < text.len() => {
                let next = next_char_boundary(text, pos);
                self.draft.drain(pos..next);
            }
            TuiEvent::Left if pos > 0 => self.cursor = prev_char_boundary(text, pos),
            TuiEvent::Right if pos < text.len() => self.cursor = next_char_boundary(text, pos),
            TuiEvent::Home if line_start(text, pos) != pos => self.cursor = line_start(text, pos),
            TuiEvent::End if line_end(text, pos) != pos => self.cursor = line_end(text, pos),
            _ => return false,
        }
        true
    }
}

impl Component for InputBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let button = self.button();
        let text_width = self.text_width(area.width);
        self.update_scroll_offset(text_width);

        let border_color = if self.focused && self.editable() {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .padding(Padding::left(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_area = Rect {
            width: text_width.min(inner.width),
            ..inner
        };
        let body = if self.draft.is_empty() {
            Paragraph::new(Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        } else {
            let style = if self.editable() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Paragraph::new(self.visible_text(text_width)).style(style)
        };
        frame.render_widget(body, text_area);

        let button_style = match button {
            PrimaryButton::Stop => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            PrimaryButton::Ok { enabled: true } => {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            }
            PrimaryButton::Ok { enabled: false } => Style::default().fg(Color::DarkGray),
        };
        self.button_area = Rect {
            x: (inner.x + inner.width).saturating_sub(button.width()),
            y: inner.y,
            width: button.width().min(inner.width),
            height: 1.min(inner.height),
        };
        frame.render_widget(
            Line::from(Span::styled(button.label(), button_style)),
            self.button_area,
        );

        if self.focused && self.editable() {
            let (row, col) = cursor_row_col(&self.draft, self.cursor, text_width);
            let visible_row = row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((text_area.x + col, text_area.y + visible_row));
        }
    }
}

impl EventHandler for InputBar {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => self.submit(),
            TuiEvent::Click(column, row) => self.click(*column, *row),
            _ if !self.editable() => None,
            _ => self.edit(event).then_some(InputEvent::ContentChanged),
        }
    }
}
