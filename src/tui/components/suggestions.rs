//! # Suggestions Component
//!
//! A single, horizontally scrollable row of prompt chips shown while the
//! transcript and draft are both empty. Selecting a chip submits its text.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const CHIP_GAP: u16 = 2;
const SCROLL_STEP: u16 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEvent {
    Select(String),
}

fn chip_label(text: &str) -> String {
    format!("[ {text} ]")
}

/// Column ranges of each chip on the unscrolled row.
pub fn chip_spans(items: &[String]) -> Vec<Range<u16>> {
    let mut x = 0u16;
    items
        .iter()
        .map(|item| {
            let width = chip_label(item).width() as u16;
            let span = x..x.saturating_add(width);
            x = span.end.saturating_add(CHIP_GAP);
            span
        })
        .collect()
}

/// Focus and horizontal scroll of the chip row.
#[derive(Debug, Default)]
pub struct SuggestionsState {
    pub items: Vec<String>,
    pub focused: Option<usize>,
    pub offset: u16,
    area: Rect,
}

impl SuggestionsState {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    fn row_width(&self) -> u16 {
        chip_spans(&self.items).last().map_or(0, |s| s.end)
    }

    fn max_offset(&self) -> u16 {
        self.row_width().saturating_sub(self.area.width)
    }

    fn scroll_into_view(&mut self, index: usize) {
        let Some(span) = chip_spans(&self.items).get(index).cloned() else {
            return;
        };
        if span.start < self.offset {
            self.offset = span.start;
        } else if span.end > self.offset + self.area.width {
            self.offset = span.end.saturating_sub(self.area.width);
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let next = match (self.focused, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.focused = Some(next);
        self.scroll_into_view(next);
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Chip under a screen position, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area.contains(Position { x: column, y: row }) {
            return None;
        }
        let x = column - self.area.x + self.offset;
        chip_spans(&self.items).iter().position(|s| s.contains(&x))
    }

    fn select(&self, index: usize) -> Option<SuggestionEvent> {
        self.items
            .get(index)
            .map(|text| SuggestionEvent::Select(text.clone()))
    }
}

impl EventHandler for SuggestionsState {
    type Event = SuggestionEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::FocusNext => self.cycle_focus(true),
            TuiEvent::FocusPrev => self.cycle_focus(false),
            TuiEvent::ScrollLeft => self.offset = self.offset.saturating_sub(SCROLL_STEP),
            TuiEvent::ScrollRight => {
                self.offset = (self.offset + SCROLL_STEP).min(self.max_offset());
            }
            TuiEvent::Submit => return self.focused.and_then(|i| self.select(i)),
            TuiEvent::Click(column, row) => {
                return self.hit_test(*column, *row).and_then(|i| self.select(i));
            }
            _ => {}
        }
        None
    }
}

/// Chip row component.
pub struct Suggestions<'a> {
    pub state: &'a mut SuggestionsState,
}

impl<'a> Suggestions<'a> {
    pub fn new(state: &'a mut SuggestionsState) -> Self {
        Self { state }
    }
}

impl Component for Suggestions<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.area = area;
        self.state.offset = self.state.offset.min(self.state.max_offset());

        let mut spans = Vec::new();
        for (index, item) in self.state.items.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw(" ".repeat(CHIP_GAP as usize)));
            }
            let style = if self.state.focused == Some(index) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };
            spans.push(Span::styled(chip_label(item), style));
        }

        let row = Paragraph::new(Line::from(spans)).scroll((0, self.state.offset));
        frame.render_widget(row, area);
    }
}
