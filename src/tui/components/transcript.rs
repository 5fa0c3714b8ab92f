//! # Transcript Component
//!
//! Scrollable, virtualized view of the conversation.
//!
//! ## Responsibilities
//!
//! - Measure message heights once and cache them (`LayoutCache`)
//! - Render only the visible window plus half a viewport of overscan
//! - Glide to the bottom once per transcript growth
//! - Show a spinner footer while the request is submitted but silent
//! - Hit testing for mouse clicks on messages and their controls
//!
//! ## Architecture
//!
//! `Transcript` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptState` (persistent state) plus the messages and their
//! view states (props). Items are reached through [`VirtualSource`] by index
//! only, so the component never walks the whole transcript while rendering.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::view_state::ViewStates;
use crate::transport::{Message, RequestStatus, Role};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::bubble::{Bubble, Target};
use crate::tui::event::TuiEvent;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FOOTER_HEIGHT: u16 = 1;

/// Index-addressed access to transcript items.
pub trait VirtualSource {
    fn item_count(&self) -> usize;
    fn item(&self, index: usize) -> Option<&Message>;
}

impl VirtualSource for [Message] {
    fn item_count(&self) -> usize {
        self.len()
    }

    fn item(&self, index: usize) -> Option<&Message> {
        self.get(index)
    }
}

/// Layout and scroll state for the transcript.
/// Must be persisted in the parent TuiState.
pub struct TranscriptState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, follow new content at the bottom
    pub stick_to_bottom: bool,
    /// Selected message index (Cursor mode or click)
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// True while gliding towards the bottom after the transcript grew
    pub gliding: bool,
    /// Scroll-to-end requests issued so far
    pub scroll_requests: usize,
    known_len: usize,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
            gliding: false,
            scroll_requests: 0,
            known_len: 0,
        }
    }

    /// Records the current message count. Growth issues exactly one
    /// scroll-to-end request; shrinking only drops a stale selection.
    pub fn sync_len(&mut self, len: usize) -> bool {
        let grew = len > self.known_len;
        if grew {
            self.scroll_requests += 1;
            self.stick_to_bottom = true;
            self.gliding = true;
        }
        if self.selected_index.is_some_and(|i| i >= len) {
            self.selected_index = None;
        }
        self.known_len = len;
        grew
    }

    fn max_offset(&self, footer: u16) -> u16 {
        self.layout
            .total_height()
            .saturating_add(footer)
            .saturating_sub(self.viewport_height)
    }

    fn set_y(&mut self, y: u16) {
        let x = self.scroll_state.offset().x;
        self.scroll_state.set_offset(Position { x, y });
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset(0);
        if self.scroll_state.offset().y > max_y {
            self.set_y(max_y);
        }
    }

    /// Moves one step towards the bottom. Each step covers half the remaining
    /// distance, so a jump settles within a handful of frames.
    fn follow_bottom(&mut self, footer: u16) {
        let target = self.max_offset(footer);
        let current = self.scroll_state.offset().y;
        if !self.gliding || current >= target {
            self.set_y(target);
            self.gliding = false;
            return;
        }
        let step = (target - current).div_ceil(2);
        self.set_y(current + step);
    }

    /// True when content sits below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        self.scroll_state.offset().y < self.max_offset(0)
    }

    /// Re-engage following once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset(0);
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.set_y(max_y);
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    pub fn scroll_to_selected(&mut self) {
        let Some(index) = self.selected_index else {
            return;
        };
        let Some(range) = self.layout.item_span(index) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;
        if range.start < offset_y {
            self.set_y(range.start);
            self.stick_to_bottom = false;
        } else if range.end > offset_y + self.viewport_height {
            let new_y = range.end.saturating_sub(self.viewport_height);
            self.set_y(new_y);
            self.stick_to_bottom = new_y >= self.max_offset(0);
        }
        self.gliding = false;
    }

    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => i.saturating_sub(1),
            None => len - 1,
        });
        self.scroll_to_selected();
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => (i + 1).min(len - 1),
            None => len - 1,
        });
        self.scroll_to_selected();
    }

    /// Maps a screen position inside `area` to the message under it and the
    /// control hit, if any.
    pub fn hit_test(
        &self,
        area: Rect,
        column: u16,
        row: u16,
        messages: &[Message],
        views: &ViewStates,
    ) -> Option<(usize, Option<Target>)> {
        if !area.contains(Position { x: column, y: row }) {
            return None;
        }
        let canvas_y = row - area.y + self.scroll_state.offset().y;
        let index = self.layout.index_at(canvas_y)?;
        let message = messages.item(index)?;
        let top = self.layout.item_span(index)?.start;

        let bubble = Bubble::new(message, views.view(&message.id), false);
        let target = bubble.hit_test(content_width(area), column - area.x, canvas_y - top);
        Some((index, target))
    }
}

fn content_width(area: Rect) -> u16 {
    area.width.saturating_sub(1) // scrollbar
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct Transcript<'a> {
    pub state: &'a mut TranscriptState,
    pub messages: &'a [Message],
    pub views: &'a ViewStates,
    pub status: RequestStatus,
    pub spinner_frame: usize,
}

impl<'a> Transcript<'a> {
    pub fn new(
        state: &'a mut TranscriptState,
        messages: &'a [Message],
        views: &'a ViewStates,
        status: RequestStatus,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            views,
            status,
            spinner_frame,
        }
    }

    pub fn shows_footer(status: RequestStatus) -> bool {
        status == RequestStatus::Submitted
    }
}

impl Component for Transcript<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = content_width(area);
        self.state.layout.measure(self.messages, width, Bubble::height);

        let footer = if Self::shows_footer(self.status) {
            FOOTER_HEIGHT
        } else {
            0
        };
        let total_height = self.state.layout.total_height();
        let canvas_height = total_height.saturating_add(footer);

        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            self.state.follow_bottom(footer);
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for index in visible {
            let (Some(message), Some(span)) =
                (self.messages.item(index), self.state.layout.item_span(index))
            else {
                continue;
            };
            let height = span.end - span.start;
            if height == 0 {
                continue;
            }
            let is_selected = self.state.selected_index == Some(index);
            let bubble = Bubble::new(message, self.views.view(&message.id), is_selected);
            scroll_view.render_widget(bubble, Rect::new(0, span.start, width, height));
        }

        if footer > 0 {
            let glyph = SPINNER[self.spinner_frame % SPINNER.len()];
            let line = Line::from(vec![
                Span::styled(format!("{glyph} "), Style::default().fg(Color::Cyan)),
                Span::styled(
                    "Thinking…",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]);
            scroll_view.render_widget(line, Rect::new(0, total_height, width, FOOTER_HEIGHT));
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `TranscriptState` because `Transcript` is rebuilt
/// every frame and can't hold scroll position.
impl EventHandler for TranscriptState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                self.gliding = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::PageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                self.gliding = false;
            }
            TuiEvent::PageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached per-item heights and their running sums.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            content_width: 0,
        }
    }

    /// How many leading heights are still valid for `source` at `width`.
    ///
    /// A trailing assistant message may still be growing, so it is always
    /// measured again. Everything before it is final.
    pub fn reusable_count<S: VirtualSource + ?Sized>(&self, source: &S, width: u16) -> usize {
        let count = source.item_count();
        if self.content_width != width || self.heights.is_empty() || count < self.heights.len() {
            return 0;
        }
        let cached = self.heights.len();
        let last_is_volatile = source
            .item(cached - 1)
            .is_some_and(|m| m.role == Role::Assistant);
        if last_is_volatile { cached - 1 } else { cached }
    }

    /// Brings the cache up to date, calling `height_of` only for items whose
    /// height is unknown or may have changed.
    pub fn measure<S, F>(&mut self, source: &S, width: u16, mut height_of: F)
    where
        S: VirtualSource + ?Sized,
        F: FnMut(&Message, u16) -> u16,
    {
        let reusable = self.reusable_count(source, width);
        self.heights.truncate(reusable);
        for index in reusable..source.item_count() {
            let height = source.item(index).map_or(0, |m| height_of(m, width));
            self.heights.push(height);
        }
        self.content_width = width;
        self.rebuild_prefix_heights();
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Canvas rows `start..end` occupied by item `index`.
    pub fn item_span(&self, index: usize) -> Option<std::ops::Range<u16>> {
        let end = *self.prefix_heights.get(index)?;
        let start = if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        };
        Some(start..end)
    }

    /// Index of the item covering canvas row `y`.
    pub fn index_at(&self, y: u16) -> Option<usize> {
        let index = self.prefix_heights.partition_point(|&end| end <= y);
        (index < self.prefix_heights.len()).then_some(index)
    }

    /// Items intersecting the viewport, padded by half a viewport each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Part;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::cell::Cell;

    /// Counts every item lookup.
    struct CountingSource<'a> {
        messages: &'a [Message],
        requests: Cell<usize>,
    }

    impl VirtualSource for CountingSource<'_> {
        fn item_count(&self) -> usize {
            self.messages.len()
        }

        fn item(&self, index: usize) -> Option<&Message> {
            self.requests.set(self.requests.get() + 1);
            self.messages.get(index)
        }
    }

    fn conversation(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Message::new(format!("u{i}"), Role::User, vec![Part::text("Belgrade")])
                } else {
                    Message::new(
                        format!("a{i}"),
                        Role::Assistant,
                        vec![Part::weather("Belgrade", Some(21.0))],
                    )
                }
            })
            .collect()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_fresh_cache_requests_each_item_once() {
        for n in [0, 1, 7, 40] {
            let messages = conversation(n);
            let source = CountingSource {
                messages: &messages,
                requests: Cell::new(0),
            };
            let mut cache = LayoutCache::new();
            cache.measure(&source, 60, |_, _| 3);
            assert_eq!(source.requests.get(), n, "n = {n}");
            assert_eq!(cache.heights.len(), n);
        }
    }

    #[test]
    fn test_remeasure_only_touches_trailing_assistant() {
        let messages = conversation(4); // ends with an assistant message
        let mut cache = LayoutCache::new();
        cache.measure(messages.as_slice(), 60, |_, _| 3);

        let mut measured = Vec::new();
        cache.measure(messages.as_slice(), 60, |m, _| {
            measured.push(m.id.clone());
            3
        });
        assert_eq!(measured, vec!["a3".to_string()]);

        // A trailing user message is final
        let messages = conversation(5);
        cache.measure(messages.as_slice(), 60, |_, _| 3);
        let mut measured = 0;
        cache.measure(messages.as_slice(), 60, |_, _| {
            measured += 1;
            3
        });
        assert_eq!(measured, 0);
    }

    #[test]
    fn test_width_change_or_shrink_invalidates() {
        let messages = conversation(4);
        let mut cache = LayoutCache::new();
        cache.measure(messages.as_slice(), 60, |_, _| 3);
        assert_eq!(cache.reusable_count(messages.as_slice(), 40), 0);
        assert_eq!(cache.reusable_count(&messages[..2], 60), 0);
    }

    #[test]
    fn test_prefix_heights_and_lookup() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![2, 3, 4];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.prefix_heights, vec![2, 5, 9]);
        assert_eq!(cache.total_height(), 9);
        assert_eq!(cache.item_span(1), Some(2..5));
        assert_eq!(cache.index_at(0), Some(0));
        assert_eq!(cache.index_at(4), Some(1));
        assert_eq!(cache.index_at(9), None);
    }

    #[test]
    fn test_visible_range_with_overscan() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![10; 20];
        cache.rebuild_prefix_heights();
        // Viewport rows 100..120, overscan 10 each way → rows 90..130
        assert_eq!(cache.visible_range(100, 20), 9..13);
        assert_eq!(cache.visible_range(0, 20), 0..3);
    }

    #[test]
    fn test_one_scroll_request_per_growth() {
        let mut state = TranscriptState::new();
        assert!(!state.sync_len(0));
        assert!(state.sync_len(1));
        assert!(!state.sync_len(1));
        assert!(state.sync_len(3)); // two messages at once still one request
        assert!(!state.sync_len(3));
        assert_eq!(state.scroll_requests, 2);
    }

    #[test]
    fn test_shrink_drops_stale_selection() {
        let mut state = TranscriptState::new();
        state.sync_len(4);
        state.selected_index = Some(3);
        state.sync_len(2);
        assert_eq!(state.selected_index, None);
        assert_eq!(state.scroll_requests, 1);
    }

    #[test]
    fn test_glide_reaches_bottom_in_steps() {
        let mut state = TranscriptState::new();
        state.layout.heights = vec![10; 10];
        state.layout.rebuild_prefix_heights();
        state.viewport_height = 20;
        state.sync_len(10);

        let mut offsets = Vec::new();
        for _ in 0..10 {
            state.follow_bottom(0);
            offsets.push(state.scroll_state.offset().y);
        }
        assert_eq!(offsets[0], 40);
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*offsets.last().unwrap(), 80);
        assert!(!state.gliding);
    }

    #[test]
    fn test_footer_only_while_submitted() {
        assert!(Transcript::shows_footer(RequestStatus::Submitted));
        for status in [RequestStatus::Ready, RequestStatus::Streaming, RequestStatus::Error] {
            assert!(!Transcript::shows_footer(status));
        }
    }

    fn draw(messages: &[Message], status: RequestStatus) -> String {
        let mut views = ViewStates::new();
        views.sync(messages);
        let mut state = TranscriptState::new();
        state.sync_len(messages.len());
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        // Settle the glide
        for _ in 0..8 {
            terminal
                .draw(|f| {
                    Transcript::new(&mut state, messages, &views, status, 0).render(f, f.area())
                })
                .unwrap();
        }
        screen(&terminal)
    }

    #[test]
    fn test_render_shows_spinner_footer_when_submitted() {
        let messages = vec![Message::user("Belgrade")];
        assert!(draw(&messages, RequestStatus::Submitted).contains("Thinking…"));
        assert!(!draw(&messages, RequestStatus::Streaming).contains("Thinking…"));
        assert!(!draw(&messages, RequestStatus::Ready).contains("Thinking…"));
    }

    #[test]
    fn test_render_stays_at_bottom() {
        let messages = conversation(8);
        let text = draw(&messages, RequestStatus::Ready);
        // The last message's unit switch is on screen
        assert!(text.contains("Switch to °C"));
    }

    #[test]
    fn test_hit_test_maps_click_to_control() {
        let messages = conversation(2);
        let mut views = ViewStates::new();
        views.sync(&messages);
        let mut state = TranscriptState::new();
        state.sync_len(2);
        let mut terminal = Terminal::new(TestBackend::new(50, 20)).unwrap();
        terminal
            .draw(|f| {
                Transcript::new(&mut state, &messages, &views, RequestStatus::Ready, 0)
                    .render(f, f.area())
            })
            .unwrap();

        let area = Rect::new(0, 0, 50, 20);
        // User bubble: 3 rows + spacing → assistant starts at row 4;
        // its actions row is the second line
        let user_height = state.layout.heights[0];
        let hit = state.hit_test(area, 2, user_height + 1, &messages, &views);
        assert_eq!(hit, Some((1, Some(Target::Copy))));
        let hit = state.hit_test(area, 45, 1, &messages, &views);
        assert_eq!(hit, Some((0, None)));
    }
}
