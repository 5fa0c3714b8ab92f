//! # TitleBar Component
//!
//! Top status line: app name, request status and the transient notice
//! (copy confirmation).
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(app.status(), notice, has_unseen_content);
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Notice**: `"Weather Today | streaming | Copied: Belgrade: 21°F"`
//! 2. **Unseen content**: `"Weather Today | ready | ↓ New"`
//! 3. **Default**: `"Weather Today | ready"`
//!
//! The notice wins over the unseen marker because it expires on its own.

use crate::tui::component::Component;
use crate::transport::RequestStatus;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub const APP_TITLE: &str = "Weather Today";

/// Top status bar component.
///
/// # Props
///
/// - `status`: request status from the chat session
/// - `notice`: transient confirmation text, if any
/// - `has_unseen_content`: whether the transcript has content below the viewport
pub struct TitleBar {
    pub status: RequestStatus,
    pub notice: Option<String>,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(status: RequestStatus, notice: Option<String>, has_unseen_content: bool) -> Self {
        Self {
            status,
            notice,
            has_unseen_content,
        }
    }

    fn status_style(&self) -> Style {
        match self.status {
            RequestStatus::Ready => Style::default().fg(Color::Green),
            RequestStatus::Submitted | RequestStatus::Streaming => {
                Style::default().fg(Color::Yellow)
            }
            RequestStatus::Error => Style::default().fg(Color::Red),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled(APP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
            separator.clone(),
            Span::styled(self.status.label(), self.status_style()),
        ];

        if let Some(notice) = &self.notice {
            spans.push(separator);
            spans.push(Span::styled(notice.clone(), Style::default().fg(Color::Cyan)));
        } else if self.has_unseen_content {
            spans.push(separator);
            spans.push(Span::raw("↓ New"));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
