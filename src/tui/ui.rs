//! Screen layout and top-level drawing.
//!
//! ```text
//! ┌ title bar ───────────────────────────┐
//! │ (padding)                            │
//! │ transcript / error view              │
//! │ suggestion chips (empty chat only)   │
//! │ input bar                            │
//! └──────────────────────────────────────┘
//! ```
//!
//! Below `COMPACT_HEIGHT` rows the padding goes first, then the chips while
//! the input is focused, so the input bar always keeps its rows.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{Suggestions, TitleBar, Transcript};
use crate::tui::{InputMode, TuiState};

pub const COMPACT_HEIGHT: u16 = 14;
pub const DISMISS_HINT: &str = "Press Esc to dismiss";

/// Where each part of the screen was drawn. Kept for mouse hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regions {
    pub title: Rect,
    pub transcript: Rect,
    pub suggestions: Option<Rect>,
    pub input: Rect,
}

/// Splits `area` into regions.
pub fn plan(area: Rect, input_height: u16, show_suggestions: bool, input_focused: bool) -> Regions {
    use Constraint::{Length, Min};

    let compact = area.height < COMPACT_HEIGHT;
    let (area, padding) = if compact {
        (area, 0)
    } else {
        (
            Rect {
                x: area.x + 1,
                width: area.width.saturating_sub(2),
                ..area
            },
            1,
        )
    };
    let chips = show_suggestions && !(compact && input_focused);
    let input_height = input_height.min(area.height.saturating_sub(1));

    let [title, _, transcript, suggestions, input] = Layout::vertical([
        Length(1),
        Length(padding),
        Min(0),
        Length(u16::from(chips)),
        Length(input_height),
    ])
    .areas(area);

    Regions {
        title,
        transcript,
        suggestions: chips.then_some(suggestions),
        input,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let area = frame.area();
    let input_width = if area.height < COMPACT_HEIGHT {
        area.width
    } else {
        area.width.saturating_sub(2)
    };
    tui.input_bar.status = app.status();
    tui.input_bar.focused = tui.input_mode == InputMode::Input;
    let input_height = tui.input_bar.calculate_height(input_width);

    let show_suggestions = tui.chips_visible(app);
    let regions = plan(area, input_height, show_suggestions, tui.input_bar.focused);
    tui.regions = regions;

    match &app.snapshot.error {
        Some(error) => draw_error_view(frame, regions.transcript, error),
        None => {
            tui.transcript.sync_len(app.messages().len());
            Transcript::new(
                &mut tui.transcript,
                app.messages(),
                &app.views,
                app.status(),
                spinner_frame,
            )
            .render(frame, regions.transcript);
        }
    }

    let notice = app.notice.as_ref().map(|n| n.text.clone());
    TitleBar::new(app.status(), notice, tui.transcript.has_unseen_content())
        .render(frame, regions.title);

    if let Some(chips_area) = regions.suggestions {
        Suggestions::new(&mut tui.suggestions).render(frame, chips_area);
    }

    tui.input_bar.render(frame, regions.input);
}

/// The error replaces the whole transcript until dismissed.
fn draw_error_view(frame: &mut Frame, area: Rect, error: &str) {
    let text = vec![
        Line::from(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
        Line::default(),
        Line::from(Span::styled(DISMISS_HINT, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(text)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red))
                .title("Error"),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ChatSnapshot, Message, Part, RequestStatus, Role};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(app: &App, tui: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        for _ in 0..8 {
            terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        }
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn suggestions() -> Vec<String> {
        vec!["What's the weather in Belgrade?".into(), "Novi Sad".into()]
    }

    #[test]
    fn test_plan_regular_height() {
        let r = plan(Rect::new(0, 0, 80, 24), 3, true, true);
        assert_eq!(r.title, Rect::new(1, 0, 78, 1));
        assert_eq!(r.transcript, Rect::new(1, 2, 78, 18));
        assert_eq!(r.suggestions, Some(Rect::new(1, 20, 78, 1)));
        assert_eq!(r.input, Rect::new(1, 21, 78, 3));
    }

    #[test]
    fn test_plan_compact_drops_padding_then_chips() {
        let r = plan(Rect::new(0, 0, 60, 8), 3, true, false);
        assert_eq!(r.title.y, 0);
        assert_eq!(r.transcript, Rect::new(0, 1, 60, 3));
        assert!(r.suggestions.is_some());

        let r = plan(Rect::new(0, 0, 60, 8), 3, true, true);
        assert_eq!(r.suggestions, None);
        assert_eq!(r.transcript, Rect::new(0, 1, 60, 4));
        assert_eq!(r.input, Rect::new(0, 5, 60, 3));
    }

    #[test]
    fn test_plan_input_survives_tiny_terminal() {
        let r = plan(Rect::new(0, 0, 40, 5), 5, true, true);
        assert_eq!(r.input.height, 4);
        assert_eq!(r.transcript.height, 0);
    }

    #[test]
    fn test_empty_chat_shows_chips_and_placeholder() {
        let app = App::new(suggestions());
        let mut tui = TuiState::new(suggestions());
        let text = screen(&app, &mut tui, 80, 24);
        assert!(text.contains("Weather Today | ready"));
        assert!(text.contains("[ What's the weather in Belgrade? ]  [ Novi Sad ]"));
        assert!(text.contains("Enter location to get the weather for"));
        assert!(text.contains("[ Ok ]"));
    }

    #[test]
    fn test_chips_hidden_once_draft_has_text() {
        let app = App::new(suggestions());
        let mut tui = TuiState::new(suggestions());
        tui.input_bar.set_draft("Ni");
        let text = screen(&app, &mut tui, 80, 24);
        assert!(!text.contains("[ Novi Sad ]"));
    }

    #[test]
    fn test_error_replaces_transcript() {
        let mut app = App::new(suggestions());
        app.snapshot = ChatSnapshot {
            messages: vec![Message::user("Belgrade")],
            status: RequestStatus::Error,
            error: Some("upstream unavailable".into()),
        };
        let mut tui = TuiState::new(suggestions());
        let text = screen(&app, &mut tui, 80, 24);
        assert!(text.contains("upstream unavailable"));
        assert!(text.contains(DISMISS_HINT));
        assert!(!text.contains("│ Belgrade │"));
    }

    #[test]
    fn test_weather_reply_renders() {
        let mut app = App::new(suggestions());
        app.snapshot = ChatSnapshot {
            messages: vec![
                Message::user("Belgrade"),
                Message::new(
                    "a1",
                    Role::Assistant,
                    vec![Part::weather("Belgrade", Some(21.0))],
                ),
            ],
            status: RequestStatus::Ready,
            error: None,
        };
        app.views.sync(&app.snapshot.messages);
        let mut tui = TuiState::new(suggestions());
        let text = screen(&app, &mut tui, 80, 24);
        assert!(text.contains("Belgrade: 21°F"));
        assert!(text.contains("[⧉ copy]  [△]  [▽]"));
        assert!(!text.contains("[ Novi Sad ]"));
    }
}
