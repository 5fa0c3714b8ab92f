//! # Bubble Component
//!
//! Renders one transcript message. User messages are right-aligned bordered
//! bubbles; assistant messages are drawn left-aligned behind a selection
//! gutter, one section per part:
//!
//! ```text
//! ▎ Here is the current weather.          ← markdown text part
//! ▎
//! ▎ Belgrade: 21°F                        ← weather tool result
//! ▎ [⧉ copy]  [△]  [▽]                    ← actions row
//! ▎ [ Switch to °C ]                      ← unit switch
//! ```
//!
//! Heights depend only on the message and the width, never on view state, so
//! the transcript can cache them while units and feedback change.

use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::feedback::Feedback;
use crate::core::view_state::MessageViewState;
use crate::transport::{Message, Part, Role, WEATHER_TOOL};
use crate::tui::markdown;

/// Blank row under every message.
const SPACING: u16 = 1;
/// Selection bar + space in front of assistant content.
const GUTTER: u16 = 2;
/// Border (2) + horizontal padding (2) of a user bubble.
const BUBBLE_H_OVERHEAD: u16 = 4;
const BUBBLE_V_OVERHEAD: u16 = 2;
/// Summary, actions row and unit switch.
const WEATHER_ROWS: u16 = 3;

const COPY_LABEL: &str = "⧉ copy";
const COPIED_LABEL: &str = "✓ copied";
const LIKE_LABEL: &str = "△";
const LIKED_LABEL: &str = "▲";
const DISLIKE_LABEL: &str = "▽";
const DISLIKED_LABEL: &str = "▼";
const PENDING_LABEL: &str = "… checking the weather";

/// A clickable control inside a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Copy,
    Like,
    Dislike,
    SwitchUnit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hotspot {
    columns: Range<u16>,
    target: Target,
}

/// What a single part contributes to an assistant message.
enum Section<'a> {
    Markdown(Text<'static>),
    Weather { location: &'a str },
    Pending,
}

impl Section<'_> {
    fn height(&self, width: u16) -> u16 {
        match self {
            Section::Markdown(text) => {
                let lines = Paragraph::new(text.clone())
                    .wrap(Wrap { trim: false })
                    .line_count(width);
                lines.min(u16::MAX as usize) as u16
            }
            Section::Weather { .. } => WEATHER_ROWS,
            Section::Pending => 1,
        }
    }
}

fn sections(message: &Message) -> Vec<Section<'_>> {
    message
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text } if !text.trim().is_empty() => {
                Some(Section::Markdown(markdown::render(text.trim(), Color::Reset)))
            }
            Part::ToolResult { name, output, .. } if name.as_str() == WEATHER_TOOL => {
                Some(match output {
                    Some(weather) => Section::Weather {
                        location: &weather.location,
                    },
                    None => Section::Pending,
                })
            }
            _ => None,
        })
        .collect()
}

/// A transient component created per frame for one visible message.
pub struct Bubble<'a> {
    pub message: &'a Message,
    pub view: &'a MessageViewState,
    pub is_selected: bool,
}

impl<'a> Bubble<'a> {
    pub fn new(message: &'a Message, view: &'a MessageViewState, is_selected: bool) -> Self {
        Self {
            message,
            view,
            is_selected,
        }
    }

    /// Rows the message occupies at `width`, spacing included.
    pub fn height(message: &Message, width: u16) -> u16 {
        if width <= GUTTER {
            return 1;
        }
        let body = match message.role {
            Role::User => {
                let lines = user_lines(message, width);
                if lines.is_empty() {
                    0
                } else {
                    line_rows(&lines).saturating_add(BUBBLE_V_OVERHEAD)
                }
            }
            Role::Assistant => {
                let content_width = width - GUTTER;
                let parts = sections(message);
                let gaps = parts.len().saturating_sub(1) as u16;
                parts
                    .iter()
                    .map(|s| s.height(content_width))
                    .fold(gaps, u16::saturating_add)
            }
        };
        body.saturating_add(SPACING)
    }

    /// The control under (`x`, `y`), relative to the bubble's top-left corner.
    pub fn hit_test(&self, width: u16, x: u16, y: u16) -> Option<Target> {
        if self.message.role != Role::Assistant || width <= GUTTER || x < GUTTER {
            return None;
        }
        let content_width = width - GUTTER;
        let column = x - GUTTER;

        let mut top = 0u16;
        for section in sections(self.message) {
            let height = section.height(content_width);
            if let Section::Weather { .. } = section {
                let row = y.checked_sub(top).filter(|r| *r < height);
                let hotspots = match row {
                    Some(1) => action_row(self.view).1,
                    Some(2) => switch_row(self.view).1,
                    _ => Vec::new(),
                };
                if let Some(hit) = hotspots.iter().find(|h| h.columns.contains(&column)) {
                    return Some(hit.target);
                }
            }
            top = top.saturating_add(height).saturating_add(1);
        }
        None
    }

    fn render_user(&self, area: Rect, buf: &mut Buffer) {
        let lines = user_lines(self.message, area.width);
        if lines.is_empty() {
            return;
        }
        let inner_width = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let bubble_width = (inner_width + BUBBLE_H_OVERHEAD).min(area.width);
        let bubble = Rect {
            x: area.x + area.width - bubble_width,
            y: area.y,
            width: bubble_width,
            height: line_rows(&lines)
                .saturating_add(BUBBLE_V_OVERHEAD)
                .min(area.height),
        };

        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        let inner = block.inner(bubble);
        block.render(bubble, buf);

        let text: Vec<Line<'static>> = lines.into_iter().map(Line::from).collect();
        Paragraph::new(text).render(inner, buf);
    }

    fn render_assistant(&self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width - GUTTER;
        let body_height = area.height.saturating_sub(SPACING);

        if self.is_selected {
            let bar = Style::default().fg(Color::Cyan);
            for row in 0..body_height {
                buf.set_string(area.x, area.y + row, "▎", bar);
            }
        }

        let mut y = area.y;
        let bottom = area.y + body_height;
        for section in sections(self.message) {
            if y >= bottom {
                break;
            }
            let height = section.height(content_width).min(bottom - y);
            let rect = Rect::new(area.x + GUTTER, y, content_width, height);
            match section {
                Section::Markdown(text) => {
                    Paragraph::new(text)
                        .wrap(Wrap { trim: false })
                        .render(rect, buf);
                }
                Section::Weather { location } => {
                    let rows = [
                        summary_line(self.view, location),
                        action_row(self.view).0,
                        switch_row(self.view).0,
                    ];
                    for (offset, line) in rows.iter().enumerate().take(height as usize) {
                        buf.set_line(rect.x, rect.y + offset as u16, line, rect.width);
                    }
                }
                Section::Pending => {
                    let line = Line::styled(
                        PENDING_LABEL,
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    );
                    buf.set_line(rect.x, rect.y, &line, rect.width);
                }
            }
            y = y.saturating_add(height).saturating_add(1);
        }
    }
}

impl Widget for Bubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width <= GUTTER || area.height == 0 {
            return;
        }
        match self.message.role {
            Role::User => self.render_user(area, buf),
            Role::Assistant => self.render_assistant(area, buf),
        }
    }
}

fn line_rows(lines: &[String]) -> u16 {
    u16::try_from(lines.len()).unwrap_or(u16::MAX)
}

/// User text pre-wrapped to the bubble's maximum inner width.
fn user_lines(message: &Message, width: u16) -> Vec<String> {
    let text: String = message
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // Bubbles take at most three quarters of the row
    let max_inner = (width.saturating_mul(3) / 4)
        .saturating_sub(BUBBLE_H_OVERHEAD)
        .max(1);
    let options = textwrap::Options::new(max_inner as usize).break_words(true);
    textwrap::wrap(text, options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

fn summary_line(view: &MessageViewState, location: &str) -> Line<'static> {
    Line::styled(
        view.temperature.summary(location),
        Style::default().add_modifier(Modifier::BOLD),
    )
}

/// Lays out `[label]` controls separated by two spaces.
fn controls_line(controls: Vec<(String, Style, Target)>) -> (Line<'static>, Vec<Hotspot>) {
    let mut spans = Vec::new();
    let mut hotspots = Vec::new();
    let mut column = 0u16;
    for (index, (label, style, target)) in controls.into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw("  "));
            column += 2;
        }
        let text = format!("[{label}]");
        let width = text.width() as u16;
        hotspots.push(Hotspot {
            columns: column..column + width,
            target,
        });
        spans.push(Span::styled(text, style));
        column += width;
    }
    (Line::from(spans), hotspots)
}

fn action_row(view: &MessageViewState) -> (Line<'static>, Vec<Hotspot>) {
    let actions = &view.actions;
    let visible = actions.controls();
    let idle = Style::default().fg(Color::Gray);
    let chosen = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut controls = Vec::new();
    if visible.copy {
        let (label, style) = if actions.copied {
            (COPIED_LABEL, Style::default().fg(Color::Green))
        } else {
            (COPY_LABEL, idle)
        };
        controls.push((label.to_string(), style, Target::Copy));
    }
    if visible.like {
        let (label, style) = if actions.feedback == Feedback::Good {
            (LIKED_LABEL, chosen)
        } else {
            (LIKE_LABEL, idle)
        };
        controls.push((label.to_string(), style, Target::Like));
    }
    if visible.dislike {
        let (label, style) = if actions.feedback == Feedback::Bad {
            (DISLIKED_LABEL, chosen)
        } else {
            (DISLIKE_LABEL, idle)
        };
        controls.push((label.to_string(), style, Target::Dislike));
    }
    controls_line(controls)
}

fn switch_row(view: &MessageViewState) -> (Line<'static>, Vec<Hotspot>) {
    controls_line(vec![(
        format!(" {} ", view.temperature.switch_label()),
        Style::default().fg(Color::Cyan),
        Target::SwitchUnit,
    )])
}
