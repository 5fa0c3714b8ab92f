//! Markdown → ratatui `Text` for assistant replies.
//!
//! Covers what a weather reply actually uses: paragraphs, headings, emphasis,
//! strong, strikethrough, inline code, lists, block quotes, links and plain
//! fenced code. Anything else (tables, HTML, images) is dropped.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const QUOTE_BAR: &str = "│ ";
const CODE_BAR: &str = "┃ ";

/// Renders `content` with `base_fg` as the body color.
///
/// Returns owned text (`'static`) so callers aren't constrained by input lifetime.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = TextBuilder::new(base_fg);
    for event in Parser::new_ext(content, options) {
        builder.event(event);
    }
    builder.finish()
}

struct TextBuilder {
    lines: Vec<Line<'static>>,
    base: Style,
    inline: Vec<Style>,
    /// Prefix spans for every new line (quote and code bars).
    gutters: Vec<Span<'static>>,
    /// One entry per open list: `None` bullets, `Some(n)` numbers from n.
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    in_code: bool,
    pending_gap: bool,
}

impl TextBuilder {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(base_fg),
            inline: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            in_code: false,
            pending_gap: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        self.inline.push(self.current().patch(overlay));
    }

    fn new_line(&mut self) {
        let mut line = Line::default();
        for gutter in &self.gutters {
            line.push_span(gutter.clone());
        }
        self.lines.push(line);
    }

    fn start_block(&mut self) {
        if self.pending_gap && !self.lines.is_empty() {
            self.new_line();
        }
        self.pending_gap = false;
    }

    fn span(&mut self, span: Span<'static>) {
        if self.lines.is_empty() {
            self.new_line();
        }
        if let Some(line) = self.lines.last_mut() {
            line.push_span(span);
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.span(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.span(Span::styled(" ", self.current())),
            Event::HardBreak => self.new_line(),
            Event::Rule => {
                self.start_block();
                self.new_line();
                self.span(Span::styled("─".repeat(24), Style::default().fg(Color::DarkGray)));
                self.pending_gap = true;
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // A paragraph directly inside a list item continues the marker line
                if !self.lists.is_empty() && !self.pending_gap {
                    return;
                }
                self.start_block();
                self.new_line();
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                self.new_line();
                let style = heading_style(self.base, level);
                self.inline.push(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled(QUOTE_BAR, Style::default().fg(Color::DarkGray)));
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM));
            }
            Tag::CodeBlock(_) => {
                self.start_block();
                self.gutters
                    .push(Span::styled(CODE_BAR, Style::default().fg(Color::DarkGray)));
                self.in_code = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line();
                self.pending_gap = false;
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.span(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_inline(Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.gutters.pop();
                self.in_code = false;
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.links.pop() {
                    self.span(Span::styled(
                        format!(" <{url}>"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Terminals draw tabs zero-width
        let text = text.replace('\t', "    ");
        if self.in_code {
            let style = Style::default().fg(Color::White);
            for line in text.lines() {
                self.new_line();
                self.span(Span::styled(line.to_string(), style));
            }
            return;
        }
        let style = self.current();
        self.span(Span::styled(text, style));
    }
}

fn heading_style(base: Style, level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => base.add_modifier(Modifier::BOLD),
        _ => base.add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("Sunny in Belgrade", Color::Green);
        assert_eq!(plain(&text), vec!["Sunny in Belgrade"]);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn strong_and_emphasis_compose() {
        let text = render("It is ***very*** hot", Color::Reset);
        let span = text.lines[0].spans.iter().find(|s| s.content == "very").unwrap();
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert!(span.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn heading_text_is_bold() {
        let text = render("## Forecast", Color::Blue);
        let span = &text.lines[0].spans[0];
        assert_eq!(span.content, "Forecast");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(span.style.fg, Some(Color::Blue));
    }

    #[test]
    fn paragraphs_are_separated_by_blank_line() {
        let text = render("one\n\ntwo", Color::Reset);
        assert_eq!(plain(&text), vec!["one", "", "two"]);
    }

    #[test]
    fn lists_get_markers() {
        let text = render("- rain\n- wind\n\n1. first\n2. second", Color::Reset);
        let lines = plain(&text);
        assert!(lines.contains(&"• rain".to_string()), "{lines:?}");
        assert!(lines.contains(&"• wind".to_string()), "{lines:?}");
        assert!(lines.contains(&"1. first".to_string()), "{lines:?}");
        assert!(lines.contains(&"2. second".to_string()), "{lines:?}");
    }

    #[test]
    fn link_url_follows_text() {
        let text = render("[radar](https://example.com)", Color::Reset);
        assert_eq!(plain(&text), vec!["radar <https://example.com>"]);
    }

    #[test]
    fn block_quote_lines_get_bar() {
        let text = render("> stay inside", Color::Reset);
        assert_eq!(plain(&text), vec!["│ stay inside"]);
    }

    #[test]
    fn code_block_lines_get_bar_and_tabs_expand() {
        let text = render("```\n\tcode\n```", Color::Reset);
        assert_eq!(plain(&text), vec!["┃     code"]);
    }

    #[test]
    fn inline_code_styled() {
        let text = render("Use `°C`", Color::Reset);
        let span = text.lines[0].spans.iter().find(|s| s.content == "°C").unwrap();
        assert_eq!(span.style.bg, Some(Color::DarkGray));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render("", Color::Reset).lines.is_empty());
    }
}
