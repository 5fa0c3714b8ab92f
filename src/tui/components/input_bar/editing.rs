//! Draft editing helpers: wrapping, char boundaries and cursor placement.
//!
//! Stateless; `InputBar` owns the draft and the cursor offset.

use unicode_width::UnicodeWidthStr;

/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Left border + padding
pub(super) const LEFT_INSET: u16 = 2;
/// Draft lines shown before the bar scrolls internally
pub(super) const MAX_VISIBLE_LINES: u16 = 3;

pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wrapped line count of `text` at `width`, at least one.
///
/// A trailing newline opens a line that textwrap does not report.
pub(super) fn line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map_or(text.len(), |(i, _)| pos + i)
}

pub(super) fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map_or(0, |i| i + 1)
}

pub(super) fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map_or(text.len(), |i| pos + i)
}

/// Wrapped (row, column) of byte offset `pos` at `width`.
///
/// Columns are measured on the raw logical line because textwrap trims
/// trailing spaces, which would freeze the cursor while typing them.
pub(super) fn cursor_row_col(text: &str, pos: usize, width: u16) -> (u16, u16) {
    if width == 0 {
        return (0, 0);
    }
    let before = &text[..pos];
    let options = wrap_options(width);

    let start = line_start(text, pos);
    let rows_above = if start == 0 {
        0
    } else {
        line_count(&before[..start], width) - 1
    };

    let logical = &before[start..];
    let segments = textwrap::wrap(logical, &options);
    let (row_in_line, consumed) = match segments.split_last() {
        Some((_, earlier)) => (
            earlier.len() as u16,
            earlier.iter().map(|s| s.width()).sum::<usize>(),
        ),
        None => (0, 0),
    };
    let column = logical.width().saturating_sub(consumed) as u16;
    (rows_above + row_in_line, column.min(width))
}
