//! Wrapping and boundary helpers for the message editor.
//!
//! Stateless: everything takes the buffer and a width explicitly.

/// Columns taken by the rounded border and one column of padding each side
pub(super) const HORIZONTAL_CHROME: u16 = 4;
/// Rows taken by the top and bottom border
pub(super) const VERTICAL_CHROME: u16 = 2;
/// Editor grows up to this many text rows, then scrolls internally
pub(super) const MAX_TEXT_ROWS: u16 = 5;
/// Distance from the area edge to the first text cell
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(text_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(text_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Width available for text inside an editor of `area_width` columns.
pub(super) fn text_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_CHROME)
}

/// Number of rows `text` occupies at `width`, at least one.
///
/// A trailing newline puts the cursor on a fresh row even though textwrap
/// may not emit an empty segment for it.
pub(super) fn row_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }

    let rows = textwrap::wrap(text, wrap_options(width));
    let mut count = u16::try_from(rows.len()).unwrap_or(u16::MAX).max(1);
    if text.ends_with('\n') && !rows.last().is_some_and(|r| r.is_empty()) {
        count = count.saturating_add(1);
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

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos` (readline `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let before = &text[..pos];
    let trimmed = before.trim_end_matches(|c: char| !is_word_char(c));
    trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// End of the word after `pos` (readline `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let after = &text[pos..];
    let word_start = after
        .char_indices()
        .find(|&(_, c)| is_word_char(c))
        .map_or(after.len(), |(i, _)| i);
    after[word_start..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(text.len(), |(i, _)| pos + word_start + i)
}
