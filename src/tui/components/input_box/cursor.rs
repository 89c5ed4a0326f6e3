//! Cursor tracking for the message editor.
//!
//! The buffer itself lives in `InputBox`; every method here takes it as
//! `&str` so the dependency stays visible at the call site.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::text_wrap::{BORDER_OFFSET, MAX_TEXT_ROWS, row_count, text_width, wrap_options};

pub(super) struct CursorState {
    /// Byte offset into the buffer, always on a char boundary
    pub pos: usize,
    /// First wrapped row shown once the text exceeds `MAX_TEXT_ROWS`
    pub first_row: u16,
    /// Area width from the last render, used for vertical movement
    pub last_area_width: u16,
}

impl CursorState {
    const FALLBACK_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            first_row: 0,
            last_area_width: Self::FALLBACK_WIDTH,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.first_row = 0;
    }

    /// Wrapped segments of `buffer` with the byte offset each one starts at.
    fn segments(buffer: &str, width: u16) -> Vec<(usize, usize)> {
        let rows = textwrap::wrap(buffer, wrap_options(width));
        let mut out = Vec::with_capacity(rows.len());
        let mut offset = 0;
        for row in &rows {
            // Segments borrow from the buffer unless textwrap had to allocate;
            // locate each one from the running offset either way.
            let start = buffer[offset..]
                .find(row.as_ref())
                .map_or(offset, |i| offset + i);
            out.push((start, row.len()));
            offset = start + row.len();
        }
        out
    }

    /// Move one wrapped row up (`-1`) or down (`1`), keeping the column.
    ///
    /// Returns `false` when already on the first or last row.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16) -> bool {
        let width = text_width(self.last_area_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let segments = Self::segments(buffer, width);
        let Some(current) = segments
            .iter()
            .position(|&(start, len)| self.pos <= start + len)
        else {
            return false;
        };

        let target = match direction {
            d if d < 0 && current > 0 => current - 1,
            d if d > 0 && current + 1 < segments.len() => current + 1,
            _ => return false,
        };

        let column = self.pos.saturating_sub(segments[current].0);
        let (target_start, target_len) = segments[target];
        let mut pos = target_start + column.min(target_len);
        while !buffer.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
        true
    }

    /// Wrapped row (0-based) the cursor sits on.
    pub fn row(&self, buffer: &str, area_width: u16) -> u16 {
        let width = text_width(area_width);
        if width == 0 {
            return 0;
        }
        row_count(&buffer[..self.pos], width).saturating_sub(1)
    }

    /// Keep the cursor row inside the visible window.
    pub fn follow(&mut self, buffer: &str, area_width: u16) {
        if row_count(buffer, text_width(area_width)) <= MAX_TEXT_ROWS {
            self.first_row = 0;
            return;
        }

        let row = self.row(buffer, area_width);
        if row < self.first_row {
            self.first_row = row;
        } else if row >= self.first_row + MAX_TEXT_ROWS {
            self.first_row = row + 1 - MAX_TEXT_ROWS;
        }
    }

    /// Terminal cell `(x, y)` for the cursor inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = text_width(area.width);
        let origin = (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        if width == 0 {
            return origin;
        }

        let before = &buffer[..self.pos];
        let row = self.row(buffer, area.width);

        // Measure from the last hard newline; textwrap drops trailing spaces
        // so wrapped segment lengths can't be trusted for the column.
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let logical = &before[line_start..];
        let wrapped = textwrap::wrap(logical, wrap_options(width));
        let consumed: usize = wrapped
            .iter()
            .take(wrapped.len().saturating_sub(1))
            .map(|seg| seg.width())
            .sum();
        let column = logical.width().saturating_sub(consumed);
        let column = u16::try_from(column).unwrap_or(u16::MAX).min(width);

        let visible_row = row.saturating_sub(self.first_row);
        (origin.0 + column, origin.1 + visible_row)
    }
}
