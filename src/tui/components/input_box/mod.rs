//! # InputBox Component
//!
//! The message editor at the bottom of the screen.
//!
//! ## Responsibilities
//!
//! - Capture text input, including pasted and multi-line text
//! - Editing: backspace, delete, char and word movement, Home/End
//! - Submission (Enter) hands the whole buffer to the parent and clears it
//!
//! Whatever is in the buffer is submitted as-is, empty or not.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{
    Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    MAX_TEXT_ROWS, VERTICAL_CHROME, next_char_boundary, next_word_boundary, prev_char_boundary,
    prev_word_boundary, row_count, text_width, wrap_options,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed; carries the buffer as it was
    Submit(String),
    /// Buffer or cursor changed
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    cursor: CursorState,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
        }
    }

    /// Rows the editor wants at `area_width`, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = row_count(&self.buffer, text_width(area_width));
        rows.min(MAX_TEXT_ROWS) + VERTICAL_CHROME
    }

    fn visible_text(&self, area_width: u16) -> String {
        if self.cursor.first_row == 0 {
            return self.buffer.clone();
        }
        let width = text_width(area_width);
        if width == 0 {
            return String::new();
        }

        let rows = textwrap::wrap(&self.buffer, wrap_options(width));
        let start = usize::from(self.cursor.first_row).min(rows.len());
        let end = (start + usize::from(MAX_TEXT_ROWS)).min(rows.len());
        rows[start..end].join("\n")
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect) {
        let total = row_count(&self.buffer, text_width(area.width));
        if total <= MAX_TEXT_ROWS {
            return;
        }

        // content_length is the number of scroll positions, not rows
        let mut state = ScrollbarState::default()
            .content_length(usize::from(total - MAX_TEXT_ROWS))
            .position(usize::from(self.cursor.first_row));

        let track = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            track,
            &mut state,
        );
    }

    /// Move the cursor to `pos`, reporting a change only if it moved.
    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        if pos == self.cursor.pos {
            return None;
        }
        self.cursor.pos = pos;
        Some(InputEvent::ContentChanged)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_area_width = area.width;
        self.cursor.follow(&self.buffer, area.width);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1))
            .title("Message (Enter to send, Ctrl+U/Ctrl+D to rate, Ctrl+R to regenerate)");

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Green));

        frame.render_widget(input, area);
        self.render_scrollbar(frame, area);

        let (x, y) = self.cursor.screen_pos(&self.buffer, area);
        // Padding shifts text one column right of the border
        frame.set_cursor_position((x.saturating_add(1), y));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let pos = self.cursor.pos;
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(pos, text);
                self.cursor.pos += text.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, pos);
                self.buffer.drain(prev..pos);
                self.cursor.pos = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::DeleteWordBack if pos > 0 => {
                let start = prev_word_boundary(&self.buffer, pos);
                self.buffer.drain(start..pos);
                self.cursor.pos = start;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if pos > 0 => {
                self.move_to(prev_char_boundary(&self.buffer, pos))
            }
            TuiEvent::CursorRight if pos < self.buffer.len() => {
                self.move_to(next_char_boundary(&self.buffer, pos))
            }
            TuiEvent::WordLeft => self.move_to(prev_word_boundary(&self.buffer, pos)),
            TuiEvent::WordRight => self.move_to(next_word_boundary(&self.buffer, pos)),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
                self.move_to(line_start)
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| pos + i);
                self.move_to(line_end)
            }
            TuiEvent::CursorUp => self
                .cursor
                .move_vertically(&self.buffer, -1)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .cursor
                .move_vertically(&self.buffer, 1)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor.reset();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
