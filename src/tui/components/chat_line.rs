use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::text::Text;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::core::chat_log::{ChatLine, Sender};
use crate::tui::markdown;

/// A single rendered line of the chat window: `**Sender:** message`.
///
/// Transient: built each frame from a [`ChatLine`]. The markup is rendered
/// once on construction so height and drawing agree on the same `Text`.
pub struct ChatLineView {
    text: Text<'static>,
}

impl ChatLineView {
    pub fn new(line: &ChatLine) -> Self {
        Self {
            text: markdown::render(&line.markup(), sender_color(line.sender)),
        }
    }

    /// Rows needed at `width`.
    ///
    /// Measured by the same `Paragraph` that draws the line, so hyphens,
    /// tabs and wide glyphs wrap exactly as they will on screen.
    pub fn height(&self, width: u16) -> u16 {
        if width == 0 {
            return 1;
        }
        let rows = self.paragraph().line_count(width).max(1);
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    fn paragraph(&self) -> Paragraph<'static> {
        Paragraph::new(self.text.clone()).wrap(Wrap { trim: false })
    }
}

impl Widget for ChatLineView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.paragraph().render(area, buf);
    }
}

pub fn sender_color(sender: Sender) -> Color {
    match sender {
        Sender::User => Color::Green,
        Sender::Bot => Color::Blue,
    }
}
