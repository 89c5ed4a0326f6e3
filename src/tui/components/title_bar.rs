//! # TitleBar Component
//!
//! Top status bar showing which backend is in use plus transient status.
//!
//! ## Conditional Formatting
//!
//! 1. **Unseen content**: `"querybox (backend: http://localhost:8000) | Waiting for reply... | ↓ New"`
//! 2. **Status message**: `"querybox (backend: http://localhost:8000) | Feedback sent"`
//! 3. **Default**: `"querybox (backend: http://localhost:8000)"`
//!
//! Stateless: every field is a prop supplied by the caller each frame.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;

/// Top status bar component.
pub struct TitleBar {
    /// Backend description (e.g. its base URL)
    pub backend: String,
    /// Status message (e.g. "Waiting for reply...", "Feedback sent")
    pub status_message: String,
    /// Whether there's content below the current scroll position
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(backend: String, status_message: String, has_unseen_content: bool) -> Self {
        Self {
            backend,
            status_message,
            has_unseen_content,
        }
    }

    fn title_text(&self) -> String {
        let base = format!("querybox (backend: {})", self.backend);
        match (self.status_message.is_empty(), self.has_unseen_content) {
            (_, true) => format!("{} | {} | ↓ New", base, self.status_message),
            (true, false) => base,
            (false, false) => format!("{} | {}", base, self.status_message),
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Span::raw(self.title_text()), area);
    }
}
