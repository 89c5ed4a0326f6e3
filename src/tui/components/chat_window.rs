//! # ChatWindow Component
//!
//! Scrollable view of the chat log.
//!
//! ## Responsibilities
//!
//! - Display every line of the log, newest at the bottom
//! - Jump to the newest line whenever a line is appended
//! - Let the user scroll back through older lines in between
//! - Cache line heights (lines never change once appended)
//!
//! ## Architecture
//!
//! `ChatWindow` is transient (created each frame) and wraps
//! `&'a mut ChatWindowState` (persistent) plus `&'a ChatLog` (props).

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::chat_log::ChatLog;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::chat_line::ChatLineView;
use crate::tui::event::TuiEvent;

/// Scroll and layout state for the chat window.
/// Must be persisted in the parent TuiState.
pub struct ChatWindowState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, the view stays pinned to the newest line
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for ChatWindowState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWindowState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            viewport_height: 0,
        }
    }

    pub fn total_height(&self) -> u16 {
        self.layout.heights.iter().fold(0u16, |acc, &h| acc.saturating_add(h))
    }

    /// Largest valid scroll offset for the current content and viewport.
    pub fn max_scroll_offset(&self) -> u16 {
        self.total_height().saturating_sub(self.viewport_height)
    }

    pub fn scroll_offset(&self) -> u16 {
        self.scroll_state.offset().y
    }

    pub fn has_unseen_content(&self) -> bool {
        self.scroll_offset() < self.max_scroll_offset()
    }

    fn set_offset(&mut self, y: u16) {
        self.scroll_state.set_offset(Position { x: 0, y });
    }

    /// Clamp the scroll offset into `0..=max_scroll_offset()`.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll_offset();
        if self.scroll_offset() > max_y {
            self.set_offset(max_y);
        }
    }

    /// Re-engage auto-scroll once the user has scrolled back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll_offset();
        if self.scroll_offset() >= max_y {
            self.stick_to_bottom = true;
            self.set_offset(max_y);
        }
    }

    fn scroll_up_by(&mut self, rows: u16) {
        let y = self.scroll_offset().saturating_sub(rows);
        self.set_offset(y);
        self.stick_to_bottom = false;
    }

    fn scroll_down_by(&mut self, rows: u16) {
        let y = self
            .scroll_offset()
            .saturating_add(rows)
            .min(self.max_scroll_offset());
        self.set_offset(y);
        self.repin_if_at_bottom();
    }
}

/// Scrollable chat log component.
pub struct ChatWindow<'a> {
    pub state: &'a mut ChatWindowState,
    pub log: &'a ChatLog,
}

impl<'a> ChatWindow<'a> {
    pub fn new(state: &'a mut ChatWindowState, log: &'a ChatLog) -> Self {
        Self { state, log }
    }
}

impl<'a> Component for ChatWindow<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for the scrollbar
        let lines = self.log.lines();

        // 1. Measure new lines. Lines are immutable, so only a width change
        //    invalidates what is cached.
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(lines.len(), content_width);
        layout.heights.truncate(reusable);
        let appended = lines.len() > layout.line_count;
        for line in lines.iter().skip(layout.heights.len()) {
            layout.heights.push(ChatLineView::new(line).height(content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(lines.len(), content_width);

        // 2. Any append pins the view to the newest line again
        if appended {
            self.state.stick_to_bottom = true;
        }

        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            let max_y = self.state.max_scroll_offset();
            self.state.set_offset(max_y);
        } else {
            self.state.clamp_scroll();
        }

        // 3. Draw the visible lines into a ScrollView canvas
        let total_height = self.state.total_height();
        let scroll_offset = self.state.scroll_offset();
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset = self.state.layout.top_of(visible_range.start);
        for i in visible_range {
            let height = self.state.layout.heights[i];
            let view = ChatLineView::new(&lines[i]);
            scroll_view.render_widget(view, Rect::new(0, y_offset, content_width, height));
            y_offset = y_offset.saturating_add(height);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Handled on the state rather than `ChatWindow` because scrolling must
/// survive across frames while `ChatWindow` is rebuilt every frame.
impl EventHandler for ChatWindowState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let page = self.viewport_height.saturating_sub(1).max(1);
        match event {
            TuiEvent::ScrollUp => self.scroll_up_by(1),
            TuiEvent::ScrollDown => self.scroll_down_by(1),
            TuiEvent::ScrollPageUp => self.scroll_up_by(page),
            TuiEvent::ScrollPageDown => self.scroll_down_by(page),
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    line_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            line_count: 0,
            content_width: 0,
        }
    }

    /// How many cached heights are still valid.
    pub fn reusable_count(&self, line_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || line_count < self.line_count {
            return 0;
        }
        self.heights.len().min(line_count)
    }

    pub fn update_metadata(&mut self, line_count: usize, content_width: u16) {
        self.line_count = line_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Canvas row where line `index` starts.
    pub fn top_of(&self, index: usize) -> u16 {
        match index {
            0 => 0,
            i => self.prefix_heights.get(i - 1).copied().unwrap_or(0),
        }
    }

    /// Lines intersecting the viewport, padded by half a viewport each way.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
