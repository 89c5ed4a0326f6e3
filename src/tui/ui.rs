use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ChatWindow, TitleBar};

/// Title bar on top, chat window in the middle, editor at the bottom.
pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(input_height)]);
    let [title_area, chat_area, input_area] = layout.areas(frame.area());

    // Chat first so the unseen-content flag reflects this frame's scroll
    ChatWindow::new(&mut tui.chat_window, &app.log).render(frame, chat_area);

    let mut title_bar = TitleBar::new(
        app.backend.describe(),
        app.status_message.clone(),
        tui.chat_window.has_unseen_content(),
    );
    title_bar.render(frame, title_area);

    tui.input_box.render(frame, input_area);
}
