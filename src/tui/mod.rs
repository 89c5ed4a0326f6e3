//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The loop sleeps up to 250ms waiting for input and only redraws after an
//! event or a backend result arrived. Backend results are drained every
//! iteration, so a reply shows up within one poll interval.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::backend::dispatch::{spawn_feedback, spawn_query, spawn_resummarize};
use crate::backend::{QueryBackend, Rating};
use crate::core::action::{Action, Effect, update};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{ChatWindowState, InputBox, InputEvent};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(250);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub chat_window: ChatWindowState,
    pub input_box: InputBox,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            chat_window: ChatWindowState::new(),
            input_box: InputBox::new(),
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets us tell Shift+Enter from Enter;
        // terminals without it ignore the escape sequence.
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Route one terminal event. Returns the effect the caller must run.
///
/// Scrolling goes to the chat window. Rating, regenerate and quit go straight
/// to `update`. Everything else is editing handled by the input box.
fn handle_tui_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Effect {
    match event {
        TuiEvent::ForceQuit => update(app, Action::Quit),
        TuiEvent::RateLike => update(app, Action::Rate(Rating::Like)),
        TuiEvent::RateDislike => update(app, Action::Rate(Rating::Dislike)),
        TuiEvent::Regenerate => update(app, Action::Regenerate),
        TuiEvent::Resize => Effect::None,
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.chat_window.handle_event(&event);
            Effect::None
        }
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => update(app, Action::Submit(text)),
            Some(InputEvent::ContentChanged) | None => Effect::None,
        },
    }
}

/// Start whatever I/O an effect asks for. Returns `true` on quit.
fn run_effect(effect: Effect, backend: &Arc<dyn QueryBackend>, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SendQuery { request_id, query } => {
            // Handle dropped: requests are never cancelled
            spawn_query(backend.clone(), request_id, query, tx.clone());
            false
        }
        Effect::Resummarize {
            request_id,
            request,
        } => {
            spawn_resummarize(backend.clone(), request_id, request, tx.clone());
            false
        }
        Effect::SendFeedback(feedback) => {
            spawn_feedback(backend.clone(), feedback, tx.clone());
            false
        }
    }
}

pub fn run(backend: Arc<dyn QueryBackend>) -> std::io::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let terminal_mode_guard = TerminalModeGuard::new();

    let result = event_loop(&mut terminal, backend);

    drop(terminal_mode_guard);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, backend: Arc<dyn QueryBackend>) -> std::io::Result<()> {
    let mut app = App::new(backend.clone());
    let mut tui = TuiState::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    while !should_quit {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(IDLE_POLL)?;
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = handle_tui_event(&mut app, &mut tui, event);
            if run_effect(effect, &backend, &tx) {
                should_quit = true;
                break;
            }
        }

        // Results from backend tasks, in arrival order
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if run_effect(effect, &backend, &tx) {
                should_quit = true;
            }
        }
    }

    info!(
        "Shutting down with {} line(s) in the log, {} request(s) still in flight",
        app.log.len(),
        app.in_flight.len()
    );
    Ok(())
}
