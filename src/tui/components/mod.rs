//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: backend and status line
//! - `ChatLineView`: one `**Sender:** message` line of the log
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: message editor, emits `Submit` on Enter
//! - `ChatWindow`: scrollable log, pinned to the newest line on every append
//!
//! Each file carries its own state type, event type, rendering and tests.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── chat_line.rs
//! ├── chat_window.rs
//! └── input_box/
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod chat_line;
pub mod chat_window;
pub mod input_box;
pub use chat_window::{ChatWindow, ChatWindowState};
pub use input_box::{InputBox, InputEvent};
