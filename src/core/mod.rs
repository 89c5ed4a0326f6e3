//! # Core Application Logic
//!
//! Business logic for querybox. It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • App (state)          │
//!                    │  • ChatLog (lines)      │
//!                    │  • Action / update()    │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │  Backend   │
//!           │  Adapter   │              │ dispatcher │
//!           │ (ratatui)  │              │ (reqwest)  │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`chat_log`]: The append-only list of rendered lines
//! - [`config`]: Layered configuration

pub mod action;
pub mod chat_log;
pub mod config;
pub mod state;
