//! # Application State
//!
//! Core business state for querybox. Domain logic only, no TUI types.
//! Presentation state (scroll position, input buffer) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn QueryBackend>     // where queries go
//! ├── log: ChatLog                       // rendered lines, append-only
//! ├── status_message: String             // status bar text
//! ├── next_request_id: u64               // per-submission counter
//! ├── in_flight: HashMap<u64, String>    // request id → query text
//! └── last_exchange: Option<Exchange>    // most recent reply, for feedback
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::QueryBackend;
use crate::core::chat_log::ChatLog;

/// A query paired with the reply that answered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub query: String,
    pub summary: String,
    pub chat_id: Option<String>,
}

pub struct App {
    pub backend: Arc<dyn QueryBackend>,
    pub log: ChatLog,
    pub status_message: String,
    pub next_request_id: u64,
    pub in_flight: HashMap<u64, String>,
    pub last_exchange: Option<Exchange>,
}

impl App {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            backend,
            log: ChatLog::new(),
            status_message: String::from("Type a message and press Enter"),
            next_request_id: 1,
            in_flight: HashMap::new(),
            last_exchange: None,
        }
    }

    /// Hands out the next request id.
    pub fn allocate_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn is_waiting(&self) -> bool {
        !self.in_flight.is_empty()
    }
}
