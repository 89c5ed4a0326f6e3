pub mod client;
pub mod dispatch;
pub mod types;

pub use client::{BackendError, HttpBackend, QueryBackend};
pub use types::{FeedbackRequest, MISSING_SUMMARY, Query, Rating, RegenerateRequest, Reply};
