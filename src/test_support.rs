//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{BackendError, FeedbackRequest, Query, QueryBackend, RegenerateRequest, Reply};

/// An in-process backend that answers from a script and records every call.
///
/// Queries without a scripted answer fail with a network error.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: HashMap<String, (Value, Duration)>,
    rewordings: HashMap<String, Value>,
    queries: Mutex<Vec<String>>,
    regenerations: Mutex<Vec<RegenerateRequest>>,
    feedback: Mutex<Vec<FeedbackRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, query: &str, body: Value) -> Self {
        self.with_delayed_reply(query, body, Duration::ZERO)
    }

    pub fn with_delayed_reply(mut self, query: &str, body: Value, delay: Duration) -> Self {
        self.replies.insert(query.to_string(), (body, delay));
        self
    }

    /// Scripts the resummarize answer for an earlier query.
    pub fn with_resummarized(mut self, query: &str, body: Value) -> Self {
        self.rewordings.insert(query.to_string(), body);
        self
    }

    /// Every query text received, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn regenerations(&self) -> Vec<RegenerateRequest> {
        self.regenerations.lock().unwrap().clone()
    }

    pub fn feedback(&self) -> Vec<FeedbackRequest> {
        self.feedback.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryBackend for ScriptedBackend {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    async fn submit_query(&self, query: &Query) -> Result<Reply, BackendError> {
        self.queries.lock().unwrap().push(query.query.clone());
        let Some((body, delay)) = self.replies.get(&query.query).cloned() else {
            return Err(BackendError::Network("no scripted reply".to_string()));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply_from(body)
    }

    async fn resummarize(&self, request: &RegenerateRequest) -> Result<Reply, BackendError> {
        self.regenerations.lock().unwrap().push(request.clone());
        match self.rewordings.get(&request.query).cloned() {
            Some(body) => reply_from(body),
            None => Err(BackendError::Network("no scripted rewording".to_string())),
        }
    }

    async fn send_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }
}

fn reply_from(body: Value) -> Result<Reply, BackendError> {
    Reply::from_body(body).ok_or_else(|| BackendError::Parse("null body".to_string()))
}

/// Creates a test App backed by an empty `ScriptedBackend`.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(ScriptedBackend::new()))
}
