//! HTTP client for the chat backend.
//!
//! Sends the query body as JSON and hands back whatever JSON comes out.
//! There is no retry, no timeout, and no authentication. An HTTP error status
//! is not treated as a failure for queries or resummarize requests: the body
//! is parsed regardless, because backends commonly answer errors with a
//! `summary` of their own.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

use super::types::{FeedbackRequest, Query, RegenerateRequest, Reply};

/// Default route for re-wording an earlier answer.
pub const DEFAULT_RESUMMARIZE_PATH: &str = "/resummarize";

/// Errors that can occur while talking to the backend.
#[derive(Debug)]
pub enum BackendError {
    /// Client misconfigured (bad base URL).
    Config(String),
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// The response body was not the JSON we expected.
    Parse(String),
    /// Non-success status on a route where the status carries meaning.
    Api { status: u16, message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Returns a short human-readable description (shown in the title bar).
    fn describe(&self) -> String;

    /// Posts one query and parses the reply.
    async fn submit_query(&self, query: &Query) -> Result<Reply, BackendError>;

    /// Asks for a fresh wording of an earlier answer. Parsed like a query reply.
    async fn resummarize(&self, request: &RegenerateRequest) -> Result<Reply, BackendError>;

    /// Posts a rating for an earlier reply.
    async fn send_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError>;
}

/// Backend reached over HTTP.
pub struct HttpBackend {
    base_url: String,
    query_path: String,
    feedback_path: String,
    resummarize_path: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// `base_url` may or may not end with a slash; paths may or may not start with one.
    pub fn new(base_url: &str, query_path: &str, feedback_path: &str) -> Result<Self, BackendError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| BackendError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        Ok(Self {
            base_url,
            query_path: normalize_path(query_path),
            feedback_path: normalize_path(feedback_path),
            resummarize_path: DEFAULT_RESUMMARIZE_PATH.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn with_resummarize_path(mut self, path: &str) -> Self {
        self.resummarize_path = normalize_path(path);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POSTs `body` as JSON and reads the answer as a [`Reply`].
    ///
    /// The status only gets a warning: the body is parsed regardless. A body
    /// that is not JSON, or is JSON `null`, is a parse error.
    async fn post_for_reply<B>(&self, path: &str, body: &B) -> Result<Reply, BackendError>
    where
        B: Serialize + Sync,
    {
        let url = self.url(path);

        // `.json()` sets `Content-Type: application/json`
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} response status: {}", path, status);
        if !status.is_success() {
            warn!("{} answered HTTP {}; parsing body anyway", path, status.as_u16());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let snippet = || String::from_utf8_lossy(&bytes[..bytes.len().min(200)]).into_owned();

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::Parse(format!("{e} (body: {})", snippet())))?;
        Reply::from_body(value)
            .ok_or_else(|| BackendError::Parse(format!("no reply fields in body: {}", snippet())))
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn submit_query(&self, query: &Query) -> Result<Reply, BackendError> {
        info!("POST {} (query_len={})", self.url(&self.query_path), query.query.len());
        self.post_for_reply(&self.query_path, query).await
    }

    async fn resummarize(&self, request: &RegenerateRequest) -> Result<Reply, BackendError> {
        info!(
            "POST {} (query_len={}, chat_id={:?})",
            self.url(&self.resummarize_path),
            request.query.len(),
            request.chat_id
        );
        self.post_for_reply(&self.resummarize_path, request).await
    }

    async fn send_feedback(&self, feedback: &FeedbackRequest) -> Result<(), BackendError> {
        let url = self.url(&self.feedback_path);
        info!("POST {} (rating={})", url, feedback.rating.label());

        let response = self
            .client
            .post(&url)
            .json(feedback)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Feedback route error: {} - {}", status, message);
            return Err(BackendError::Api { status, message });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_garbage_url() {
        let result = HttpBackend::new("not a url", "/query", "/feedback");
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn test_url_joining_normalizes_slashes() {
        let backend = HttpBackend::new("http://localhost:8000/", "query", "/feedback").unwrap();
        assert_eq!(backend.url(&backend.query_path), "http://localhost:8000/query");
        assert_eq!(
            backend.url(&backend.feedback_path),
            "http://localhost:8000/feedback"
        );
        assert_eq!(backend.describe(), "http://localhost:8000");
        assert_eq!(
            backend.url(&backend.resummarize_path),
            "http://localhost:8000/resummarize"
        );

        let backend = backend.with_resummarize_path("api/reword");
        assert_eq!(
            backend.url(&backend.resummarize_path),
            "http://localhost:8000/api/reword"
        );
    }

    #[test]
    fn test_error_display() {
        let err = BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
        assert_eq!(
            BackendError::Network("refused".into()).to_string(),
            "network error: refused"
        );
    }
}
