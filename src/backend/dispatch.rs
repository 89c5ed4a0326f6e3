//! Runs backend effects as detached tokio tasks.
//!
//! Each request gets its own task. Results come back to the event loop as
//! [`Action`]s over a channel, in whatever order the backend answers.
//! Tasks are never aborted: a reply is delivered even if the user has
//! submitted again in the meantime.

use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::{info, warn};
use tokio::task::JoinHandle;

use crate::backend::{BackendError, FeedbackRequest, Query, QueryBackend, RegenerateRequest, Reply};
use crate::core::action::Action;

/// Spawns one query request. The handle is only useful to tests; the event
/// loop drops it.
pub fn spawn_query(
    backend: Arc<dyn QueryBackend>,
    request_id: u64,
    query: Query,
    tx: Sender<Action>,
) -> JoinHandle<()> {
    info!("Spawning query #{}", request_id);
    tokio::spawn(async move {
        let result = backend.submit_query(&query).await;
        deliver(request_id, result, &tx);
    })
}

/// Spawns one resummarize request. Its reply is delivered exactly like a
/// query reply, under the given request id.
pub fn spawn_resummarize(
    backend: Arc<dyn QueryBackend>,
    request_id: u64,
    request: RegenerateRequest,
    tx: Sender<Action>,
) -> JoinHandle<()> {
    info!("Spawning resummarize #{}", request_id);
    tokio::spawn(async move {
        let result = backend.resummarize(&request).await;
        deliver(request_id, result, &tx);
    })
}

fn deliver(request_id: u64, result: Result<Reply, BackendError>, tx: &Sender<Action>) {
    let action = match result {
        Ok(reply) => Action::ReplyReceived { request_id, reply },
        Err(e) => Action::QueryFailed {
            request_id,
            error: e.to_string(),
        },
    };
    if tx.send(action).is_err() {
        warn!("Dropping result of request #{}: receiver gone", request_id);
    }
}

pub fn spawn_feedback(
    backend: Arc<dyn QueryBackend>,
    feedback: FeedbackRequest,
    tx: Sender<Action>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ok = match backend.send_feedback(&feedback).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Feedback failed: {}", e);
                false
            }
        };
        if tx.send(Action::FeedbackSent { ok }).is_err() {
            warn!("Dropping feedback result: receiver gone");
        }
    })
}
