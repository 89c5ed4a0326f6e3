//! # Actions
//!
//! Everything that can happen in querybox becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ReplyReceived { .. }`.
//!
//! `update()` applies an action to the state and returns the `Effect` the
//! caller has to run. No I/O here; requests are spawned by the caller.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::backend::{FeedbackRequest, Query, Rating, RegenerateRequest, Reply};
use crate::core::chat_log::Sender;
use crate::core::state::{App, Exchange};

#[derive(Debug)]
pub enum Action {
    /// The input box was submitted with this text (possibly empty).
    Submit(String),
    ReplyReceived { request_id: u64, reply: Reply },
    QueryFailed { request_id: u64, error: String },
    /// Rate the most recent reply.
    Rate(Rating),
    /// Ask the backend to re-word the most recent reply.
    Regenerate,
    FeedbackSent { ok: bool },
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    SendQuery { request_id: u64, query: Query },
    SendFeedback(FeedbackRequest),
    /// Resummarize replies come back as `ReplyReceived` like any query.
    Resummarize { request_id: u64, request: RegenerateRequest },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            app.log.append(Sender::User, text.clone());
            let request_id = app.allocate_request_id();
            app.in_flight.insert(request_id, text.clone());
            app.status_message = waiting_status(app.in_flight.len());
            info!("Submitting query #{} ({} in flight)", request_id, app.in_flight.len());
            Effect::SendQuery {
                request_id,
                query: Query::new(text),
            }
        }
        Action::ReplyReceived { request_id, reply } => {
            let summary = reply.summary_text();
            let query = app.in_flight.remove(&request_id).unwrap_or_default();
            debug!(
                "Reply for query #{}: summary_len={}, critic={:?}",
                request_id,
                summary.len(),
                reply.feedback
            );
            app.log.append(Sender::Bot, summary.clone());
            // Critic commentary goes to the status bar, never into the log
            app.status_message = if app.is_waiting() {
                waiting_status(app.in_flight.len())
            } else {
                reply
                    .critique()
                    .map(|critique| format!("Critic: {critique}"))
                    .unwrap_or_default()
            };
            app.last_exchange = Some(Exchange {
                query,
                summary,
                chat_id: reply.chat_id,
            });
            Effect::None
        }
        Action::QueryFailed { request_id, error } => {
            // Failures stay out of the chat window; the log file is the only trace.
            warn!("Query #{} failed: {}", request_id, error);
            app.in_flight.remove(&request_id);
            app.status_message = waiting_status(app.in_flight.len());
            Effect::None
        }
        Action::Rate(rating) => match &app.last_exchange {
            Some(exchange) => {
                app.status_message = format!("Sending feedback ({})...", rating.label());
                Effect::SendFeedback(FeedbackRequest {
                    rating,
                    feedback: String::new(),
                    message: exchange.summary.clone(),
                    query: exchange.query.clone(),
                    chat_id: exchange.chat_id.clone(),
                })
            }
            None => {
                app.status_message = String::from("Nothing to rate yet");
                Effect::None
            }
        },
        Action::Regenerate => match &app.last_exchange {
            Some(exchange) => {
                let request = RegenerateRequest {
                    query: exchange.query.clone(),
                    chat_id: exchange.chat_id.clone(),
                };
                let request_id = app.allocate_request_id();
                app.in_flight.insert(request_id, request.query.clone());
                app.status_message = String::from("Regenerating...");
                info!("Resummarizing as request #{}", request_id);
                Effect::Resummarize {
                    request_id,
                    request,
                }
            }
            None => {
                app.status_message = String::from("Nothing to regenerate yet");
                Effect::None
            }
        },
        Action::FeedbackSent { ok } => {
            app.status_message = if ok {
                String::from("Feedback sent")
            } else {
                String::from("Feedback failed")
            };
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn waiting_status(in_flight: usize) -> String {
    match in_flight {
        0 => String::new(),
        1 => String::from("Waiting for reply..."),
        n => format!("Waiting for {n} replies..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use serde_json::json;

    fn reply(body: serde_json::Value) -> Reply {
        Reply::from_body(body).unwrap()
    }

    fn answer(app: &mut App, request_id: u64, body: serde_json::Value) {
        update(
            app,
            Action::ReplyReceived {
                request_id,
                reply: reply(body),
            },
        );
    }

    #[test]
    fn test_submit_appends_user_line_and_sends() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("hello".to_string()));

        assert_eq!(app.log.len(), 1);
        assert_eq!(app.log.lines()[0].sender, Sender::User);
        assert_eq!(app.log.lines()[0].message, "hello");
        assert_eq!(
            effect,
            Effect::SendQuery {
                request_id: 1,
                query: Query::new("hello"),
            }
        );
        assert!(app.is_waiting());
    }

    #[test]
    fn test_empty_submit_still_sends() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit(String::new()));

        assert_eq!(app.log.lines()[0].sender, Sender::User);
        assert_eq!(app.log.lines()[0].message, "");
        assert!(matches!(effect, Effect::SendQuery { ref query, .. } if query.query.is_empty()));
    }

    #[test]
    fn test_reply_appends_bot_line_after_user_line() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        let effect = update(
            &mut app,
            Action::ReplyReceived {
                request_id: 1,
                reply: reply(json!({"summary": "hi there"})),
            },
        );

        assert_eq!(effect, Effect::None);
        assert_eq!(app.log.len(), 2);
        assert_eq!(app.log.lines()[1].sender, Sender::Bot);
        assert_eq!(app.log.lines()[1].message, "hi there");
        assert!(!app.is_waiting());
        assert_eq!(app.status_message, "");
    }

    #[test]
    fn test_reply_without_summary_renders_placeholder() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(
            &mut app,
            Action::ReplyReceived {
                request_id: 1,
                reply: reply(json!({"detail": "oops"})),
            },
        );
        assert_eq!(app.log.lines()[1].message, "undefined");
    }

    #[test]
    fn test_failure_renders_nothing() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        let effect = update(
            &mut app,
            Action::QueryFailed {
                request_id: 1,
                error: "connection refused".to_string(),
            },
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.log.len(), 1);
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_two_rapid_submissions_each_send() {
        let mut app = test_app();
        let first = update(&mut app, Action::Submit("one".to_string()));
        let second = update(&mut app, Action::Submit("two".to_string()));

        assert!(matches!(first, Effect::SendQuery { request_id: 1, .. }));
        assert!(matches!(second, Effect::SendQuery { request_id: 2, .. }));
        assert_eq!(app.status_message, "Waiting for 2 replies...");
    }

    #[test]
    fn test_replies_render_in_arrival_order() {
        let mut app = test_app();
        update(&mut app, Action::Submit("slow".to_string()));
        update(&mut app, Action::Submit("fast".to_string()));

        // #2 answers first
        update(
            &mut app,
            Action::ReplyReceived {
                request_id: 2,
                reply: reply(json!({"summary": "fast answer"})),
            },
        );
        update(
            &mut app,
            Action::ReplyReceived {
                request_id: 1,
                reply: reply(json!({"summary": "slow answer"})),
            },
        );

        let messages: Vec<&str> = app.log.lines().iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["slow", "fast", "fast answer", "slow answer"]);
        // The exchange pairs the reply with its own query, not the latest one
        let exchange = app.last_exchange.as_ref().unwrap();
        assert_eq!(exchange.query, "slow");
        assert_eq!(exchange.summary, "slow answer");
    }

    #[test]
    fn test_rate_without_reply_is_noop() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Rate(Rating::Like));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.status_message, "Nothing to rate yet");
    }

    #[test]
    fn test_rate_builds_feedback_from_last_exchange() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        update(
            &mut app,
            Action::ReplyReceived {
                request_id: 1,
                reply: reply(json!({"summary": "hi there", "chat_id": "c-9"})),
            },
        );

        let effect = update(&mut app, Action::Rate(Rating::Dislike));
        assert_eq!(
            effect,
            Effect::SendFeedback(FeedbackRequest {
                rating: Rating::Dislike,
                feedback: String::new(),
                message: "hi there".to_string(),
                query: "hello".to_string(),
                chat_id: Some("c-9".to_string()),
            })
        );

        update(&mut app, Action::FeedbackSent { ok: true });
        assert_eq!(app.status_message, "Feedback sent");
        update(&mut app, Action::FeedbackSent { ok: false });
        assert_eq!(app.status_message, "Feedback failed");
    }

    #[test]
    fn test_critic_feedback_shown_in_status() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        answer(&mut app, 1, json!({"summary": "hi there", "feedback": "Could cite a source."}));

        assert_eq!(app.status_message, "Critic: Could cite a source.");
        // The chat window only ever gets the summary
        assert_eq!(app.log.lines()[1].message, "hi there");
    }

    #[test]
    fn test_blank_critic_feedback_clears_status() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        answer(&mut app, 1, json!({"summary": "hi there", "feedback": ""}));
        assert_eq!(app.status_message, "");
    }

    #[test]
    fn test_waiting_status_wins_over_critic_feedback() {
        let mut app = test_app();
        update(&mut app, Action::Submit("one".to_string()));
        update(&mut app, Action::Submit("two".to_string()));
        answer(&mut app, 1, json!({"summary": "first", "feedback": "fine"}));
        assert_eq!(app.status_message, "Waiting for reply...");
    }

    #[test]
    fn test_regenerate_without_reply_is_noop() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Regenerate), Effect::None);
        assert_eq!(app.status_message, "Nothing to regenerate yet");
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_regenerate_resends_last_query() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        answer(&mut app, 1, json!({"summary": "hi there", "chat_id": "c-9"}));

        let effect = update(&mut app, Action::Regenerate);
        assert_eq!(
            effect,
            Effect::Resummarize {
                request_id: 2,
                request: RegenerateRequest {
                    query: "hello".to_string(),
                    chat_id: Some("c-9".to_string()),
                },
            }
        );
        assert_eq!(app.status_message, "Regenerating...");
        assert!(app.is_waiting());

        // The new wording lands as another Bot line and becomes the rated reply
        answer(&mut app, 2, json!({"summary": "hello to you too"}));
        let messages: Vec<&str> = app.log.lines().iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["hello", "hi there", "hello to you too"]);
        let exchange = app.last_exchange.as_ref().unwrap();
        assert_eq!(exchange.query, "hello");
        assert_eq!(exchange.summary, "hello to you too");
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_failed_regenerate_renders_nothing() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".to_string()));
        answer(&mut app, 1, json!({"summary": "hi there"}));
        update(&mut app, Action::Regenerate);

        update(
            &mut app,
            Action::QueryFailed {
                request_id: 2,
                error: "connection reset".to_string(),
            },
        );
        assert_eq!(app.log.len(), 2);
        assert!(!app.is_waiting());
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
