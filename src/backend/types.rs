use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Text rendered in place of a reply that carries no `summary` field.
pub const MISSING_SUMMARY: &str = "undefined";

/// The request body for the query route: the input text, verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Query {
    pub query: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { query: text.into() }
    }
}

/// The backend's answer to a [`Query`].
///
/// Only `summary` is used for rendering. It is kept as a raw JSON value so a
/// missing field, `null`, and non-string values can each be told apart.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Reply {
    #[serde(default, deserialize_with = "present")]
    pub summary: Option<Value>,
    /// Critic commentary some backends attach to the answer.
    #[serde(default, deserialize_with = "lenient_string")]
    pub feedback: Option<String>,
    /// Conversation id assigned by the backend, echoed back with feedback.
    #[serde(default, deserialize_with = "lenient_string")]
    pub chat_id: Option<String>,
}

impl Reply {
    /// Builds a reply from any JSON document.
    ///
    /// Fields are only read from an object. Arrays, strings, numbers and
    /// booleans have no `summary` and give an empty reply. A `null` body has
    /// no fields to read at all and yields `None`.
    pub fn from_body(body: Value) -> Option<Reply> {
        match body {
            Value::Null => None,
            Value::Object(_) => serde_json::from_value(body).ok(),
            _ => Some(Reply::default()),
        }
    }

    /// The message shown for this reply.
    ///
    /// An absent field shows as [`MISSING_SUMMARY`]. Any other value is
    /// stringified the way a browser would coerce it into page text.
    pub fn summary_text(&self) -> String {
        match &self.summary {
            None => MISSING_SUMMARY.to_string(),
            Some(value) => coerce_to_text(value),
        }
    }

    /// Critic commentary, if the backend sent any non-blank text.
    pub fn critique(&self) -> Option<&str> {
        self.feedback
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// String coercion of a JSON value: `[object Object]` for objects,
/// comma-joined elements for arrays (with `null` as empty), shortest
/// round-trip digits for numbers.
fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Integral values lose their fraction (`1.0` is `1`), and magnitudes outside
/// `[1e-6, 1e21)` switch to exponent form with an explicit sign (`1e+21`).
fn number_text(n: &Number) -> String {
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&f.abs()) {
        return format!("{f}");
    }
    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// The request body for the resummarize route: ask for a fresh wording of
/// the answer to `query`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RegenerateRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

/// Maps a present field to `Some`, including an explicit `null`.
/// Absent fields fall through to `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Extras must never make an otherwise usable reply fail to parse:
/// anything that is not a string is dropped.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Like,
    Dislike,
}

impl Rating {
    pub fn label(self) -> &'static str {
        match self {
            Rating::Like => "like",
            Rating::Dislike => "dislike",
        }
    }
}

/// The request body for the feedback route.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FeedbackRequest {
    pub rating: Rating,
    /// Free-text comment. The client never collects one, so this stays empty.
    pub feedback: String,
    /// The rated reply text.
    pub message: String,
    /// The query that produced the reply.
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Contract test: the query body has exactly one field.
    #[test]
    fn test_query_serialization() {
        let serialized = serde_json::to_string(&Query::new("hello")).unwrap();
        assert_eq!(serialized, r#"{"query":"hello"}"#);
    }

    #[test]
    fn test_empty_query_still_serializes() {
        let serialized = serde_json::to_string(&Query::new("")).unwrap();
        assert_eq!(serialized, r#"{"query":""}"#);
    }

    #[test]
    fn test_reply_with_summary() {
        let reply: Reply = serde_json::from_str(r#"{"summary":"hi there"}"#).unwrap();
        assert_eq!(reply.summary_text(), "hi there");
        assert_eq!(reply.chat_id, None);
    }

    #[test]
    fn test_reply_without_summary_uses_placeholder() {
        let reply: Reply = serde_json::from_str(r#"{"answer":"hi there"}"#).unwrap();
        assert_eq!(reply.summary_text(), MISSING_SUMMARY);
    }

    #[test]
    fn test_reply_null_and_non_string_summary() {
        let null: Reply = serde_json::from_str(r#"{"summary":null}"#).unwrap();
        assert_eq!(null.summary_text(), "null");

        let number: Reply = serde_json::from_str(r#"{"summary":42}"#).unwrap();
        assert_eq!(number.summary_text(), "42");

        let flag: Reply = serde_json::from_str(r#"{"summary":false}"#).unwrap();
        assert_eq!(flag.summary_text(), "false");
    }

    #[test]
    fn test_object_summary_renders_as_object_placeholder() {
        let reply = Reply::from_body(json!({"summary": {"text": "hi"}})).unwrap();
        assert_eq!(reply.summary_text(), "[object Object]");
    }

    #[test]
    fn test_array_summary_joins_elements() {
        let reply = Reply::from_body(json!({"summary": [1, 2]})).unwrap();
        assert_eq!(reply.summary_text(), "1,2");

        let reply = Reply::from_body(json!({"summary": ["a", null, [true, {}]]})).unwrap();
        assert_eq!(reply.summary_text(), "a,,true,[object Object]");

        let reply = Reply::from_body(json!({"summary": []})).unwrap();
        assert_eq!(reply.summary_text(), "");
    }

    #[test]
    fn test_number_summaries_use_shortest_form() {
        let cases = [
            ("1.0", "1"),
            ("-0.0", "0"),
            ("0.1", "0.1"),
            ("-2.5", "-2.5"),
            ("0.000001", "0.000001"),
            ("1.5e-7", "1.5e-7"),
            ("1e21", "1e+21"),
            ("123456789012345680000", "123456789012345680000"),
        ];
        for (raw, shown) in cases {
            let reply: Reply = serde_json::from_str(&format!(r#"{{"summary":{raw}}}"#)).unwrap();
            assert_eq!(reply.summary_text(), shown, "summary {raw}");
        }
    }

    #[test]
    fn test_non_object_bodies_have_no_summary() {
        for body in [json!([1, 2]), json!("hello"), json!(42), json!(true)] {
            let reply = Reply::from_body(body.clone()).unwrap();
            assert_eq!(reply.summary_text(), MISSING_SUMMARY, "body {body}");
            assert_eq!(reply.chat_id, None);
        }
    }

    #[test]
    fn test_null_body_is_not_a_reply() {
        assert_eq!(Reply::from_body(Value::Null), None);
    }

    #[test]
    fn test_critique_ignores_blank_feedback() {
        let reply = Reply::from_body(json!({"summary": "ok", "feedback": "  Too vague. "})).unwrap();
        assert_eq!(reply.critique(), Some("Too vague."));

        let blank = Reply::from_body(json!({"summary": "ok", "feedback": "   "})).unwrap();
        assert_eq!(blank.critique(), None);
        assert_eq!(Reply::default().critique(), None);
    }

    #[test]
    fn test_reply_keeps_backend_extras() {
        let reply: Reply = serde_json::from_str(
            r#"{"summary":"ok","feedback":"Clear answer","chat_id":"c-1"}"#,
        )
        .unwrap();
        assert_eq!(reply.feedback.as_deref(), Some("Clear answer"));
        assert_eq!(reply.chat_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_reply_ignores_odd_extras() {
        let reply: Reply =
            serde_json::from_str(r#"{"summary":"ok","chat_id":7,"feedback":null}"#).unwrap();
        assert_eq!(reply.summary_text(), "ok");
        assert_eq!(reply.chat_id, None);
        assert_eq!(reply.feedback, None);
    }

    #[test]
    fn test_feedback_request_serialization() {
        let req = FeedbackRequest {
            rating: Rating::Dislike,
            feedback: String::new(),
            message: "hi there".to_string(),
            query: "hello".to_string(),
            chat_id: None,
        };
        let serialized = serde_json::to_string(&req).unwrap();
        let expected =
            r#"{"rating":"dislike","feedback":"","message":"hi there","query":"hello"}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_regenerate_request_serialization() {
        let req = RegenerateRequest {
            query: "hello".to_string(),
            chat_id: Some("c-1".to_string()),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"query":"hello","chat_id":"c-1"}"#
        );

        let req = RegenerateRequest {
            query: "hello".to_string(),
            chat_id: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"query":"hello"}"#);
    }
}
