//! Turns failed attempts into [`NormalizedError`]s.

use crate::error::{ErrorKind, NormalizedError};
use crate::response::ResponseEnvelope;
use serde_json::Value;

/// Maximum number of characters kept from a raw error body.
pub const BODY_EXCERPT_LIMIT: usize = 200;

const TRUNCATION_MARKER: &str = "...";

/// A failed physical attempt, before normalization.
#[derive(Debug)]
pub(crate) enum Failure {
    /// No response was received.
    Transport(reqwest::Error),
    /// A response with a status of 400 or above was received.
    Status(ResponseEnvelope),
}

impl Failure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Failure::Transport(_) => ErrorKind::Network,
            Failure::Status(envelope) => ErrorKind::from_status(envelope.status),
        }
    }
}

/// Produces the error surfaced for a logical call whose last attempt failed.
pub(crate) fn normalize(failure: Failure, attempts: u32) -> NormalizedError {
    let kind = failure.kind();
    match failure {
        Failure::Transport(error) => NormalizedError {
            kind,
            status: None,
            message: transport_message(&error),
            body_excerpt: None,
            retryable: kind.is_retryable(),
            attempts,
        },
        Failure::Status(envelope) => {
            let message = match &envelope.body {
                Value::Null => envelope
                    .status
                    .canonical_reason()
                    .unwrap_or("empty response body")
                    .to_string(),
                body => extract_message(body),
            };
            let body_excerpt = if envelope.raw_body.is_empty() {
                None
            } else {
                Some(
                    envelope
                        .raw_body
                        .chars()
                        .take(BODY_EXCERPT_LIMIT)
                        .collect(),
                )
            };

            NormalizedError {
                kind,
                status: Some(envelope.status),
                message,
                body_excerpt,
                retryable: kind.is_retryable(),
                attempts,
            }
        }
    }
}

/// Extracts a human-readable message from an error body.
///
/// Strings are truncated to [`BODY_EXCERPT_LIMIT`] characters. Objects yield their
/// `message` field, or their `errors` list joined with `, `; any other structure
/// is serialized as JSON.
pub fn extract_message(body: &Value) -> String {
    match body {
        Value::String(text) => truncate(text, BODY_EXCERPT_LIMIT),
        Value::Object(map) => {
            if let Some(message) = map.get("message").filter(|m| !is_blank(m)) {
                return value_to_text(message);
            }
            if let Some(Value::Array(errors)) = map.get("errors") {
                return errors
                    .iter()
                    .map(|entry| match entry.get("message").filter(|m| !is_blank(m)) {
                        Some(message) => value_to_text(message),
                        None => value_to_text(entry),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
            }
            body.to_string()
        }
        Value::Array(_) => body.to_string(),
        other => value_to_text(other),
    }
}

/// Cuts `text` to `limit` characters, appending a marker when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}{}", &text[..end], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a transport error with its whole source chain.
fn transport_message(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, StatusCode};
    use serde_json::json;

    fn failed(status: StatusCode, body: &str, content_type: &str) -> Failure {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, content_type.parse().unwrap());
        Failure::Status(ResponseEnvelope::new(status, headers, body.to_string()))
    }

    #[test]
    fn test_truncates_long_string_body() {
        let body = "x".repeat(300);
        let message = extract_message(&Value::String(body));
        assert_eq!(message, format!("{}...", "x".repeat(200)));
    }

    #[test]
    fn test_short_string_body_untouched() {
        let body = "y".repeat(200);
        assert_eq!(extract_message(&Value::String(body.clone())), body);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let body = "é".repeat(201);
        let truncated = truncate(&body, 200);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_message_field_used_verbatim() {
        let body = json!({"message": "Invalid access token.", "errors": [{"message": "x"}]});
        assert_eq!(extract_message(&body), "Invalid access token.");
    }

    #[test]
    fn test_errors_list_joined() {
        let body = json!({"errors": [{"message": "a"}, {"message": "b"}]});
        assert_eq!(extract_message(&body), "a, b");
    }

    #[test]
    fn test_errors_list_without_message_fields() {
        let body = json!({"errors": ["user not authorized", {"code": 7}]});
        assert_eq!(extract_message(&body), r#"user not authorized, {"code":7}"#);
    }

    #[test]
    fn test_other_structures_serialized() {
        let body = json!({"errors": {"name": ["is required"]}});
        assert_eq!(extract_message(&body), r#"{"errors":{"name":["is required"]}}"#);
        assert_eq!(extract_message(&json!([1, 2])), "[1,2]");
        assert_eq!(extract_message(&json!(42)), "42");
    }

    #[test]
    fn test_normalize_html_error_page() {
        let page = format!("<html><body>{}</body></html>", "Service Unavailable ".repeat(20));
        let error = normalize(failed(StatusCode::SERVICE_UNAVAILABLE, &page, "text/html"), 4);

        assert_eq!(error.kind, ErrorKind::ServerError);
        assert_eq!(error.status, Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(error.retryable);
        assert_eq!(error.attempts, 4);
        assert!(error.message.starts_with("<html><body>Service"));
        assert!(error.message.ends_with("..."));
        assert_eq!(error.body_excerpt.as_ref().map(|e| e.chars().count()), Some(200));
    }

    #[test]
    fn test_normalize_json_client_error() {
        let error = normalize(
            failed(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"errors":[{"message":"a"},{"message":"b"}]}"#,
                "application/json",
            ),
            1,
        );
        assert_eq!(error.kind, ErrorKind::ClientError);
        assert_eq!(error.message, "a, b");
        assert!(!error.retryable);
    }

    #[test]
    fn test_normalize_empty_body_uses_reason() {
        let error = normalize(failed(StatusCode::TOO_MANY_REQUESTS, "", "text/plain"), 4);
        assert_eq!(error.kind, ErrorKind::RateLimited);
        assert_eq!(error.message, "Too Many Requests");
        assert_eq!(error.body_excerpt, None);
    }
}
