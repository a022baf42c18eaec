//! Response types.
//!
//! [`ResponseEnvelope`] is what a single physical exchange produces; [`Response`]
//! is what a whole logical call hands back to the caller, after pagination.

use http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// One received HTTP response, with its body read and decoded.
#[derive(Debug, Clone)]
pub(crate) struct ResponseEnvelope {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw_body: String,
    pub content_type: Option<String>,
}

impl ResponseEnvelope {
    pub fn new(status: StatusCode, headers: HeaderMap, raw_body: String) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = decode_body(&raw_body, content_type.as_deref());

        Self {
            status,
            headers,
            body,
            raw_body,
            content_type,
        }
    }

    /// Returns `true` if the declared content type is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// Decodes a body the way the origin's clients usually see it.
///
/// Empty bodies become `null`. Bodies declared as JSON, or that look like a JSON
/// object or array, are parsed; anything that fails to parse (HTML error pages,
/// plain text) is kept as a JSON string.
pub(crate) fn decode_body(raw: &str, content_type: Option<&str>) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    let declared_json =
        content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if declared_json || trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }

    Value::String(raw.to_string())
}

/// The result of a successful logical call.
///
/// For paginated endpoints `data` holds every page concatenated in order, while
/// `status` and `headers` are those of the first page.
///
/// # Examples
///
/// ```no_run
/// use canvas_api::{Client, RequestDescriptor};
///
/// # async fn example() -> Result<(), canvas_api::Error> {
/// let client = Client::builder()
///     .token("secret")
///     .domain("canvas.example.edu")
///     .build()?;
///
/// let response = client.execute(&RequestDescriptor::get("/courses")).await?;
/// println!("{} pages, {} attempts, took {:?}", response.pages, response.attempts, response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The response data.
    pub data: T,

    /// The raw response body.
    ///
    /// For an aggregated result this is the JSON serialization of all pages.
    pub raw_body: String,

    /// The HTTP status code of the (first) response.
    pub status: StatusCode,

    /// The headers of the (first) response.
    pub headers: HeaderMap,

    /// The declared content type of the (first) response.
    pub content_type: Option<String>,

    /// Time spent on the whole logical call, including retries and pages.
    pub latency: Duration,

    /// Number of physical HTTP attempts made, pages and retries included.
    pub attempts: u32,

    /// Number of pages aggregated into `data` (1 when not paginated).
    pub pages: usize,
}

impl Response<Value> {
    pub(crate) fn from_envelope(
        envelope: ResponseEnvelope,
        latency: Duration,
        attempts: u32,
        pages: usize,
    ) -> Self {
        Self {
            data: envelope.body,
            raw_body: envelope.raw_body,
            status: envelope.status,
            headers: envelope.headers,
            content_type: envelope.content_type,
            latency,
            attempts,
            pages,
        }
    }
}

impl<T> Response<T> {
    /// Maps the response data to a different type, keeping the metadata.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            content_type: self.content_type,
            latency: self.latency,
            attempts: self.attempts,
            pages: self.pages,
        }
    }

    /// Returns `true` if more physical attempts than pages were needed.
    pub fn was_retried(&self) -> bool {
        self.attempts as usize > self.pages
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_decode_json_body() {
        let value = decode_body(r#"[{"id":1}]"#, Some("application/json; charset=utf-8"));
        assert_eq!(value, json!([{"id": 1}]));
    }

    #[test]
    fn test_decode_html_body_as_string() {
        let html = "<html><body>Bad Gateway</body></html>";
        assert_eq!(
            decode_body(html, Some("text/html")),
            Value::String(html.to_string())
        );
    }

    #[test]
    fn test_decode_malformed_json_as_string() {
        let value = decode_body("{not json", Some("application/json"));
        assert_eq!(value, Value::String("{not json".to_string()));
    }

    #[test]
    fn test_decode_empty_body() {
        assert_eq!(decode_body("", Some("application/json")), Value::Null);
        assert_eq!(decode_body("  \n", None), Value::Null);
    }

    #[test]
    fn test_decode_undeclared_json_object() {
        let value = decode_body(r#"{"message":"nope"}"#, Some("text/plain"));
        assert_eq!(value, json!({"message": "nope"}));
    }

    #[test]
    fn test_envelope_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        let envelope = ResponseEnvelope::new(StatusCode::OK, headers, "[]".to_string());
        assert!(envelope.is_json());
        assert_eq!(envelope.body, json!([]));

        let envelope = ResponseEnvelope::new(StatusCode::OK, HeaderMap::new(), "[]".to_string());
        assert!(!envelope.is_json());
    }

    #[test]
    fn test_was_retried() {
        let response = Response {
            data: (),
            raw_body: String::new(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content_type: None,
            latency: Duration::from_millis(5),
            attempts: 3,
            pages: 3,
        };
        assert!(!response.was_retried());

        let response = Response {
            attempts: 4,
            ..response
        };
        assert!(response.was_retried());
    }
}
