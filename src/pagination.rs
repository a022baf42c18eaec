//! Link-header pagination.
//!
//! List endpoints return one page at a time and advertise the following page
//! through a `Link` header such as
//! `<https://canvas.example.edu/api/v1/courses?page=2>; rel="next", <...>; rel="last"`.

use crate::response::ResponseEnvelope;
use http::{header::LINK, HeaderMap};
use serde_json::Value;
use url::Url;

/// The location of the next page, taken from a single response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(String);

impl PageCursor {
    /// Extracts the `rel="next"` target from the response headers, if any.
    ///
    /// Several `Link` field lines are read as one comma-separated list.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let link = headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        next_page_url(&link).map(PageCursor)
    }

    /// The URL exactly as advertised.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves the cursor against `base`; absolute URLs are returned unchanged.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&self.0)
    }
}

/// Returns the URL of the `rel="next"` entry of a `Link` header value.
///
/// # Examples
///
/// ```
/// use canvas_api::pagination::next_page_url;
///
/// let header = r#"<https://x/api/v1/courses?page=2>; rel="next", <https://x/api/v1/courses?page=1>; rel="prev""#;
/// assert_eq!(next_page_url(header).as_deref(), Some("https://x/api/v1/courses?page=2"));
/// assert_eq!(next_page_url(r#"<https://x/a>; rel="last""#), None);
/// ```
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header
        .split(',')
        .find(|entry| entry.contains(r#"rel="next""#))
        .and_then(|entry| {
            let start = entry.find('<')? + 1;
            let len = entry[start..].find('>')?;
            (len > 0).then(|| entry[start..start + len].to_string())
        })
}

/// Returns `true` when a successful response is the first of several pages.
pub(crate) fn is_paginated(envelope: &ResponseEnvelope) -> bool {
    envelope.body.is_array()
        && envelope.is_json()
        && PageCursor::from_headers(&envelope.headers).is_some()
}

/// Accumulates page bodies in the order they were received.
#[derive(Debug)]
pub(crate) struct PageBuffer {
    first: ResponseEnvelope,
    items: Vec<Value>,
    pages: usize,
}

impl PageBuffer {
    /// Starts a buffer from the first page. The first page's body must be an array.
    pub fn new(mut first: ResponseEnvelope) -> Self {
        let items = match first.body.take() {
            Value::Array(items) => items,
            other => vec![other],
        };
        Self {
            first,
            items,
            pages: 1,
        }
    }

    /// Appends the items of a following page.
    pub fn push(&mut self, page: ResponseEnvelope) -> Result<(), String> {
        match page.body {
            Value::Array(items) => {
                self.items.extend(items);
                self.pages += 1;
                Ok(())
            }
            other => Err(format!(
                "expected a JSON array on page {}, got {}",
                self.pages + 1,
                json_type_name(&other)
            )),
        }
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Returns the first page's envelope carrying every collected item.
    pub fn finish(self) -> (ResponseEnvelope, usize) {
        let mut envelope = self.first;
        let body = Value::Array(self.items);
        envelope.raw_body = body.to_string();
        envelope.body = body;
        (envelope, self.pages)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, StatusCode};
    use serde_json::json;

    fn envelope(body: &str, link: Option<&str>) -> ResponseEnvelope {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        if let Some(link) = link {
            headers.insert(LINK, HeaderValue::from_str(link).unwrap());
        }
        ResponseEnvelope::new(StatusCode::OK, headers, body.to_string())
    }

    #[test]
    fn test_next_first() {
        let header = r#"<url2>; rel="next", <url1>; rel="prev""#;
        assert_eq!(next_page_url(header).as_deref(), Some("url2"));
    }

    #[test]
    fn test_next_in_any_position() {
        let header = concat!(
            r#"<https://c.test/api/v1/courses?page=1&per_page=10>; rel="current","#,
            r#"<https://c.test/api/v1/courses?page=1&per_page=10>; rel="first","#,
            r#" <https://c.test/api/v1/courses?page=2&per_page=10>; rel="next","#,
            r#"<https://c.test/api/v1/courses?page=5&per_page=10>; rel="last""#
        );
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://c.test/api/v1/courses?page=2&per_page=10")
        );
    }

    #[test]
    fn test_no_next() {
        assert_eq!(next_page_url(r#"<url1>; rel="prev", <url0>; rel="first""#), None);
        assert_eq!(next_page_url(""), None);
        assert_eq!(next_page_url(r#"rel="next""#), None);
    }

    #[test]
    fn test_cursor_absent_without_header() {
        assert_eq!(PageCursor::from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cursor_reads_every_link_line() {
        let mut headers = HeaderMap::new();
        headers.append(LINK, HeaderValue::from_static(r#"<u1>; rel="current""#));
        headers.append(LINK, HeaderValue::from_static(r#"<u2>; rel="next""#));
        assert_eq!(
            PageCursor::from_headers(&headers).as_ref().map(PageCursor::as_str),
            Some("u2")
        );
    }

    #[test]
    fn test_cursor_resolves_relative_urls() {
        let base = Url::parse("https://c.test/api/v1/").unwrap();
        let cursor = PageCursor("/api/v1/courses?page=2".to_string());
        assert_eq!(
            cursor.resolve(&base).unwrap().as_str(),
            "https://c.test/api/v1/courses?page=2"
        );

        let cursor = PageCursor("https://other.test/api/v1/courses?page=2".to_string());
        assert_eq!(
            cursor.resolve(&base).unwrap().as_str(),
            "https://other.test/api/v1/courses?page=2"
        );
    }

    #[test]
    fn test_is_paginated() {
        assert!(is_paginated(&envelope("[1]", Some(r#"<u2>; rel="next""#))));
        assert!(!is_paginated(&envelope("[1]", Some(r#"<u2>; rel="last""#))));
        assert!(!is_paginated(&envelope("[1]", None)));
        assert!(!is_paginated(&envelope(r#"{"id":1}"#, Some(r#"<u2>; rel="next""#))));

        let mut plain = envelope("[1]", Some(r#"<u2>; rel="next""#));
        plain.content_type = Some("text/plain".to_string());
        assert!(!is_paginated(&plain));
    }

    #[test]
    fn test_buffer_concatenates_in_order() {
        let mut buffer = PageBuffer::new(envelope(r#"[{"id":1},{"id":2}]"#, None));
        buffer.push(envelope(r#"[{"id":3}]"#, None)).unwrap();
        buffer.push(envelope("[]", None)).unwrap();
        buffer.push(envelope(r#"[{"id":4}]"#, None)).unwrap();

        let (merged, pages) = buffer.finish();
        assert_eq!(pages, 4);
        assert_eq!(merged.body, json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]));
        assert_eq!(merged.raw_body, r#"[{"id":1},{"id":2},{"id":3},{"id":4}]"#);
    }

    #[test]
    fn test_buffer_rejects_non_array_page() {
        let mut buffer = PageBuffer::new(envelope("[1]", None));
        let err = buffer.push(envelope(r#"{"id":1}"#, None)).unwrap_err();
        assert_eq!(err, "expected a JSON array on page 2, got an object");
        assert_eq!(buffer.pages(), 1);
    }
}
