//! Request descriptors.

use http::Method;
use serde_json::Value;

/// Everything needed to issue one logical call: method, path, query and body.
///
/// Paths are relative to the API root (`https://{domain}/api/v1`). Query parameters
/// keep their insertion order and may repeat; list-valued parameters use the
/// `key[]=value` convention of the Canvas API.
///
/// # Examples
///
/// ```
/// use canvas_api::RequestDescriptor;
///
/// let descriptor = RequestDescriptor::get("/courses/42/assignments")
///     .with_query_list("include", ["submission", "rubric"])
///     .with_query("order_by", "due_at");
///
/// assert_eq!(
///     descriptor.query,
///     vec![
///         ("include[]".to_string(), "submission".to_string()),
///         ("include[]".to_string(), "rubric".to_string()),
///         ("order_by".to_string(), "due_at".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The request path, relative to the API root.
    pub path: String,

    /// Query parameters, in order.
    pub query: Vec<(String, String)>,

    /// Optional JSON body.
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Creates a descriptor with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends a query parameter. Repeated keys are kept.
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter only when `value` is `Some`.
    pub fn with_optional_query<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_query(key, value),
            None => self,
        }
    }

    /// Appends a list parameter as repeated `key[]=value` pairs.
    pub fn with_query_list<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let key = format!("{key}[]");
        self.query
            .extend(values.into_iter().map(|v| (key.clone(), v.to_string())));
        self
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self::get("")
    }
}
