//! The request executor.
//!
//! [`Client::execute`] runs one logical call as an explicit pipeline: send the
//! request, and on failure consult the [`RetryPolicy`] and finally the error
//! normalizer; on success follow `rel="next"` links and concatenate the pages.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    descriptor::RequestDescriptor,
    error::NormalizedError,
    normalize::{normalize, Failure},
    pagination::{self, PageBuffer, PageCursor},
    response::{Response, ResponseEnvelope},
    retry::{RetryDecision, RetryPolicy, RetryState},
    Error, Result,
};
use http::{header, HeaderMap, HeaderValue, Method};
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Connect and overall timeout applied to every physical request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API token, read by [`ClientBuilder::from_env`].
pub const TOKEN_ENV: &str = "CANVAS_API_TOKEN";
/// Environment variable holding the Canvas domain.
pub const DOMAIN_ENV: &str = "CANVAS_DOMAIN";
/// Optional environment variable overriding the retry budget.
pub const MAX_RETRIES_ENV: &str = "CANVAS_MAX_RETRIES";
/// Optional environment variable overriding the base retry delay, in milliseconds.
pub const RETRY_DELAY_ENV: &str = "CANVAS_RETRY_DELAY_MS";

const DEFAULT_USER_AGENT: &str = concat!("canvas-api/", env!("CARGO_PKG_VERSION"));

/// A Canvas API client.
///
/// Cloning is cheap and clones share the connection pool. Configuration is fixed
/// at construction, so any number of calls may run concurrently on one client.
///
/// # Examples
///
/// ```no_run
/// use canvas_api::{Client, RequestDescriptor};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), canvas_api::Error> {
/// let client = Client::builder()
///     .token("secret")
///     .domain("canvas.example.edu")
///     .max_retries(5)
///     .retry_delay(Duration::from_millis(500))
///     .build()?;
///
/// // Every page of the course list, concatenated
/// let courses = client.execute(&RequestDescriptor::get("/courses")).await?;
/// println!("{} courses", courses.data.as_array().map_or(0, Vec::len));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    retry_policy: RetryPolicy,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The API root every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The retry policy applied to every logical call.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// Runs one logical call.
    ///
    /// Transient failures (no response, 429, 5xx) are retried with exponential
    /// backoff until the budget runs out. A successful JSON array response that
    /// advertises a `rel="next"` link is followed page by page, and the pages are
    /// returned concatenated in order. Any failure, including one on a later page,
    /// fails the whole call with a single [`NormalizedError`].
    pub async fn execute(
        &self,
        descriptor: &RequestDescriptor,
    ) -> std::result::Result<Response<Value>, NormalizedError> {
        let start_time = Instant::now();
        let mut state = RetryState::new();
        let url = self.endpoint_url(descriptor);

        let first = self
            .send_with_retry(&descriptor.method, &url, descriptor.body.as_ref(), &mut state)
            .await?;

        let (envelope, pages) = if pagination::is_paginated(&first) {
            self.collect_pages(first, &url, &mut state).await?
        } else {
            (first, 1)
        };

        let latency = start_time.elapsed();
        tracing::debug!(
            method = %descriptor.method,
            path = %descriptor.path,
            status = envelope.status.as_u16(),
            pages = pages,
            attempts = state.attempts(),
            latency_ms = latency.as_millis() as u64,
            "Logical call completed"
        );

        Ok(Response::from_envelope(
            envelope,
            latency,
            state.attempts(),
            pages,
        ))
    }

    /// Runs one logical call and deserializes the (aggregated) body into `T`.
    pub async fn call<T>(&self, descriptor: &RequestDescriptor) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(descriptor).await?;
        let parsed = T::deserialize(&response.data);

        match parsed {
            Ok(data) => Ok(response.map(|_| data)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    method = %descriptor.method,
                    path = %descriptor.path,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: response.raw_body,
                    serde_error: e.to_string(),
                    status: response.status,
                })
            }
        }
    }

    fn endpoint_url(&self, descriptor: &RequestDescriptor) -> Url {
        let mut url = self.inner.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            descriptor.path.trim_start_matches('/')
        );
        url.set_path(&path);

        if !descriptor.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &descriptor.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Issues physical attempts until one succeeds or the retry policy gives up.
    async fn send_with_retry(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        state: &mut RetryState,
    ) -> std::result::Result<ResponseEnvelope, NormalizedError> {
        loop {
            let attempt = state.begin_attempt();

            let failure = match self.send_once(method, url, body, attempt).await {
                Ok(envelope) if envelope.status.as_u16() < 400 => return Ok(envelope),
                Ok(envelope) => Failure::Status(envelope),
                Err(e) => Failure::Transport(e),
            };

            let kind = failure.kind();
            match self.inner.retry_policy.should_retry(state.retries(), kind) {
                RetryDecision::Retry(delay) => {
                    tracing::warn!(
                        kind = %kind,
                        attempt = attempt,
                        max_retries = self.inner.retry_policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        method = %method,
                        path = %url.path(),
                        "Request failed, retrying after delay"
                    );

                    state.record_retry();
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    let error = normalize(failure, state.attempts());
                    tracing::error!(
                        kind = %error.kind,
                        status = error.status.map(|s| s.as_u16()),
                        attempts = error.attempts,
                        method = %method,
                        path = %url.path(),
                        "Request failed: {}",
                        error.message
                    );
                    return Err(error);
                }
            }
        }
    }

    /// Executes a single physical attempt and reads the whole body.
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&Value>,
        attempt: u32,
    ) -> std::result::Result<ResponseEnvelope, reqwest::Error> {
        tracing::info!(
            method = %method,
            path = %url.path(),
            attempt = attempt,
            "Canvas API request"
        );

        let mut request = self.inner.http_client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let raw_body = response.text().await?;

        tracing::debug!(
            status = status.as_u16(),
            bytes = raw_body.len(),
            "Received HTTP response"
        );

        Ok(ResponseEnvelope::new(status, headers, raw_body))
    }

    /// Follows `rel="next"` links one page at a time, sharing the call's retry budget.
    ///
    /// Links are only followed on the origin of the base URL, since every request
    /// carries the bearer token.
    async fn collect_pages(
        &self,
        first: ResponseEnvelope,
        origin: &Url,
        state: &mut RetryState,
    ) -> std::result::Result<(ResponseEnvelope, usize), NormalizedError> {
        let mut cursor = PageCursor::from_headers(&first.headers);
        let mut buffer = PageBuffer::new(first);
        let mut visited = HashSet::from([origin.clone()]);

        while let Some(next) = cursor.take() {
            let url = next.resolve(&self.inner.base_url).map_err(|e| {
                NormalizedError::unexpected(
                    format!("invalid next page link {:?}: {}", next.as_str(), e),
                    state.attempts(),
                )
            })?;
            if url.origin() != self.inner.base_url.origin() {
                return Err(NormalizedError::unexpected(
                    format!("refusing to follow next page link to another origin: {}", url),
                    state.attempts(),
                ));
            }
            if !visited.insert(url.clone()) {
                return Err(NormalizedError::unexpected(
                    format!("pagination loop: {} was already fetched", url),
                    state.attempts(),
                ));
            }

            tracing::debug!(page = buffer.pages() + 1, url = %url, "Fetching next page");

            let page = self.send_with_retry(&Method::GET, &url, None, state).await?;
            cursor = PageCursor::from_headers(&page.headers);
            buffer
                .push(page)
                .map_err(|message| NormalizedError::unexpected(message, state.attempts()))?;
        }

        Ok(buffer.finish())
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use canvas_api::ClientBuilder;
///
/// # fn example() -> Result<(), canvas_api::Error> {
/// // CANVAS_API_TOKEN and CANVAS_DOMAIN must be set
/// let client = ClientBuilder::from_env()?.build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    token: Option<String>,
    domain: Option<String>,
    base_url: Option<Url>,
    retry_policy: RetryPolicy,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            token: None,
            domain: None,
            base_url: None,
            retry_policy: RetryPolicy::default(),
            user_agent: None,
        }
    }

    /// Creates a builder from `CANVAS_API_TOKEN` and `CANVAS_DOMAIN`, plus the
    /// optional `CANVAS_MAX_RETRIES` and `CANVAS_RETRY_DELAY_MS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric one does
    /// not parse.
    pub fn from_env() -> Result<Self> {
        let token = env_var(TOKEN_ENV)
            .ok_or_else(|| Error::ConfigurationError(format!("{} is not set", TOKEN_ENV)))?;
        let domain = env_var(DOMAIN_ENV)
            .ok_or_else(|| Error::ConfigurationError(format!("{} is not set", DOMAIN_ENV)))?;

        let mut builder = Self::new().token(token).domain(domain);

        if let Some(raw) = env_var(MAX_RETRIES_ENV) {
            let max_retries = raw.trim().parse().map_err(|e| {
                Error::ConfigurationError(format!("Invalid {} {:?}: {}", MAX_RETRIES_ENV, raw, e))
            })?;
            builder = builder.max_retries(max_retries);
        }
        if let Some(raw) = env_var(RETRY_DELAY_ENV) {
            let millis = raw.trim().parse().map_err(|e| {
                Error::ConfigurationError(format!("Invalid {} {:?}: {}", RETRY_DELAY_ENV, raw, e))
            })?;
            builder = builder.retry_delay(Duration::from_millis(millis));
        }

        Ok(builder)
    }

    /// Sets the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the Canvas domain; requests go to `https://{domain}/api/v1`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the API root explicitly, taking precedence over [`domain`](Self::domain).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the maximum number of retries per logical call.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry; later retries double it.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_policy.base_delay = delay;
        self
    }

    /// Replaces the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Overrides the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or not a valid header value, if
    /// neither a domain nor a base URL was provided, or if the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<Client> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::ConfigurationError("API token is required".to_string()))?;

        let base_url = match (self.base_url, self.domain) {
            (Some(url), _) => url,
            (None, Some(domain)) => domain_url(&domain)?,
            (None, None) => {
                return Err(Error::ConfigurationError(
                    "Either a domain or a base URL is required".to_string(),
                ))
            }
        };

        let mut authorization = HeaderValue::try_from(format!("Bearer {}", token.trim()))
            .map_err(|e| Error::ConfigurationError(format!("Invalid API token: {}", e)))?;
        authorization.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::AUTHORIZATION, authorization);
        default_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http_client = reqwest::Client::builder()
            .default_headers(default_headers)
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                retry_policy: self.retry_policy,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn domain_url(domain: &str) -> Result<Url> {
    let host = domain
        .trim()
        .trim_start_matches("https://")
        .trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::ConfigurationError("Domain must not be empty".to_string()));
    }
    Ok(Url::parse(&format!("https://{}/api/v1", host))?)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Client {
        Client::builder()
            .token("t")
            .base_url(base_url)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_domain_url() {
        let client = Client::builder()
            .token("t")
            .domain("canvas.example.edu")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://canvas.example.edu/api/v1");

        let url = domain_url("https://canvas.example.edu/").unwrap();
        assert_eq!(url.as_str(), "https://canvas.example.edu/api/v1");
    }

    #[test]
    fn test_endpoint_url_joins_path_and_query() {
        let client = client("http://127.0.0.1:9000/api/v1");
        let descriptor = RequestDescriptor::get("/courses/7/assignments")
            .with_query_list("include", ["rubric", "submission"])
            .with_query("per_page", 50);

        assert_eq!(
            client.endpoint_url(&descriptor).as_str(),
            "http://127.0.0.1:9000/api/v1/courses/7/assignments?include%5B%5D=rubric&include%5B%5D=submission&per_page=50"
        );
    }

    #[test]
    fn test_endpoint_url_trailing_slash_base() {
        let client = client("http://127.0.0.1:9000/api/v1/");
        let url = client.endpoint_url(&RequestDescriptor::get("users/self/profile"));
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/v1/users/self/profile");
    }

    #[test]
    fn test_build_requires_token() {
        let result = Client::builder().domain("canvas.example.edu").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));

        let result = Client::builder().token("  ").domain("canvas.example.edu").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_build_requires_location() {
        let result = Client::builder().token("t").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));

        let result = Client::builder().token("t").domain(" ").build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_build_rejects_invalid_token() {
        let result = Client::builder()
            .token("bad\ntoken")
            .domain("canvas.example.edu")
            .build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_retry_configuration() {
        let client = Client::builder()
            .token("t")
            .domain("canvas.example.edu")
            .max_retries(5)
            .retry_delay(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(
            client.retry_policy(),
            RetryPolicy::new(5, Duration::from_millis(250))
        );

        let default = Client::builder()
            .token("t")
            .domain("canvas.example.edu")
            .build()
            .unwrap();
        assert_eq!(default.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(TOKEN_ENV, "env-token");
        std::env::set_var(DOMAIN_ENV, "school.instructure.com");
        std::env::set_var(MAX_RETRIES_ENV, "1");
        std::env::set_var(RETRY_DELAY_ENV, "20");

        let client = ClientBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://school.instructure.com/api/v1"
        );
        assert_eq!(
            client.retry_policy(),
            RetryPolicy::new(1, Duration::from_millis(20))
        );

        std::env::set_var(MAX_RETRIES_ENV, "lots");
        assert!(matches!(
            ClientBuilder::from_env(),
            Err(Error::ConfigurationError(_))
        ));

        std::env::remove_var(MAX_RETRIES_ENV);
        std::env::remove_var(RETRY_DELAY_ENV);
        std::env::remove_var(TOKEN_ENV);
        assert!(matches!(
            ClientBuilder::from_env(),
            Err(Error::ConfigurationError(_))
        ));
        std::env::remove_var(DOMAIN_ENV);
    }
}
