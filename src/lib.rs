//! # canvas-api - a resilient Canvas LMS REST client
//!
//! The heart of the crate is a small transport pipeline that turns one logical
//! operation ("list the assignments of course 42") into as many HTTP exchanges as
//! it takes:
//!
//! - **Pagination**: JSON array responses carrying a `Link: <...>; rel="next"`
//!   header are followed page by page and concatenated in order.
//! - **Retries**: failures without a response, `429` and `5xx` answers are retried
//!   with exponential backoff (`base_delay * 2^(n-1)`, 3 retries by default).
//! - **Normalized errors**: JSON error objects, HTML error pages, plain-text bodies
//!   and network failures all surface as one [`NormalizedError`].
//!
//! On top of it, [`Client`] exposes thin resource operations (courses,
//! assignments, quizzes, ...) that pass the API's JSON through untouched.
//!
//! ## Quick Start
//!
//! ```no_run
//! use canvas_api::{Client, RequestDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), canvas_api::Error> {
//!     let client = Client::builder()
//!         .token("your-api-token")
//!         .domain("canvas.example.edu")
//!         .build()?;
//!
//!     // Resource operations
//!     for course in client.list_courses(false).await? {
//!         println!("{}", course["name"]);
//!     }
//!
//!     // Or any endpoint through the executor
//!     let descriptor = RequestDescriptor::get("/courses/42/assignments")
//!         .with_query_list("include", ["submission"]);
//!     let response = client.execute(&descriptor).await?;
//!     println!("{} pages in {:?}", response.pages, response.latency);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use canvas_api::{Client, Error, ErrorKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().token("t").domain("canvas.example.edu").build()?;
//! match client.get_course(42).await {
//!     Ok(course) => println!("{}", course["name"]),
//!     Err(Error::Api(e)) if e.kind == ErrorKind::ClientError => {
//!         eprintln!("rejected ({:?}): {}", e.status, e.message);
//!     }
//!     Err(Error::Api(e)) => {
//!         eprintln!("gave up after {} attempts: {}", e.attempts, e);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod descriptor;
mod error;
mod normalize;
pub mod pagination;
pub mod resources;
mod response;
pub mod retry;

pub use client::{
    Client, ClientBuilder, DOMAIN_ENV, MAX_RETRIES_ENV, REQUEST_TIMEOUT, RETRY_DELAY_ENV,
    TOKEN_ENV,
};
pub use descriptor::RequestDescriptor;
pub use error::{Error, ErrorKind, NormalizedError, Result};
pub use normalize::{extract_message, BODY_EXCERPT_LIMIT};
pub use pagination::PageCursor;
pub use response::Response;
pub use retry::{RetryDecision, RetryPolicy};
