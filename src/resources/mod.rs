//! Resource operations.
//!
//! Thin methods mapping each logical operation of the Canvas API to a verb, a
//! path template and its fixed parameters. All of them go through
//! [`Client::execute`], so list operations are paginated and retried like any
//! other call. Payloads are passed through as [`serde_json::Value`] untouched.

mod accounts;
mod assignments;
mod communication;
mod content;
mod courses;
mod quizzes;
mod submissions;
mod users;

pub use submissions::{NewSubmission, SubmissionType};
pub use users::EnrollmentRequest;
pub use content::FileUpload;

use crate::{Client, Error, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::SystemTime;

/// Outcome of [`Client::health_check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// The profile request succeeded.
    Ok,
    /// The profile request failed; see [`HealthCheck::error`].
    Error,
}

/// Result of a connectivity and authentication check.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub status: HealthStatus,
    /// When the check started.
    pub checked_at: SystemTime,
    /// `id` and `name` of the token's owner, when the check succeeded.
    pub user: Option<Value>,
    /// Why the check failed.
    pub error: Option<String>,
}

impl Client {
    /// Verifies the token and domain by fetching the caller's profile.
    ///
    /// Never fails: problems are reported through [`HealthStatus::Error`].
    pub async fn health_check(&self) -> HealthCheck {
        let checked_at = SystemTime::now();
        match self.get_user_profile().await {
            Ok(profile) => {
                let mut user = Map::new();
                user.insert("id".to_string(), profile["id"].clone());
                user.insert("name".to_string(), profile["name"].clone());
                HealthCheck {
                    status: HealthStatus::Ok,
                    checked_at,
                    user: Some(Value::Object(user)),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                HealthCheck {
                    status: HealthStatus::Error,
                    checked_at,
                    user: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn fetch_list(&self, descriptor: RequestDescriptor) -> Result<Vec<Value>> {
        Ok(self.call::<Vec<Value>>(&descriptor).await?.data)
    }

    async fn fetch_one(&self, descriptor: RequestDescriptor) -> Result<Value> {
        Ok(self.execute(&descriptor).await?.data)
    }

    async fn fetch_none(&self, descriptor: RequestDescriptor) -> Result<()> {
        self.execute(&descriptor).await?;
        Ok(())
    }
}

/// Serializes a caller-supplied payload.
fn to_body<T: Serialize + ?Sized>(payload: &T) -> Result<Value> {
    serde_json::to_value(payload).map_err(|e| Error::SerializationFailed(e.to_string()))
}

/// Serializes a payload nested under `key`, e.g. `{"course": {...}}`.
fn wrapped<T: Serialize + ?Sized>(key: &str, payload: &T) -> Result<Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), to_body(payload)?);
    Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped() {
        let body = wrapped("course", &json!({"name": "Biology"})).unwrap();
        assert_eq!(body, json!({"course": {"name": "Biology"}}));
    }

    #[test]
    fn test_to_body_rejects_non_string_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert((1, 2), "x");
        assert!(matches!(to_body(&map), Err(Error::SerializationFailed(_))));
    }
}
