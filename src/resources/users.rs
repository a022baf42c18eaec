//! User, enrollment and grade operations.

use super::{to_body, wrapped};
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::Value;

/// Enrollment of a user into a course.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentRequest {
    pub user_id: u64,
    #[serde(rename = "type")]
    pub role: String,
    pub enrollment_state: String,
}

impl EnrollmentRequest {
    /// An active student enrollment.
    pub fn student(user_id: u64) -> Self {
        Self {
            user_id,
            role: "StudentEnrollment".to_string(),
            enrollment_state: "active".to_string(),
        }
    }

    /// Replaces the enrollment type, e.g. `TeacherEnrollment`.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Replaces the initial enrollment state, e.g. `invited`.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.enrollment_state = state.into();
        self
    }
}

impl Client {
    /// Lists the users of a course with their enrollments (`GET /courses/:id/users`, paginated).
    pub async fn list_users(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/users"))
            .with_query_list("include", ["email", "enrollments", "avatar_url"]);
        self.fetch_list(descriptor).await
    }
    /// Lists the enrollments of a course (`GET /courses/:id/enrollments`, paginated).
    pub async fn list_enrollments(&self, course_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!(
            "/courses/{course_id}/enrollments"
        )))
        .await
    }
    /// Enrolls a user in a course (`POST /courses/:id/enrollments`).
    pub async fn enroll_user(
        &self,
        course_id: u64,
        enrollment: &EnrollmentRequest,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/courses/{course_id}/enrollments"))
            .with_body(wrapped("enrollment", enrollment)?);
        self.fetch_one(descriptor).await
    }
    /// Deletes an enrollment (`DELETE /courses/:id/enrollments/:id`).
    pub async fn unenroll_user(&self, course_id: u64, enrollment_id: u64) -> Result<()> {
        self.fetch_none(RequestDescriptor::delete(format!(
            "/courses/{course_id}/enrollments/{enrollment_id}"
        )))
        .await
    }

    /// Enrollments of a course with their grades (`GET /courses/:id/enrollments`, paginated).
    pub async fn get_course_grades(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/enrollments"))
            .with_query_list("include", ["grades", "observed_users"]);
        self.fetch_list(descriptor).await
    }
    /// Fetches the caller's grades across courses (`GET /users/self/grades`).
    pub async fn get_user_grades(&self) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get("/users/self/grades"))
            .await
    }
    /// Fetches the caller's profile (`GET /users/self/profile`).
    ///
    /// This is also the request behind [`Client::health_check`].
    pub async fn get_user_profile(&self) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get("/users/self/profile"))
            .await
    }
    /// Updates the caller (`PUT /users/self`). `profile` is sent as the `user` object.
    pub async fn update_user_profile<T: Serialize + ?Sized>(&self, profile: &T) -> Result<Value> {
        let descriptor = RequestDescriptor::put("/users/self").with_body(wrapped("user", profile)?);
        self.fetch_one(descriptor).await
    }

    /// Creates a user in an account (`POST /accounts/:id/users`).
    ///
    /// `user` is sent as-is (`user`, `pseudonym`, ...).
    pub async fn create_user<T: Serialize + ?Sized>(&self, account_id: u64, user: &T) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/accounts/{account_id}/users"))
            .with_body(to_body(user)?);
        self.fetch_one(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enrollment_serialization() {
        let enrollment = EnrollmentRequest::student(42).with_role("TaEnrollment");
        assert_eq!(
            serde_json::to_value(&enrollment).unwrap(),
            json!({"user_id": 42, "type": "TaEnrollment", "enrollment_state": "active"})
        );
    }
}
