//! Course operations.

use super::wrapped;
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::{json, Value};

const COURSE_INCLUDES: [&str; 4] = ["total_students", "teachers", "term", "course_progress"];

impl Client {
    /// Lists the caller's courses (`GET /courses`, paginated).
    ///
    /// Ended courses are skipped unless `include_ended`.
    pub async fn list_courses(&self, include_ended: bool) -> Result<Vec<Value>> {
        let mut descriptor =
            RequestDescriptor::get("/courses").with_query_list("include", COURSE_INCLUDES);
        if !include_ended {
            descriptor = descriptor.with_query_list("state", ["available", "completed"]);
        }
        self.fetch_list(descriptor).await
    }

    /// Fetches one course with its sections and syllabus (`GET /courses/:id`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`](crate::Error::Api) with [`ErrorKind::ClientError`](crate::ErrorKind::ClientError)
    /// when the course does not exist or is not visible to the caller.
    pub async fn get_course(&self, course_id: u64) -> Result<Value> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}"))
            .with_query_list("include", COURSE_INCLUDES)
            .with_query_list("include", ["sections", "syllabus_body"]);
        self.fetch_one(descriptor).await
    }

    /// Creates a course in an account (`POST /accounts/:id/courses`).
    ///
    /// `course` is sent as the `course` object.
    pub async fn create_course<T: Serialize + ?Sized>(
        &self,
        account_id: u64,
        course: &T,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/accounts/{account_id}/courses"))
            .with_body(wrapped("course", course)?);
        self.fetch_one(descriptor).await
    }

    /// Updates a course (`PUT /courses/:id`). `course` is sent as the `course` object.
    pub async fn update_course<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        course: &T,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::put(format!("/courses/{course_id}"))
            .with_body(wrapped("course", course)?);
        self.fetch_one(descriptor).await
    }

    /// Deletes a course (`DELETE /courses/:id`).
    pub async fn delete_course(&self, course_id: u64) -> Result<()> {
        self.fetch_none(RequestDescriptor::delete(format!("/courses/{course_id}")))
            .await
    }

    /// Lists the courses the caller is actively enrolled in (`GET /courses`, paginated).
    pub async fn list_student_courses(&self) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get("/courses")
            .with_query_list(
                "include",
                ["enrollments", "total_students", "term", "course_progress"],
            )
            .with_query("enrollment_state", "active");
        self.fetch_list(descriptor).await
    }

    /// Returns `{"course_id": ..., "syllabus_body": ...}` for a course.
    ///
    /// A course without a syllabus yields a `null` body.
    pub async fn get_syllabus(&self, course_id: u64) -> Result<Value> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}"))
            .with_query_list("include", ["syllabus_body"]);
        let course = self.fetch_one(descriptor).await?;
        Ok(json!({
            "course_id": course_id,
            "syllabus_body": course.get("syllabus_body").cloned().unwrap_or(Value::Null),
        }))
    }
}
