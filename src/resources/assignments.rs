//! Assignment and assignment group operations.

use super::wrapped;
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::Value;

impl Client {
    /// Lists the assignments of a course (`GET /courses/:id/assignments`, paginated).
    ///
    /// With `include_submissions`, each assignment carries the caller's submission.
    pub async fn list_assignments(
        &self,
        course_id: u64,
        include_submissions: bool,
    ) -> Result<Vec<Value>> {
        let mut include = vec!["assignment_group", "rubric", "due_at"];
        if include_submissions {
            include.push("submission");
        }
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/assignments"))
            .with_query_list("include", include);
        self.fetch_list(descriptor).await
    }

    /// Fetches one assignment (`GET /courses/:id/assignments/:id`).
    pub async fn get_assignment(
        &self,
        course_id: u64,
        assignment_id: u64,
        include_submission: bool,
    ) -> Result<Value> {
        let mut include = vec!["assignment_group", "rubric"];
        if include_submission {
            include.push("submission");
        }
        let descriptor =
            RequestDescriptor::get(format!("/courses/{course_id}/assignments/{assignment_id}"))
                .with_query_list("include", include);
        self.fetch_one(descriptor).await
    }

    /// Creates an assignment (`POST /courses/:id/assignments`).
    ///
    /// `assignment` is sent as the `assignment` object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`](crate::Error::SerializationFailed) if `assignment`
    /// cannot be represented as JSON.
    pub async fn create_assignment<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        assignment: &T,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/courses/{course_id}/assignments"))
            .with_body(wrapped("assignment", assignment)?);
        self.fetch_one(descriptor).await
    }

    /// Updates an assignment (`PUT /courses/:id/assignments/:id`).
    pub async fn update_assignment<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        assignment_id: u64,
        assignment: &T,
    ) -> Result<Value> {
        let descriptor =
            RequestDescriptor::put(format!("/courses/{course_id}/assignments/{assignment_id}"))
                .with_body(wrapped("assignment", assignment)?);
        self.fetch_one(descriptor).await
    }

    /// Deletes an assignment (`DELETE /courses/:id/assignments/:id`).
    pub async fn delete_assignment(&self, course_id: u64, assignment_id: u64) -> Result<()> {
        self.fetch_none(RequestDescriptor::delete(format!(
            "/courses/{course_id}/assignments/{assignment_id}"
        )))
        .await
    }

    /// Lists the assignment groups of a course with their assignments
    /// (`GET /courses/:id/assignment_groups`, paginated).
    pub async fn list_assignment_groups(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/assignment_groups"))
            .with_query_list("include", ["assignments"]);
        self.fetch_list(descriptor).await
    }

    /// Fetches one assignment group with its assignments.
    pub async fn get_assignment_group(&self, course_id: u64, group_id: u64) -> Result<Value> {
        let descriptor =
            RequestDescriptor::get(format!("/courses/{course_id}/assignment_groups/{group_id}"))
                .with_query_list("include", ["assignments"]);
        self.fetch_one(descriptor).await
    }
}
