//! Submission and grading operations.

use super::wrapped;
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::{json, Value};

const SUBMISSION_INCLUDES: [&str; 3] = ["submission_comments", "rubric_assessment", "assignment"];

/// How a student submission is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    /// Text typed into the submission box.
    OnlineTextEntry,
    /// A link to external work.
    OnlineUrl,
    /// Previously uploaded files.
    OnlineUpload,
}

/// A student submission; only the fields matching `submission_type` are needed.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubmission {
    pub submission_type: SubmissionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<u64>,
}

impl NewSubmission {
    /// A text entry submission.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            submission_type: SubmissionType::OnlineTextEntry,
            body: Some(body.into()),
            url: None,
            file_ids: Vec::new(),
        }
    }

    /// A website URL submission.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            submission_type: SubmissionType::OnlineUrl,
            body: None,
            url: Some(url.into()),
            file_ids: Vec::new(),
        }
    }

    /// A file upload submission referencing already uploaded file ids.
    pub fn files(file_ids: Vec<u64>) -> Self {
        Self {
            submission_type: SubmissionType::OnlineUpload,
            body: None,
            url: None,
            file_ids,
        }
    }
}

impl Client {
    /// Lists the submissions of an assignment with comments and rubric assessments
    /// (`GET /courses/:id/assignments/:id/submissions`, paginated).
    pub async fn list_submissions(&self, course_id: u64, assignment_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!(
            "/courses/{course_id}/assignments/{assignment_id}/submissions"
        ))
        .with_query_list("include", SUBMISSION_INCLUDES);
        self.fetch_list(descriptor).await
    }

    /// Fetches one user's submission; `user_id` of `None` means the caller (`self`).
    pub async fn get_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: Option<u64>,
    ) -> Result<Value> {
        let user = user_id.map_or_else(|| "self".to_string(), |id| id.to_string());
        let descriptor = RequestDescriptor::get(format!(
            "/courses/{course_id}/assignments/{assignment_id}/submissions/{user}"
        ))
        .with_query_list("include", SUBMISSION_INCLUDES);
        self.fetch_one(descriptor).await
    }

    /// Posts a grade, with an optional text comment
    /// (`PUT /courses/:id/assignments/:id/submissions/:user_id`).
    pub async fn submit_grade(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
        grade: &str,
        comment: Option<&str>,
    ) -> Result<Value> {
        let mut submission = json!({ "posted_grade": grade });
        if let Some(comment) = comment {
            submission["comment"] = json!({ "text_comment": comment });
        }
        let descriptor = RequestDescriptor::put(format!(
            "/courses/{course_id}/assignments/{assignment_id}/submissions/{user_id}"
        ))
        .with_body(json!({ "submission": submission }));
        self.fetch_one(descriptor).await
    }
    /// Submits work for the caller (`POST /courses/:id/assignments/:id/submissions`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`](crate::Error::Api) with a client error when the
    /// assignment does not accept the given submission type.
    pub async fn submit_assignment(
        &self,
        course_id: u64,
        assignment_id: u64,
        submission: &NewSubmission,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!(
            "/courses/{course_id}/assignments/{assignment_id}/submissions"
        ))
        .with_body(wrapped("submission", submission)?);
        self.fetch_one(descriptor).await
    }
}
