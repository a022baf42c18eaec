//! Classic quiz operations.

use super::wrapped;
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::{json, Value};

impl Client {
    /// Lists the quizzes of a course (`GET /courses/:id/quizzes`, paginated).
    pub async fn list_quizzes(&self, course_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!("/courses/{course_id}/quizzes")))
            .await
    }

    /// Fetches one quiz (`GET /courses/:id/quizzes/:id`).
    pub async fn get_quiz(&self, course_id: u64, quiz_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!(
            "/courses/{course_id}/quizzes/{quiz_id}"
        )))
        .await
    }

    /// Creates a quiz (`POST /courses/:id/quizzes`). `quiz` is sent as the `quiz` object.
    pub async fn create_quiz<T: Serialize + ?Sized>(&self, course_id: u64, quiz: &T) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/courses/{course_id}/quizzes"))
            .with_body(wrapped("quiz", quiz)?);
        self.fetch_one(descriptor).await
    }

    /// Updates a quiz (`PUT /courses/:id/quizzes/:id`).
    pub async fn update_quiz<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        quiz_id: u64,
        quiz: &T,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::put(format!("/courses/{course_id}/quizzes/{quiz_id}"))
            .with_body(wrapped("quiz", quiz)?);
        self.fetch_one(descriptor).await
    }

    /// Deletes a quiz (`DELETE /courses/:id/quizzes/:id`).
    pub async fn delete_quiz(&self, course_id: u64, quiz_id: u64) -> Result<()> {
        self.fetch_none(RequestDescriptor::delete(format!(
            "/courses/{course_id}/quizzes/{quiz_id}"
        )))
        .await
    }

    /// Starts a quiz attempt for the caller (`POST /courses/:id/quizzes/:id/submissions`).
    pub async fn start_quiz_attempt(&self, course_id: u64, quiz_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::post(format!(
            "/courses/{course_id}/quizzes/{quiz_id}/submissions"
        )))
        .await
    }

    /// Completes the first attempt of a quiz submission with the given answers
    /// (`POST .../submissions/:id/complete`).
    pub async fn submit_quiz_attempt<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        quiz_id: u64,
        submission_id: u64,
        answers: &T,
    ) -> Result<Value> {
        let answers = super::to_body(answers)?;
        let descriptor = RequestDescriptor::post(format!(
            "/courses/{course_id}/quizzes/{quiz_id}/submissions/{submission_id}/complete"
        ))
        .with_body(json!({ "quiz_submissions": [{ "attempt": 1, "questions": answers }] }));
        self.fetch_one(descriptor).await
    }

    /// Adds a question to a quiz (`POST /courses/:id/quizzes/:id/questions`).
    pub async fn create_quiz_question<T: Serialize + ?Sized>(
        &self,
        course_id: u64,
        quiz_id: u64,
        question: &T,
    ) -> Result<Value> {
        let descriptor =
            RequestDescriptor::post(format!("/courses/{course_id}/quizzes/{quiz_id}/questions"))
                .with_body(wrapped("question", question)?);
        self.fetch_one(descriptor).await
    }
}
