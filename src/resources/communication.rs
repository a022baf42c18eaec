//! Discussions, announcements, conversations and notifications.

use crate::{Client, RequestDescriptor, Result};
use serde_json::{json, Value};

impl Client {
    /// Lists the discussion topics of a course
    /// (`GET /courses/:id/discussion_topics`, paginated).
    pub async fn list_discussion_topics(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/discussion_topics"))
            .with_query_list("include", ["assignment"]);
        self.fetch_list(descriptor).await
    }
    /// Fetches one discussion topic (`GET /courses/:id/discussion_topics/:id`).
    pub async fn get_discussion_topic(&self, course_id: u64, topic_id: u64) -> Result<Value> {
        let descriptor =
            RequestDescriptor::get(format!("/courses/{course_id}/discussion_topics/{topic_id}"))
                .with_query_list("include", ["assignment"]);
        self.fetch_one(descriptor).await
    }
    /// Posts an entry to a discussion topic
    /// (`POST /courses/:id/discussion_topics/:id/entries`).
    pub async fn post_to_discussion(
        &self,
        course_id: u64,
        topic_id: u64,
        message: &str,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!(
            "/courses/{course_id}/discussion_topics/{topic_id}/entries"
        ))
        .with_body(json!({ "message": message }));
        self.fetch_one(descriptor).await
    }
    /// Lists the announcements of a course (`GET /courses/:id/discussion_topics`
    /// with `type=announcement`, paginated).
    pub async fn list_announcements(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/discussion_topics"))
            .with_query("type", "announcement")
            .with_query_list("include", ["assignment"]);
        self.fetch_list(descriptor).await
    }

    /// Creates an announcement, optionally scheduled for `delayed_post_at` (ISO 8601).
    pub async fn create_announcement(
        &self,
        course_id: u64,
        title: &str,
        message: &str,
        delayed_post_at: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({
            "title": title,
            "message": message,
            "is_announcement": true,
        });
        if let Some(at) = delayed_post_at {
            body["delayed_post_at"] = json!(at);
        }
        let descriptor = RequestDescriptor::post(format!("/courses/{course_id}/discussion_topics"))
            .with_body(body);
        self.fetch_one(descriptor).await
    }
    /// Lists the caller's inbox conversations (`GET /conversations`, paginated).
    pub async fn list_conversations(&self) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get("/conversations"))
            .await
    }
    /// Fetches one conversation with its messages (`GET /conversations/:id`).
    pub async fn get_conversation(&self, conversation_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!(
            "/conversations/{conversation_id}"
        )))
        .await
    }

    /// Starts a conversation. Canvas answers with the list of created conversations.
    pub async fn create_conversation(
        &self,
        recipients: &[&str],
        body: &str,
        subject: Option<&str>,
    ) -> Result<Value> {
        let mut payload = json!({ "recipients": recipients, "body": body });
        if let Some(subject) = subject {
            payload["subject"] = json!(subject);
        }
        self.fetch_one(RequestDescriptor::post("/conversations").with_body(payload))
            .await
    }

    /// Lists the caller's activity stream (`GET /users/self/activity_stream`, paginated).
    pub async fn list_notifications(&self) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get("/users/self/activity_stream"))
            .await
    }
}
