//! Files, pages, calendar, rubrics, dashboard and modules.

use super::to_body;
use crate::{Client, RequestDescriptor, Result};
use serde::Serialize;
use serde_json::Value;

/// First step of the Canvas file upload flow.
#[derive(Debug, Clone, Serialize)]
pub struct FileUpload {
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl FileUpload {
    /// An upload of `size` bytes sent as `application/octet-stream`.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: "application/octet-stream".to_string(),
        }
    }

    /// Overrides the declared MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

impl Client {
    /// Lists the files of a folder when `folder_id` is given, else of the course (paginated).
    pub async fn list_files(&self, course_id: u64, folder_id: Option<u64>) -> Result<Vec<Value>> {
        let path = match folder_id {
            Some(folder_id) => format!("/folders/{folder_id}/files"),
            None => format!("/courses/{course_id}/files"),
        };
        self.fetch_list(RequestDescriptor::get(path)).await
    }
    /// Fetches file metadata, including its download `url` (`GET /files/:id`).
    pub async fn get_file(&self, file_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!("/files/{file_id}")))
            .await
    }

    /// Announces an upload and returns the upload target; the file bytes are
    /// then sent to the returned `upload_url` by the caller.
    pub async fn start_file_upload(
        &self,
        course_id: u64,
        folder_id: Option<u64>,
        upload: &FileUpload,
    ) -> Result<Value> {
        let path = match folder_id {
            Some(folder_id) => format!("/folders/{folder_id}/files"),
            None => format!("/courses/{course_id}/files"),
        };
        let descriptor = RequestDescriptor::post(path).with_body(to_body(upload)?);
        self.fetch_one(descriptor).await
    }
    /// Lists the folders of a course (`GET /courses/:id/folders`, paginated).
    pub async fn list_folders(&self, course_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!("/courses/{course_id}/folders")))
            .await
    }
    /// Lists the wiki pages of a course (`GET /courses/:id/pages`, paginated).
    pub async fn list_pages(&self, course_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!("/courses/{course_id}/pages")))
            .await
    }
    /// Fetches a wiki page by its URL slug (`GET /courses/:id/pages/:url`).
    pub async fn get_page(&self, course_id: u64, page_url: &str) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!(
            "/courses/{course_id}/pages/{page_url}"
        )))
        .await
    }

    /// Lists calendar events, optionally bounded by ISO 8601 dates
    /// (`GET /calendar_events`, paginated).
    pub async fn list_calendar_events(
        &self,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get("/calendar_events")
            .with_query("type", "event")
            .with_query("all_events", true)
            .with_optional_query("start_date", start_date)
            .with_optional_query("end_date", end_date);
        self.fetch_list(descriptor).await
    }

    /// Returns the caller's upcoming events that are tied to an assignment
    /// (`GET /users/self/upcoming_events`). Other events are filtered out.
    pub async fn get_upcoming_assignments(&self, limit: u32) -> Result<Vec<Value>> {
        let descriptor =
            RequestDescriptor::get("/users/self/upcoming_events").with_query("limit", limit);
        let events = self.fetch_list(descriptor).await?;
        Ok(events
            .into_iter()
            .filter(|event| event.get("assignment").is_some_and(|a| !a.is_null()))
            .collect())
    }
    /// Lists the rubrics of a course (`GET /courses/:id/rubrics`, paginated).
    pub async fn list_rubrics(&self, course_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!("/courses/{course_id}/rubrics")))
            .await
    }
    /// Fetches one rubric (`GET /courses/:id/rubrics/:id`).
    pub async fn get_rubric(&self, course_id: u64, rubric_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!(
            "/courses/{course_id}/rubrics/{rubric_id}"
        )))
        .await
    }
    /// Fetches the caller's dashboard (`GET /users/self/dashboard`).
    pub async fn get_dashboard(&self) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get("/users/self/dashboard"))
            .await
    }
    /// Lists the course cards of the caller's dashboard (`GET /dashboard/dashboard_cards`).
    pub async fn get_dashboard_cards(&self) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get("/dashboard/dashboard_cards"))
            .await
    }
    /// Lists the modules of a course with their items (`GET /courses/:id/modules`, paginated).
    pub async fn list_modules(&self, course_id: u64) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/modules"))
            .with_query_list("include", ["items"]);
        self.fetch_list(descriptor).await
    }
    /// Fetches one module with its items (`GET /courses/:id/modules/:id`).
    pub async fn get_module(&self, course_id: u64, module_id: u64) -> Result<Value> {
        let descriptor = RequestDescriptor::get(format!("/courses/{course_id}/modules/{module_id}"))
            .with_query_list("include", ["items"]);
        self.fetch_one(descriptor).await
    }
    /// Lists the items of a module with content details
    /// (`GET /courses/:id/modules/:id/items`, paginated).
    pub async fn list_module_items(&self, course_id: u64, module_id: u64) -> Result<Vec<Value>> {
        let descriptor =
            RequestDescriptor::get(format!("/courses/{course_id}/modules/{module_id}/items"))
                .with_query_list("include", ["content_details"]);
        self.fetch_list(descriptor).await
    }
    /// Fetches one module item with content details.
    pub async fn get_module_item(
        &self,
        course_id: u64,
        module_id: u64,
        item_id: u64,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::get(format!(
            "/courses/{course_id}/modules/{module_id}/items/{item_id}"
        ))
        .with_query_list("include", ["content_details"]);
        self.fetch_one(descriptor).await
    }
    /// Marks a module item as done for the caller
    /// (`PUT /courses/:id/modules/:id/items/:id/done`).
    pub async fn mark_module_item_done(
        &self,
        course_id: u64,
        module_id: u64,
        item_id: u64,
    ) -> Result<()> {
        self.fetch_none(RequestDescriptor::put(format!(
            "/courses/{course_id}/modules/{module_id}/items/{item_id}/done"
        )))
        .await
    }
}
