//! Account administration: scopes, sub-accounts, users, courses and reports.

use crate::{Client, RequestDescriptor, Result};
use serde_json::{json, Value};

impl Client {
    /// Lists the API token scopes available in an account, optionally grouped
    /// (`resource` or `resource_category`).
    pub async fn list_token_scopes(
        &self,
        account_id: u64,
        group_by: Option<&str>,
    ) -> Result<Vec<Value>> {
        let descriptor = RequestDescriptor::get(format!("/accounts/{account_id}/scopes"))
            .with_optional_query("group_by", group_by);
        self.fetch_list(descriptor).await
    }
    /// Fetches one account (`GET /accounts/:id`).
    pub async fn get_account(&self, account_id: u64) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!("/accounts/{account_id}")))
            .await
    }

    /// Lists the courses of an account, with arbitrary filters passed as query
    /// parameters (e.g. `("search_term", "bio")`, `("state[]", "available")`).
    pub async fn list_account_courses(
        &self,
        account_id: u64,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let descriptor = filters.iter().fold(
            RequestDescriptor::get(format!("/accounts/{account_id}/courses")),
            |d, (key, value)| d.with_query(*key, value),
        );
        self.fetch_list(descriptor).await
    }
    /// Lists the users of an account, with filters passed as query parameters
    /// (`GET /accounts/:id/users`, paginated).
    pub async fn list_account_users(
        &self,
        account_id: u64,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Value>> {
        let descriptor = filters.iter().fold(
            RequestDescriptor::get(format!("/accounts/{account_id}/users")),
            |d, (key, value)| d.with_query(*key, value),
        );
        self.fetch_list(descriptor).await
    }
    /// Lists the direct sub-accounts of an account (`GET /accounts/:id/sub_accounts`, paginated).
    pub async fn list_sub_accounts(&self, account_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!(
            "/accounts/{account_id}/sub_accounts"
        )))
        .await
    }
    /// Lists the report types available in an account (`GET /accounts/:id/reports`).
    pub async fn list_account_reports(&self, account_id: u64) -> Result<Vec<Value>> {
        self.fetch_list(RequestDescriptor::get(format!("/accounts/{account_id}/reports")))
            .await
    }

    /// Starts a report of type `report`, e.g. `provisioning_csv`.
    pub async fn create_account_report(
        &self,
        account_id: u64,
        report: &str,
        parameters: Option<Value>,
    ) -> Result<Value> {
        let body = json!({ "parameters": parameters.unwrap_or_else(|| json!({})) });
        let descriptor =
            RequestDescriptor::post(format!("/accounts/{account_id}/reports/{report}"))
                .with_body(body);
        self.fetch_one(descriptor).await
    }
    /// Fetches the status of a report run (`GET /accounts/:id/reports/:report/:id`).
    pub async fn get_account_report(
        &self,
        account_id: u64,
        report: &str,
        report_id: u64,
    ) -> Result<Value> {
        self.fetch_one(RequestDescriptor::get(format!(
            "/accounts/{account_id}/reports/{report}/{report_id}"
        )))
        .await
    }
}
