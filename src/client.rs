//! HTTP client for the remote task table.
//!
//! Every call sends the static token and a JSON content type, checks the
//! status before touching the body, and maps undecodable bodies to
//! [`ApiError::Malformed`].

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{NewTask, RowPage, Status, StatusPatch, Task};
use crate::state::{Outcome, Request};

/// Client bound to one table of the hosted database.
#[derive(Clone)]
pub struct TableClient {
    http: reqwest::Client,
    rows_url: String,
    token: String,
}

impl TableClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("worktodo/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            rows_url: rows_url(&config.base_url, config.table_id),
            token: config.api_token.clone(),
        })
    }

    fn row_url(&self, id: u64) -> String {
        format!("{}{}/", self.rows_url, id)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "application/json")
    }

    fn list_request(&self) -> reqwest::RequestBuilder {
        self.request(Method::GET, &self.rows_url)
    }

    fn create_request(&self, task: &NewTask) -> reqwest::RequestBuilder {
        self.request(Method::POST, &self.rows_url).json(task)
    }

    fn status_request(&self, id: u64, status: Status) -> reqwest::RequestBuilder {
        self.request(Method::PATCH, &self.row_url(id))
            .json(&StatusPatch { status })
    }

    fn delete_request(&self, id: u64) -> reqwest::RequestBuilder {
        self.request(Method::DELETE, &self.row_url(id))
    }

    /// Fetches the first page of rows.
    pub async fn list_rows(&self) -> Result<Vec<Task>, ApiError> {
        debug!(url = %self.rows_url, "listing rows");
        let resp = self.list_request().send().await?;
        let page: RowPage = decode(check_response(resp).await?).await?;
        if let Some(count) = page.count {
            if count > page.results.len() as u64 {
                warn!(
                    count,
                    received = page.results.len(),
                    "table has more rows than the first page; list is truncated"
                );
            }
        }
        Ok(page.results)
    }

    pub async fn create_row(&self, task: &NewTask) -> Result<Task, ApiError> {
        debug!(task_name = %task.task_name, "creating row");
        let resp = self.create_request(task).send().await?;
        decode(check_response(resp).await?).await
    }

    /// Sends `{status}` as a partial update and returns the full row.
    pub async fn update_status(&self, id: u64, status: Status) -> Result<Task, ApiError> {
        debug!(id, %status, "updating row status");
        let resp = self.status_request(id, status).send().await?;
        decode(check_response(resp).await?).await
    }

    pub async fn delete_row(&self, id: u64) -> Result<(), ApiError> {
        debug!(id, "deleting row");
        let resp = self.delete_request(id).send().await?;
        check_response(resp).await?;
        Ok(())
    }

    /// Runs a request issued by the state controller and wraps the result
    /// so it can be folded back with `AppState::complete`.
    pub async fn execute(&self, request: Request) -> Outcome {
        match request {
            Request::List => Outcome::Listed(self.list_rows().await),
            Request::Create(task) => Outcome::Created(self.create_row(&task).await),
            Request::SetStatus { id, status } => {
                Outcome::Updated(id, self.update_status(id, status).await)
            }
            Request::Delete(id) => Outcome::Deleted(id, self.delete_row(id).await),
        }
    }
}

fn rows_url(base_url: &str, table_id: u64) -> String {
    format!(
        "{}/api/database/rows/table/{}/",
        base_url.trim_end_matches('/'),
        table_id
    )
}

/// Returns the response unchanged on success; otherwise
/// [`ApiError::Status`] with the body, or the canonical reason when the
/// body is empty.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown status").to_string()
    } else {
        body.trim().to_string()
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use crate::models::{AdminBlock, Priority};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[test]
    fn rows_url_strips_trailing_slash() {
        assert_eq!(
            rows_url("https://api.baserow.io/", 623600),
            "https://api.baserow.io/api/database/rows/table/623600/"
        );
    }

    fn test_client(base_url: &str) -> TableClient {
        TableClient::new(&Config {
            base_url: base_url.into(),
            api_token: "secret".into(),
            ..Config::default()
        })
        .unwrap()
    }

    fn assert_common_headers(req: &reqwest::Request) {
        assert_eq!(req.headers()[AUTHORIZATION], "Token secret");
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    fn body_json(req: &reqwest::Request) -> serde_json::Value {
        let bytes = req.body().and_then(|b| b.as_bytes()).expect("request body");
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn list_request_targets_collection() {
        let req = test_client(DEFAULT_BASE_URL).list_request().build().unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(
            req.url().as_str(),
            "https://api.baserow.io/api/database/rows/table/623600/"
        );
        assert_common_headers(&req);
        assert!(req.body().is_none());
    }

    #[test]
    fn create_request_posts_full_payload() {
        let task = NewTask {
            task_name: "Write report".into(),
            status: Status::Todo,
            priority: Priority::High,
            category: "Reports".into(),
            admin_block: AdminBlock::Morning,
            due_date: None,
            notes: Some("draft first".into()),
        };
        let req = test_client(DEFAULT_BASE_URL)
            .create_request(&task)
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.url().as_str(),
            "https://api.baserow.io/api/database/rows/table/623600/"
        );
        assert_common_headers(&req);
        assert_eq!(
            body_json(&req),
            json!({
                "task_name": "Write report",
                "status": "todo",
                "priority": "high",
                "category": "Reports",
                "admin_block": "morning",
                "due_date": null,
                "notes": "draft first",
            })
        );
    }

    #[test]
    fn status_request_patches_single_row() {
        let req = test_client(DEFAULT_BASE_URL)
            .status_request(17, Status::Completed)
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::PATCH);
        assert_eq!(
            req.url().as_str(),
            "https://api.baserow.io/api/database/rows/table/623600/17/"
        );
        assert_common_headers(&req);
        assert_eq!(body_json(&req), json!({ "status": "completed" }));
    }

    #[test]
    fn delete_request_targets_row() {
        let req = test_client(DEFAULT_BASE_URL).delete_request(17).build().unwrap();
        assert_eq!(req.method(), Method::DELETE);
        assert_eq!(
            req.url().as_str(),
            "https://api.baserow.io/api/database/rows/table/623600/17/"
        );
        assert_common_headers(&req);
        assert!(req.body().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Nothing listens on port 1.
        let err = test_client("http://127.0.0.1:1").list_rows().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err
            .user_message("loading tasks")
            .starts_with("Connection to the table service failed while loading tasks"));
    }

    #[tokio::test]
    async fn check_response_success() {
        assert!(check_response(mock_response(204, "")).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_keeps_body() {
        let err = check_response(mock_response(401, "{\"error\":\"ERROR_INVALID_TOKEN\"}"))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("ERROR_INVALID_TOKEN"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_response_falls_back_to_reason() {
        let err = check_response(mock_response(503, "")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status { status: 503, ref message } if message == "Service Unavailable"
        ));
    }

    #[tokio::test]
    async fn decode_reads_list_envelope() {
        let body = r#"{"count": 2, "next": null, "results": [
            {"id": 1, "task_name": "Review PR", "status": "completed", "priority": "high",
             "category": "Dev", "admin_block": "morning", "due_date": null, "notes": null},
            {"id": 2, "task_name": "Expenses"}
        ]}"#;
        let page: RowPage = decode(mock_response(200, body)).await.unwrap();
        assert_eq!(page.count, Some(2));
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].priority, Priority::High);
        assert_eq!(page.results[0].admin_block, AdminBlock::Morning);
        assert!(page.results[0].is_completed());
    }

    #[tokio::test]
    async fn decode_reports_malformed_body() {
        let err = decode::<Task>(mock_response(200, "<html>oops</html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }
}
