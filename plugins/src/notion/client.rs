use async_trait::async_trait;
use serde_json::Value;

use taskbridge_core::api::{CollectionPage, DirectoryApi, DirectoryConfig, PageRequest, RemoteError};

use crate::http::{parse_json_response, ApiHttpError};

const NOTION_VERSION_HEADER: &str = "Notion-Version";

/// Workspace directory over the Notion REST API.
#[derive(Clone)]
pub struct NotionClient {
    api_key: String,
    api_version: String,
    http: reqwest::Client,
    base_url: String,
    url_users: String,
    url_pages: String,
}

impl NotionClient {
    pub fn new(cfg: &DirectoryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        let normalized = cfg.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            api_key: cfg.api_key.clone(),
            api_version: cfg.api_version.clone(),
            http,
            url_users: format!("{}/users", normalized),
            url_pages: format!("{}/pages", normalized),
            base_url: normalized,
        })
    }

    fn url_query(&self, database_id: &str) -> String {
        format!("{}/databases/{}/query", self.base_url, database_id)
    }

    fn headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header(NOTION_VERSION_HEADER, &self.api_version);
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder, url: &str) -> Result<Value, RemoteError> {
        let resp = self
            .headers(req)
            .send()
            .await
            .map_err(|err| ApiHttpError::from_reqwest(err, url.to_string()))?;
        let status = resp.status();
        let value = parse_json_response(resp).await?;
        tracing::trace!(target: "taskbridge.notion", url = %url, status = %status, "response");
        Ok(value)
    }
}

fn decode_page(value: Value, url: &str) -> Result<CollectionPage, RemoteError> {
    serde_json::from_value(value)
        .map_err(|err| RemoteError::transport(format!("unexpected list shape from {url}: {err}")))
}

#[async_trait]
impl DirectoryApi for NotionClient {
    fn name(&self) -> &str {
        "notion"
    }

    async fn list_people(&self, req: PageRequest) -> Result<CollectionPage, RemoteError> {
        let url = &self.url_users;
        tracing::debug!(
            target: "taskbridge.notion",
            url = %url,
            page_size = req.page_size,
            has_cursor = req.start_cursor.is_some(),
            "list users"
        );
        let value = self.send(self.http.get(url).query(&req), url).await?;
        decode_page(value, url)
    }

    async fn query_records(
        &self,
        database_id: &str,
        req: PageRequest,
    ) -> Result<CollectionPage, RemoteError> {
        let url = self.url_query(database_id);
        tracing::debug!(
            target: "taskbridge.notion",
            url = %url,
            page_size = req.page_size,
            has_cursor = req.start_cursor.is_some(),
            "query database"
        );
        let builder = self
            .http
            .post(&url)
            .query(&[("filter_properties", "title")])
            .json(&req);
        let value = self.send(builder, &url).await?;
        decode_page(value, &url)
    }

    async fn create_record(&self, payload: Value) -> Result<Value, RemoteError> {
        let url = &self.url_pages;
        tracing::debug!(target: "taskbridge.notion", url = %url, "create page");
        self.send(self.http.post(url).json(&payload), url).await
    }
}
