// src/notion/client.rs
// Notion REST client (reqwest)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::{CreatePageRequest, NotionError, PageResponse, UpdatePageRequest};
use super::ProgressBackend;

const NOTION_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2021-08-16";
const TIMEOUT_SECS: u64 = 10;

pub struct NotionClient {
    client: Client,
    secret: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(secret: String) -> Self {
        Self::with_base_url(secret, NOTION_BASE_URL.to_string())
    }

    pub fn with_base_url(secret: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            secret,
            base_url,
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, NotionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status.as_u16() {
            401 => Err(NotionError::Authentication),
            429 => Err(NotionError::RateLimited),
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(NotionError::Api { status: code, body })
            }
        }
    }

    fn map_send_error(e: reqwest::Error) -> NotionError {
        if e.is_timeout() {
            NotionError::Timeout
        } else {
            NotionError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ProgressBackend for NotionClient {
    async fn create_page(&self, request: &CreatePageRequest) -> Result<String, NotionError> {
        let response = self
            .client
            .post(format!("{}/pages", self.base_url))
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let response = Self::check(response).await?;
        let page: PageResponse = response
            .json()
            .await
            .map_err(|e| NotionError::MalformedResponse(e.to_string()))?;

        page.id
            .ok_or_else(|| NotionError::MalformedResponse("create response has no id".to_string()))
    }

    async fn update_page(
        &self,
        page_id: &str,
        request: &UpdatePageRequest,
    ) -> Result<(), NotionError> {
        let response = self
            .client
            .patch(format!("{}/pages/{}", self.base_url, page_id))
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .json(request)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check(response).await?;
        Ok(())
    }
}
