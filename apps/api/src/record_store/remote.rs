use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, warn};

use super::{EndpointResolver, RecordStore, StoreAction, StoreResponse, SyncError};
use crate::models::history::History;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain text avoids the CORS preflight the script endpoint cannot answer.
const POST_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// HTTP client for the remote spreadsheet script.
pub struct HttpRecordStore {
    client: Client,
    endpoint: EndpointResolver,
}

impl HttpRecordStore {
    pub fn new(endpoint: EndpointResolver) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, endpoint })
    }

    async fn url(&self) -> Result<String, SyncError> {
        self.endpoint
            .resolve()
            .await?
            .map(|e| e.url)
            .ok_or(SyncError::NotConfigured)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn submit(&self, action: &StoreAction) -> Result<StoreResponse, SyncError> {
        let url = self.url().await?;
        let body = serde_json::to_string(action)?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, POST_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        debug!("Remote store '{}' answered {}", action.name(), response.status());
        let text = response.text().await?;
        Ok(parse_post_body(&text))
    }

    async fn history(&self, user_id: &str) -> Result<History, SyncError> {
        let url = self.url().await?;
        let text = self
            .client
            .get(&url)
            .query(&[("action", "get_history"), ("user_id", user_id)])
            .send()
            .await?
            .text()
            .await?;
        serde_json::from_str(&text).map_err(SyncError::InvalidResponse)
    }
}

/// Non-JSON bodies (HTML error pages, login interstitials) are reported as an
/// error status rather than a transport failure, so they do not trigger the fallback.
fn parse_post_body(text: &str) -> StoreResponse {
    serde_json::from_str(text).unwrap_or_else(|_| {
        warn!(
            "Received non-JSON response from remote store: {}",
            text.chars().take(200).collect::<String>()
        );
        StoreResponse::error("Invalid server response")
    })
}
