use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::domain::models::ScrapeSettings;
use crate::error::{FetchError, FetchResult};

/// The only way the pipeline reaches the network.
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    /// GET `url` and return the body of a successful response.
    async fn get_text(&self, url: &Url) -> FetchResult<String>;
}

/// Production client backed by reqwest.
pub struct HttpArchiveClient {
    client: Client,
}

impl HttpArchiveClient {
    pub fn new(settings: &ScrapeSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("Failed to build archive HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArchiveClient for HttpArchiveClient {
    async fn get_text(&self, url: &Url) -> FetchResult<String> {
        log::trace!("[HTTP] GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("[HTTP] {} returned {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        log::trace!("[HTTP] Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
