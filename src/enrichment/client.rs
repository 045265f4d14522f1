//! HTTP client for the external song lookup service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::models::{EnrichmentError, SongDetails};
use super::SongDetailsProvider;

pub struct EnrichmentClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl EnrichmentClient {
    /// # Arguments
    /// * `base_url` - Base URL of the lookup service (e.g., "http://localhost:8081")
    /// * `timeout` - Deadline for a whole lookup, from connect to body read
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn info_url(&self, group: &str, title: &str) -> String {
        format!(
            "{}/info?group={}&song={}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(title)
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> EnrichmentError {
        if err.is_timeout() {
            EnrichmentError::Timeout(self.timeout)
        } else {
            EnrichmentError::Transport(err)
        }
    }
}

#[async_trait]
impl SongDetailsProvider for EnrichmentClient {
    async fn fetch_details(
        &self,
        group: &str,
        title: &str,
    ) -> Result<SongDetails, EnrichmentError> {
        let url = self.info_url(group, title);
        debug!("Fetching song details from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Remote(status.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;

        serde_json::from_slice(&body).map_err(EnrichmentError::Decode)
    }
}
