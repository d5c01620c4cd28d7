//! HTTP adapter for a Graphiti-compatible ingestion service

use std::time::Duration;

use reqwest::blocking::Client;

use super::{EpisodeBatch, Ingestor};
use crate::config::MemsyncConfig;
use crate::{Error, Result};

/// Blocking client for `GET /healthcheck` and `POST /messages`
#[derive(Debug, Clone)]
pub struct HttpIngestor {
    base_url: String,
    client: Client,
    health_timeout: Duration,
}

impl HttpIngestor {
    /// Build a client from the configured endpoint and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &MemsyncConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.send_timeout()).build()?;
        Ok(Self {
            base_url: config.endpoint_base().to_string(),
            client,
            health_timeout: config.health_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl Ingestor for HttpIngestor {
    fn health_check(&self) -> Result<()> {
        let unavailable = |reason: String| Error::EndpointUnavailable {
            url: self.base_url.clone(),
            reason,
        };

        let response = self
            .client
            .get(self.url("healthcheck"))
            .timeout(self.health_timeout)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("health check returned {}", response.status())));
        }
        Ok(())
    }

    fn send(&self, batch: &EpisodeBatch) -> Result<()> {
        let response = self.client.post(self.url("messages")).json(batch).send()?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "batch accepted");
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(Error::IngestRejected {
            status: status.as_u16(),
            body,
        })
    }
}
