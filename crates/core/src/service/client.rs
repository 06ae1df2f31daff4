//! HTTP client for the move-proposal service

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::*;
use crate::config::Config;
use crate::error::{Error, Result};

/// The external collaborator that proposes moves for the non-human side.
#[allow(async_fn_in_trait)]
pub trait MoveService {
    /// Liveness check
    async fn health(&self) -> Result<HealthStatus>;

    /// Asks for a move in the given position
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse>;
}

pub struct MoveServiceClient {
    client: Client,
    base_url: String,
}

impl MoveServiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(config.service_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl MoveService for MoveServiceClient {
    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Service(format!(
                "health check failed: {}",
                response.status()
            )));
        }

        let status: HealthStatus = response.json().await?;
        debug!(status = %status.status, "health check answered");
        Ok(status)
    }

    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse> {
        request.validate()?;
        let url = format!("{}/ai-move", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;

        // Rejected snapshots come back as 400 with a JSON body.
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<MoveResponse>(&text) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(Error::Service(format!(
                "move request failed: {} - {}",
                status, text
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
