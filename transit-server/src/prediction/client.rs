//! HTTP client for an external prediction service.
//!
//! The service takes a `PredictionQuery` as a JSON POST to `{base}/predict`
//! and answers with a `Prediction`.

use std::time::Duration;

use super::PredictionAdapter;
use super::error::PredictionError;
use super::types::{Prediction, PredictionQuery};

/// Default request timeout, kept under the per-itinerary bound.
const DEFAULT_TIMEOUT_MS: u64 = 800;

/// Configuration for the prediction client.
#[derive(Debug, Clone)]
pub struct PredictionClientConfig {
    /// Base URL of the prediction service
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl PredictionClientConfig {
    /// Create a new config pointing at the given service.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }
}

/// Prediction service client.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPredictionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PredictionClientConfig) -> Result<Self, PredictionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/predict", config.base_url.trim_end_matches('/')),
        })
    }

    /// Returns the URL predictions are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl PredictionAdapter for HttpPredictionClient {
    async fn predict(&self, query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        let response = self.http.post(&self.endpoint).json(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PredictionError::Decode(e.to_string()))
    }
}
