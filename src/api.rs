use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    config::{BackendConfig, NetworkConfig},
    models::{FareRecord, FetchResult, FilterCriteria, Insights, InsightsRequest},
};

/// Failures of the backend calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Data request failed with HTTP status {0}")]
    Http(u16),
    #[error("Insights request failed with HTTP status {0}")]
    InsightsHttp(u16),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Source of filtered fare data and insights.
///
/// `fetch_insights` must be given the `raw_data` of a preceding `fetch_data`.
#[allow(async_fn_in_trait)]
pub trait FareGateway {
    async fn fetch_data(&self, criteria: &FilterCriteria) -> Result<FetchResult, GatewayError>;

    async fn fetch_insights(&self, raw_data: &[FareRecord]) -> Result<Insights, GatewayError>;
}

impl<G: FareGateway> FareGateway for Arc<G> {
    async fn fetch_data(&self, criteria: &FilterCriteria) -> Result<FetchResult, GatewayError> {
        (**self).fetch_data(criteria).await
    }

    async fn fetch_insights(&self, raw_data: &[FareRecord]) -> Result<Insights, GatewayError> {
        (**self).fetch_insights(raw_data).await
    }
}

/// HTTP client for the fare backend.
#[derive(Clone, Debug)]
pub struct FareApiClient {
    client: reqwest::Client,
    data_url: String,
    insights_url: String,
}

impl FareApiClient {
    /// Create a new API client with configurable timeouts.
    pub fn new(backend: &BackendConfig, network_config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(network_config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(network_config.connect_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let base = backend.base_url.trim_end_matches('/');
        Ok(Self {
            client,
            data_url: format!("{}{}", base, backend.data_path),
            insights_url: format!("{}{}", base, backend.insights_path),
        })
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// Non-2xx statuses are passed to `on_status` to pick the error variant.
    async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        on_status: fn(StatusCode) -> GatewayError,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(on_status(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl FareGateway for FareApiClient {
    async fn fetch_data(&self, criteria: &FilterCriteria) -> Result<FetchResult, GatewayError> {
        tracing::debug!("Requesting fare data from {}", self.data_url);
        let result: FetchResult = self
            .post_json(&self.data_url, &criteria.to_request(), |s| {
                GatewayError::Http(s.as_u16())
            })
            .await?;
        tracing::debug!(
            "Received {} records, {} trend points, {} routes",
            result.raw_data.len(),
            result.price_trends.len(),
            result.popular_routes.len()
        );
        Ok(result)
    }

    async fn fetch_insights(&self, raw_data: &[FareRecord]) -> Result<Insights, GatewayError> {
        tracing::debug!(
            "Requesting insights for {} records from {}",
            raw_data.len(),
            self.insights_url
        );
        let request = InsightsRequest {
            filtered_data: raw_data,
        };
        self.post_json(&self.insights_url, &request, |s| {
            GatewayError::InsightsHttp(s.as_u16())
        })
        .await
    }
}
