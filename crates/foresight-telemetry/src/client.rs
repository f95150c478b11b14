//! Prometheus HTTP API client.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors talking to the metrics store. All of them are non-fatal to
/// the loop: the caller degrades the current cycle and tries again on
/// the next tick.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("metrics store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The query seam the monitor is generic over.
pub trait Telemetry: Send + Sync {
    /// Ordered samples (oldest first) of the first result row of a
    /// range query over the given lookback window.
    fn query_range(
        &self,
        expr: &str,
        window_minutes: u64,
    ) -> impl Future<Output = anyhow::Result<Vec<f64>>> + Send;

    /// Single scalar from an instant query. Fails soft: any transport
    /// or shape problem yields `None`, never an error.
    fn query_instant(&self, expr: &str) -> impl Future<Output = Option<f64>> + Send;
}

// Response envelope of the Prometheus HTTP API. Only the fields the
// loop consumes are modelled.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    result: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    /// Range-query samples: `[timestamp, "value"]` pairs.
    #[serde(default)]
    values: Vec<(f64, Option<String>)>,
    /// Instant-query sample.
    #[serde(default)]
    value: Option<(f64, Option<String>)>,
}

/// Client for a Prometheus-compatible metrics store.
pub struct PromClient {
    base_url: String,
    step: String,
    http: reqwest::Client,
}

impl PromClient {
    /// `step_secs` becomes the range-query resolution.
    pub fn new(base_url: impl Into<String>, step_secs: u64) -> Result<Self, TelemetryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            step: format!("{step_secs}s"),
            http,
        })
    }

    async fn range(&self, expr: &str, window_minutes: u64) -> Result<Vec<f64>, TelemetryError> {
        let end = epoch_secs();
        let start = end.saturating_sub(window_minutes * 60);
        let url = format!("{}/api/v1/query_range", self.base_url);

        let body: ApiResponse = self
            .http
            .get(&url)
            .query(&[
                ("query", expr.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
                ("step", self.step.clone()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // First series only; quantiles over empty windows come back as
        // "NaN" strings and are dropped along with nulls.
        let Some(row) = body.data.result.first() else {
            return Ok(Vec::new());
        };
        Ok(row
            .values
            .iter()
            .filter_map(|(_, v)| v.as_deref()?.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect())
    }

    async fn instant(&self, expr: &str) -> Result<Option<f64>, TelemetryError> {
        let url = format!("{}/api/v1/query", self.base_url);
        let body: ApiResponse = self
            .http
            .get(&url)
            .query(&[("query", expr)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .data
            .result
            .first()
            .and_then(|row| row.value.as_ref())
            .and_then(|(_, v)| v.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite()))
    }
}

impl Telemetry for PromClient {
    async fn query_range(&self, expr: &str, window_minutes: u64) -> anyhow::Result<Vec<f64>> {
        Ok(self.range(expr, window_minutes).await?)
    }

    async fn query_instant(&self, expr: &str) -> Option<f64> {
        match self.instant(expr).await {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "instant query failed");
                None
            }
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
