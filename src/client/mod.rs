//! GraphQL HTTP client for the classification-results API.
//!
//! Sends synchronous `POST {query, variables}` requests via `ureq` and
//! unwraps the standard `{data, errors}` envelope. Three failure modes are
//! kept distinct for the caller:
//!
//! - transport failure or non-2xx HTTP status → error with the status;
//! - a non-empty `errors` array → error with the first error's message;
//! - a missing/empty result array → **not** an error here: queries return
//!   an empty `Vec` and the report layer turns that into its "no data"
//!   outcome.
//!
//! Batch filtering uses variable-bound arguments (`$batchId`), never string
//! interpolation into the query document. When no batch is selected the
//! unparameterized document is sent so the server returns the full dataset.

pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::OpticConfig;
pub use types::{ImageMetric, ResultRecord};

// ---------------------------------------------------------------------------
// Query documents
// ---------------------------------------------------------------------------

const RESULTS_FIELDS: &str = "classLabel confidence imageUrl classified reviewed batchId";
const IMAGE_METRICS_FIELDS: &str = "imageUrl labels confidences bboxCoordinates boxProportions \
     preprocessingTime inferenceTime postprocessingTime batchId";

fn results_query(with_batch: bool) -> String {
    if with_batch {
        format!("query Results($batchId: String!) {{ results(batchId: $batchId) {{ {RESULTS_FIELDS} }} }}")
    } else {
        format!("query {{ results {{ {RESULTS_FIELDS} }} }}")
    }
}

fn image_metrics_query(with_batch: bool) -> String {
    if with_batch {
        format!(
            "query ImageMetrics($batchId: String!) {{ imageMetrics(batchId: $batchId) {{ {IMAGE_METRICS_FIELDS} }} }}"
        )
    } else {
        format!("query {{ imageMetrics {{ {IMAGE_METRICS_FIELDS} }} }}")
    }
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// One entry of the envelope's `errors` array.
#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// `data` shape for the `results` query. The array itself may be absent.
#[derive(Debug, Deserialize)]
struct ResultsData {
    #[serde(default)]
    results: Option<Vec<ResultRecord>>,
}

/// `data` shape for the `imageMetrics` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageMetricsData {
    #[serde(default)]
    image_metrics: Option<Vec<ImageMetric>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous GraphQL client.
///
/// Built once from the resolved config and shared by all reports in one
/// invocation. Performs no caching, deduplication, or retries — a failed
/// fetch surfaces directly and the user re-runs the command.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    timeout: Duration,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &OpticConfig) -> Self {
        Self::new(
            config.endpoint.url.clone(),
            Duration::from_millis(config.endpoint.timeout_ms),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch classification results, optionally scoped to one batch.
    pub fn results(&self, batch: Option<&str>) -> Result<Vec<ResultRecord>> {
        let data: ResultsData = self.execute(&results_query(batch.is_some()), batch)?;
        Ok(data.results.unwrap_or_default())
    }

    /// Fetch per-image metrics, optionally scoped to one batch.
    pub fn image_metrics(&self, batch: Option<&str>) -> Result<Vec<ImageMetric>> {
        let data: ImageMetricsData = self.execute(&image_metrics_query(batch.is_some()), batch)?;
        Ok(data.image_metrics.unwrap_or_default())
    }

    /// Check whether the endpoint answers a trivial query.
    ///
    /// Uses a short timeout (5 s) so `optic health` doesn't stall when the
    /// backend is down.
    pub fn is_reachable(&self) -> bool {
        let body = serde_json::json!({ "query": "query { __typename }" });
        ureq::post(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send_json(body)
            .is_ok()
    }

    /// Execute one query and unwrap the envelope down to `data`.
    fn execute<T: DeserializeOwned>(&self, query: &str, batch: Option<&str>) -> Result<T> {
        let variables = match batch {
            Some(id) => serde_json::json!({ "batchId": id }),
            None => serde_json::json!({}),
        };
        let body = serde_json::json!({ "query": query, "variables": variables });

        let response = ureq::post(&self.endpoint)
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => anyhow::anyhow!("HTTP error: status {code}"),
                other => anyhow::Error::new(other).context("GraphQL request failed"),
            })?;

        let envelope: Envelope<T> = response
            .into_json()
            .context("failed to parse GraphQL response")?;

        if let Some(first) = envelope.errors.first() {
            let message = if first.message.is_empty() {
                "GraphQL query error"
            } else {
                &first.message
            };
            anyhow::bail!("{message}");
        }

        envelope
            .data
            .context("GraphQL response contained no data")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
