//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to one report. A report with no usable samples
//! returns `200 {"no_data": true}` so the frontend can render its empty
//! state; fetch and aggregation errors propagate to the router's 500 path.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::client::GraphqlClient;
use crate::config;
use crate::report::{self, Phase, Scope};

use super::content_type_json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// `200 {"no_data": true}` — the query succeeded but held no samples.
fn no_data_response() -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "no_data": true }))
}

/// Render an optional report: the report itself, or the no-data marker.
fn report_response<T: Serialize>(report: Option<T>) -> Result<Response<Cursor<Vec<u8>>>> {
    match report {
        Some(report) => json_response(&report),
        None => no_data_response(),
    }
}

/// Extract one query parameter from a URL.
fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name && !v.is_empty()).then_some(v)
    })
}

fn batch_param(url: &str) -> Option<&str> {
    query_param(url, "batch")
}

fn client() -> (GraphqlClient, config::OpticConfig) {
    let cfg = config::load();
    (GraphqlClient::from_config(&cfg), cfg)
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/overview?batch=ID` — headline metrics.
pub fn get_overview(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, _) = client();
    report_response(report::overview(&graphql, batch_param(url))?)
}

/// `GET /api/confidence?batch=ID` — confidence distribution.
pub fn get_confidence(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    report_response(report::confidence(&graphql, batch_param(url), &cfg.charts)?)
}

/// `GET /api/timing?phase=pre|inference|post&batch=ID` — one phase's
/// distribution, or the summed totals when no phase is given.
pub fn get_timing(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    let batch = batch_param(url);

    match query_param(url, "phase") {
        Some(raw) => {
            let phase = Phase::from_str_opt(raw)
                .with_context(|| format!("unknown timing phase: {raw}"))?;
            report_response(report::timing(&graphql, phase, batch, &cfg.charts)?)
        }
        None => report_response(report::timing_totals(&graphql, batch)?),
    }
}

/// `GET /api/boxes?batch=ID` — bounding-box area distribution.
pub fn get_boxes(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    report_response(report::box_sizes(&graphql, batch_param(url), &cfg.charts)?)
}

/// `GET /api/proportions?batch=ID` — box-to-image proportion distribution.
pub fn get_proportions(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    report_response(report::proportions(&graphql, batch_param(url), &cfg.charts)?)
}

/// `GET /api/detections?batch=ID` — detections-per-image distribution.
pub fn get_detections(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    report_response(report::detections(&graphql, batch_param(url), &cfg.charts)?)
}

/// `GET /api/precision?batch=ID` — per-class precision summary.
pub fn get_precision(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, _) = client();
    report_response(report::precision_report(&graphql, batch_param(url))?)
}

/// `GET /api/classes?batch=ID` — detected class distribution.
pub fn get_classes(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, _) = client();
    report_response(report::class_distribution(&graphql, batch_param(url))?)
}

/// `GET /api/batches?scope=internal|feedback` — selectable batches.
pub fn get_batches(url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, _) = client();
    let scope = query_param(url, "scope")
        .and_then(Scope::from_str_opt)
        .unwrap_or(Scope::Internal);
    let batches = report::batches(&graphql, scope)?;
    json_response(&serde_json::json!({ "batches": batches }))
}

/// `GET /api/health` — endpoint reachability and config status.
pub fn get_health() -> Result<Response<Cursor<Vec<u8>>>> {
    let (graphql, cfg) = client();
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = serde_json::json!({
        "endpoint": graphql.endpoint(),
        "reachable": graphql.is_reachable(),
        "timeout_ms": cfg.endpoint.timeout_ms,
        "config_exists": config_exists,
    });

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/overview?batch=b-1", "batch"), Some("b-1"));
        assert_eq!(
            query_param("/api/timing?phase=pre&batch=b-2", "batch"),
            Some("b-2")
        );
        assert_eq!(
            query_param("/api/timing?phase=inference", "phase"),
            Some("inference")
        );
    }

    #[test]
    fn query_param_returns_none_for_missing_or_empty() {
        assert_eq!(query_param("/api/overview", "batch"), None);
        assert_eq!(query_param("/api/overview?foo=bar", "batch"), None);
        assert_eq!(query_param("/api/overview?batch=", "batch"), None);
    }

    #[test]
    fn no_data_response_is_ok() {
        let resp = no_data_response().unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
    }

    #[test]
    fn report_response_maps_none_to_no_data() {
        let resp = report_response(None::<report::OverviewReport>).unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
    }
}
