//! Report builders — one fetch/aggregate pass per metric view.
//!
//! Each entry point issues a single GraphQL query, extracts the relevant
//! samples, and hands them to the aggregation core. Every metric view goes
//! through this one fetch-then-bin pipeline rather than carrying its own
//! copy of the fetch logic.
//!
//! Returning `Ok(None)` means the query succeeded but held no usable
//! samples; callers render "No data available" for that case, distinct
//! from fetch errors. Aggregation is only ever invoked on non-empty sample
//! sets, so its `NaN`-on-empty edge never reaches display.

use anyhow::Result;
use serde::Serialize;

use crate::client::types::finite;
use crate::client::{GraphqlClient, ImageMetric};
use crate::config::schema::ChartsConfig;
use crate::stats::precision::{self, PrecisionSummary, ReviewRecord};
use crate::stats::{self, Histogram, Unit};

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Headline numbers across the whole (or one batch's) image set.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub total_images: usize,
    pub average_confidence: f64,
    pub average_detections: f64,
    pub average_preprocessing_ms: f64,
    pub average_inference_ms: f64,
    pub average_postprocessing_ms: f64,
    pub total_latency_ms: f64,
    /// Each phase's share of total latency, in percent.
    pub preprocessing_share_pct: f64,
    pub inference_share_pct: f64,
    pub postprocessing_share_pct: f64,
}

pub fn overview(client: &GraphqlClient, batch: Option<&str>) -> Result<Option<OverviewReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_overview(&metrics))
}

fn build_overview(metrics: &[ImageMetric]) -> Option<OverviewReport> {
    if metrics.is_empty() {
        return None;
    }

    let confidences: Vec<f64> =
        finite(metrics.iter().flat_map(|m| m.confidences.iter().copied()));
    let detections: Vec<f64> = metrics.iter().map(|m| m.confidences.len() as f64).collect();

    let average_preprocessing_ms = phase_average(metrics, Phase::Preprocessing);
    let average_inference_ms = phase_average(metrics, Phase::Inference);
    let average_postprocessing_ms = phase_average(metrics, Phase::Postprocessing);
    let total_latency_ms = average_preprocessing_ms + average_inference_ms + average_postprocessing_ms;

    let share = |phase_ms: f64| {
        if total_latency_ms == 0.0 {
            0.0
        } else {
            phase_ms / total_latency_ms * 100.0
        }
    };

    Some(OverviewReport {
        total_images: metrics.len(),
        average_confidence: guarded_mean(&confidences),
        average_detections: stats::mean(&detections),
        average_preprocessing_ms,
        average_inference_ms,
        average_postprocessing_ms,
        total_latency_ms,
        preprocessing_share_pct: share(average_preprocessing_ms),
        inference_share_pct: share(average_inference_ms),
        postprocessing_share_pct: share(average_postprocessing_ms),
    })
}

/// Mean with an explicit empty guard, for nested arrays that can be empty
/// even when the outer response is not.
fn guarded_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        stats::mean(samples)
    }
}

fn phase_average(metrics: &[ImageMetric], phase: Phase) -> f64 {
    let times = finite(metrics.iter().filter_map(|m| phase.extract(m)));
    guarded_mean(&times)
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

/// Confidence-score distribution and averages.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceReport {
    pub average: f64,
    /// Percentage of detections strictly above `threshold`.
    pub high_confidence_pct: f64,
    pub threshold: f64,
    pub histogram: Histogram,
}

pub fn confidence(
    client: &GraphqlClient,
    batch: Option<&str>,
    charts: &ChartsConfig,
) -> Result<Option<ConfidenceReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_confidence(&metrics, charts))
}

fn build_confidence(metrics: &[ImageMetric], charts: &ChartsConfig) -> Option<ConfidenceReport> {
    let samples: Vec<f64> = finite(metrics.iter().flat_map(|m| m.confidences.iter().copied()));
    if samples.is_empty() {
        return None;
    }

    let threshold = charts.high_confidence_threshold;
    Some(ConfidenceReport {
        average: stats::mean(&samples),
        high_confidence_pct: stats::fraction_above(&samples, threshold) * 100.0,
        threshold,
        histogram: Histogram::build(&samples, charts.confidence_bins, Unit::Score),
    })
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// One phase of the per-image processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preprocessing,
    Inference,
    Postprocessing,
}

impl Phase {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "preprocessing" => Some(Self::Preprocessing),
            "inference" | "infer" => Some(Self::Inference),
            "post" | "postprocessing" => Some(Self::Postprocessing),
            _ => None,
        }
    }

    /// Human-readable name for titles.
    pub fn label(self) -> &'static str {
        match self {
            Self::Preprocessing => "Preprocessing",
            Self::Inference => "Inference",
            Self::Postprocessing => "Postprocessing",
        }
    }

    fn extract(self, metric: &ImageMetric) -> Option<f64> {
        match self {
            Self::Preprocessing => metric.preprocessing_time,
            Self::Inference => metric.inference_time,
            Self::Postprocessing => metric.postprocessing_time,
        }
    }
}

/// Distribution of one timing phase across images.
#[derive(Debug, Clone, Serialize)]
pub struct TimingReport {
    pub phase: Phase,
    pub average_ms: f64,
    pub histogram: Histogram,
}

pub fn timing(
    client: &GraphqlClient,
    phase: Phase,
    batch: Option<&str>,
    charts: &ChartsConfig,
) -> Result<Option<TimingReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_timing(&metrics, phase, charts))
}

fn build_timing(
    metrics: &[ImageMetric],
    phase: Phase,
    charts: &ChartsConfig,
) -> Option<TimingReport> {
    let samples = finite(metrics.iter().filter_map(|m| phase.extract(m)));
    if samples.is_empty() {
        return None;
    }

    Some(TimingReport {
        phase,
        average_ms: stats::mean(&samples),
        histogram: Histogram::build(&samples, charts.timing_bins, Unit::Milliseconds),
    })
}

/// Summed pipeline times for a phase-by-phase comparison.
#[derive(Debug, Clone, Serialize)]
pub struct TimingTotals {
    pub preprocessing_ms: f64,
    pub inference_ms: f64,
    pub postprocessing_ms: f64,
    pub total_ms: f64,
}

pub fn timing_totals(client: &GraphqlClient, batch: Option<&str>) -> Result<Option<TimingTotals>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_timing_totals(&metrics))
}

fn build_timing_totals(metrics: &[ImageMetric]) -> Option<TimingTotals> {
    if metrics.is_empty() {
        return None;
    }

    let sum = |phase: Phase| -> f64 {
        finite(metrics.iter().filter_map(|m| phase.extract(m)))
            .iter()
            .sum()
    };

    let preprocessing_ms = sum(Phase::Preprocessing);
    let inference_ms = sum(Phase::Inference);
    let postprocessing_ms = sum(Phase::Postprocessing);
    Some(TimingTotals {
        preprocessing_ms,
        inference_ms,
        postprocessing_ms,
        total_ms: preprocessing_ms + inference_ms + postprocessing_ms,
    })
}

// ---------------------------------------------------------------------------
// Bounding boxes
// ---------------------------------------------------------------------------

/// Bounding-box area distribution (px²).
#[derive(Debug, Clone, Serialize)]
pub struct BoxSizeReport {
    pub average_area: f64,
    pub histogram: Histogram,
}

pub fn box_sizes(
    client: &GraphqlClient,
    batch: Option<&str>,
    charts: &ChartsConfig,
) -> Result<Option<BoxSizeReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_box_sizes(&metrics, charts))
}

fn build_box_sizes(metrics: &[ImageMetric], charts: &ChartsConfig) -> Option<BoxSizeReport> {
    // Unparseable coordinate strings are skipped; if nothing parses this is
    // a no-data outcome, not an error.
    let samples: Vec<f64> = metrics.iter().flat_map(|m| m.bbox_areas()).collect();
    if samples.is_empty() {
        return None;
    }

    Some(BoxSizeReport {
        average_area: stats::mean(&samples),
        histogram: Histogram::build(&samples, charts.box_size_bins, Unit::PixelsSquared),
    })
}

/// Box-to-image area ratio distribution.
#[derive(Debug, Clone, Serialize)]
pub struct ProportionReport {
    pub average: f64,
    pub histogram: Histogram,
}

pub fn proportions(
    client: &GraphqlClient,
    batch: Option<&str>,
    charts: &ChartsConfig,
) -> Result<Option<ProportionReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_proportions(&metrics, charts))
}

fn build_proportions(metrics: &[ImageMetric], charts: &ChartsConfig) -> Option<ProportionReport> {
    let samples: Vec<f64> = finite(
        metrics
            .iter()
            .flat_map(|m| m.box_proportions.iter().copied()),
    );
    if samples.is_empty() {
        return None;
    }

    Some(ProportionReport {
        average: stats::mean(&samples),
        histogram: Histogram::build(&samples, charts.proportion_bins, Unit::Ratio),
    })
}

// ---------------------------------------------------------------------------
// Detections
// ---------------------------------------------------------------------------

/// Detections-per-image distribution.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub average: f64,
    pub histogram: Histogram,
}

pub fn detections(
    client: &GraphqlClient,
    batch: Option<&str>,
    charts: &ChartsConfig,
) -> Result<Option<DetectionReport>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_detections(&metrics, charts))
}

fn build_detections(metrics: &[ImageMetric], charts: &ChartsConfig) -> Option<DetectionReport> {
    if metrics.is_empty() {
        return None;
    }

    // One sample per image: how many detections it produced.
    let samples: Vec<f64> = metrics.iter().map(|m| m.confidences.len() as f64).collect();
    Some(DetectionReport {
        average: stats::mean(&samples),
        histogram: Histogram::build(&samples, charts.detection_bins, Unit::Count),
    })
}

// ---------------------------------------------------------------------------
// Precision
// ---------------------------------------------------------------------------

pub fn precision_report(
    client: &GraphqlClient,
    batch: Option<&str>,
) -> Result<Option<PrecisionSummary>> {
    let records = client.results(batch)?;
    if records.is_empty() {
        return Ok(None);
    }

    let reviews: Vec<ReviewRecord> = records
        .into_iter()
        .map(|r| ReviewRecord {
            class_label: r.class_label,
            classified: r.classified,
            reviewed: r.reviewed,
        })
        .collect();
    Ok(Some(precision::summarize(&reviews)))
}

// ---------------------------------------------------------------------------
// Class distribution
// ---------------------------------------------------------------------------

/// Detection count for one class label.
#[derive(Debug, Clone, Serialize)]
pub struct ClassCount {
    pub label: String,
    pub count: usize,
}

/// Distribution of detected classes across all images.
#[derive(Debug, Clone, Serialize)]
pub struct ClassDistribution {
    /// Sorted by count descending, label ascending for ties.
    pub classes: Vec<ClassCount>,
    pub total_detections: usize,
}

pub fn class_distribution(
    client: &GraphqlClient,
    batch: Option<&str>,
) -> Result<Option<ClassDistribution>> {
    let metrics = client.image_metrics(batch)?;
    Ok(build_class_distribution(&metrics))
}

fn build_class_distribution(metrics: &[ImageMetric]) -> Option<ClassDistribution> {
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for metric in metrics {
        for label in &metric.labels {
            *counts.entry(label.as_str()).or_default() += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }

    let total_detections = counts.values().sum();
    let mut classes: Vec<ClassCount> = counts
        .into_iter()
        .map(|(label, count)| ClassCount {
            label: label.to_string(),
            count,
        })
        .collect();
    classes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    Some(ClassDistribution {
        classes,
        total_detections,
    })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// Which query's batch identifiers to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Batches present in `imageMetrics` (operational metrics).
    Internal,
    /// Batches present in `results` (review feedback).
    Feedback,
}

impl Scope {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "internal" => Some(Self::Internal),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }
}

/// One selectable batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub id: String,
    /// Display name: `Batch ` + the first 8 characters of the id.
    pub name: String,
}

/// List the unique batch ids present in the chosen scope, sorted by name.
pub fn batches(client: &GraphqlClient, scope: Scope) -> Result<Vec<BatchEntry>> {
    let ids: Vec<String> = match scope {
        Scope::Internal => client
            .image_metrics(None)?
            .into_iter()
            .filter_map(|m| m.batch_id)
            .collect(),
        Scope::Feedback => client
            .results(None)?
            .into_iter()
            .filter_map(|r| r.batch_id)
            .collect(),
    };
    Ok(build_batch_list(ids))
}

fn build_batch_list(ids: Vec<String>) -> Vec<BatchEntry> {
    let unique: std::collections::BTreeSet<String> =
        ids.into_iter().filter(|id| !id.is_empty()).collect();
    unique
        .into_iter()
        .map(|id| {
            let short: String = id.chars().take(8).collect();
            BatchEntry {
                name: format!("Batch {short}"),
                id,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(
        confidences: &[f64],
        pre: f64,
        infer: f64,
        post: f64,
        batch: Option<&str>,
    ) -> ImageMetric {
        ImageMetric {
            confidences: confidences.to_vec(),
            preprocessing_time: Some(pre),
            inference_time: Some(infer),
            postprocessing_time: Some(post),
            batch_id: batch.map(str::to_string),
            ..ImageMetric::default()
        }
    }

    fn default_charts() -> ChartsConfig {
        ChartsConfig::default()
    }

    #[test]
    fn overview_aggregates_across_images() {
        let metrics = vec![
            metric(&[0.9, 0.7], 10.0, 100.0, 20.0, None),
            metric(&[0.5], 20.0, 200.0, 40.0, None),
        ];
        let report = build_overview(&metrics).unwrap();

        assert_eq!(report.total_images, 2);
        assert!((report.average_confidence - 0.7).abs() < 1e-9);
        assert_eq!(report.average_detections, 1.5);
        assert_eq!(report.average_preprocessing_ms, 15.0);
        assert_eq!(report.average_inference_ms, 150.0);
        assert_eq!(report.average_postprocessing_ms, 30.0);
        assert_eq!(report.total_latency_ms, 195.0);

        let share_sum = report.preprocessing_share_pct
            + report.inference_share_pct
            + report.postprocessing_share_pct;
        assert!((share_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn overview_of_empty_metrics_is_no_data() {
        assert!(build_overview(&[]).is_none());
    }

    #[test]
    fn overview_with_no_confidences_avoids_nan() {
        let metrics = vec![metric(&[], 1.0, 2.0, 3.0, None)];
        let report = build_overview(&metrics).unwrap();
        assert_eq!(report.average_confidence, 0.0);
        assert_eq!(report.average_detections, 0.0);
    }

    #[test]
    fn confidence_report_counts_high_confidence_strictly() {
        let metrics = vec![metric(&[0.5, 0.8, 0.9, 1.0], 0.0, 0.0, 0.0, None)];
        let report = build_confidence(&metrics, &default_charts()).unwrap();
        // 0.8 is not strictly above the 0.8 threshold.
        assert_eq!(report.high_confidence_pct, 50.0);
        assert_eq!(report.histogram.total_count(), 4);
    }

    #[test]
    fn confidence_report_empty_is_no_data() {
        let metrics = vec![metric(&[], 1.0, 2.0, 3.0, None)];
        assert!(build_confidence(&metrics, &default_charts()).is_none());
    }

    #[test]
    fn timing_report_uses_selected_phase() {
        let metrics = vec![
            metric(&[], 10.0, 100.0, 1.0, None),
            metric(&[], 30.0, 300.0, 3.0, None),
        ];
        let charts = default_charts();

        let pre = build_timing(&metrics, Phase::Preprocessing, &charts).unwrap();
        assert_eq!(pre.average_ms, 20.0);

        let infer = build_timing(&metrics, Phase::Inference, &charts).unwrap();
        assert_eq!(infer.average_ms, 200.0);
        assert_eq!(infer.histogram.total_count(), 2);
    }

    #[test]
    fn timing_skips_missing_values() {
        let mut incomplete = metric(&[], 1.0, 2.0, 3.0, None);
        incomplete.inference_time = None;
        let metrics = vec![incomplete, metric(&[], 1.0, 4.0, 3.0, None)];

        let report = build_timing(&metrics, Phase::Inference, &default_charts()).unwrap();
        assert_eq!(report.average_ms, 4.0);
        assert_eq!(report.histogram.total_count(), 1);
    }

    #[test]
    fn timing_totals_sum_each_phase() {
        let metrics = vec![
            metric(&[], 1.0, 10.0, 2.0, None),
            metric(&[], 3.0, 30.0, 4.0, None),
        ];
        let totals = build_timing_totals(&metrics).unwrap();
        assert_eq!(totals.preprocessing_ms, 4.0);
        assert_eq!(totals.inference_ms, 40.0);
        assert_eq!(totals.postprocessing_ms, 6.0);
        assert_eq!(totals.total_ms, 50.0);
    }

    #[test]
    fn box_sizes_average_matches_known_fixture() {
        // Four 20x20 boxes: average area 400 px².
        let m = ImageMetric {
            bbox_coordinates: vec![
                "10,20,30,40".to_string(),
                "50,60,70,80".to_string(),
                "100,110,120,130".to_string(),
                "150,160,170,180".to_string(),
            ],
            ..ImageMetric::default()
        };
        let report = build_box_sizes(&[m], &default_charts()).unwrap();
        assert_eq!(report.average_area, 400.0);
        assert_eq!(report.histogram.total_count(), 4);
    }

    #[test]
    fn box_sizes_all_malformed_is_no_data() {
        let m = ImageMetric {
            bbox_coordinates: vec!["oops".to_string()],
            ..ImageMetric::default()
        };
        assert!(build_box_sizes(&[m], &default_charts()).is_none());
    }

    #[test]
    fn box_size_histogram_uses_fifteen_bins() {
        let m = ImageMetric {
            bbox_coordinates: vec!["0,0,10,10".to_string(), "0,0,40,40".to_string()],
            ..ImageMetric::default()
        };
        let report = build_box_sizes(&[m], &default_charts()).unwrap();
        assert_eq!(report.histogram.bins.len(), 15);
    }

    #[test]
    fn proportions_report_flattens_per_detection_ratios() {
        let m = ImageMetric {
            box_proportions: vec![0.1, 0.2, 0.3],
            ..ImageMetric::default()
        };
        let report = build_proportions(&[m], &default_charts()).unwrap();
        assert!((report.average - 0.2).abs() < 1e-9);
    }

    #[test]
    fn detections_counts_per_image() {
        let metrics = vec![
            metric(&[0.1, 0.2, 0.3], 0.0, 0.0, 0.0, None),
            metric(&[0.9], 0.0, 0.0, 0.0, None),
        ];
        let report = build_detections(&metrics, &default_charts()).unwrap();
        assert_eq!(report.average, 2.0);
        assert_eq!(report.histogram.total_count(), 2);
    }

    #[test]
    fn class_distribution_counts_and_sorts() {
        let m1 = ImageMetric {
            labels: vec!["cat".to_string(), "dog".to_string(), "cat".to_string()],
            ..ImageMetric::default()
        };
        let m2 = ImageMetric {
            labels: vec!["dog".to_string(), "cat".to_string()],
            ..ImageMetric::default()
        };
        let dist = build_class_distribution(&[m1, m2]).unwrap();
        assert_eq!(dist.total_detections, 5);
        assert_eq!(dist.classes[0].label, "cat");
        assert_eq!(dist.classes[0].count, 3);
        assert_eq!(dist.classes[1].label, "dog");
        assert_eq!(dist.classes[1].count, 2);
    }

    #[test]
    fn batch_list_deduplicates_and_names() {
        let ids = vec![
            "0123456789abcdef".to_string(),
            "0123456789abcdef".to_string(),
            "fedcba9876543210".to_string(),
            String::new(),
        ];
        let list = build_batch_list(ids);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Batch 01234567");
        assert_eq!(list[1].id, "fedcba9876543210");
    }

    #[test]
    fn phase_parses_aliases() {
        assert_eq!(Phase::from_str_opt("pre"), Some(Phase::Preprocessing));
        assert_eq!(Phase::from_str_opt("inference"), Some(Phase::Inference));
        assert_eq!(Phase::from_str_opt("POST"), Some(Phase::Postprocessing));
        assert_eq!(Phase::from_str_opt("bogus"), None);
    }

    #[test]
    fn scope_parses_known_values() {
        assert_eq!(Scope::from_str_opt("internal"), Some(Scope::Internal));
        assert_eq!(Scope::from_str_opt("feedback"), Some(Scope::Feedback));
        assert_eq!(Scope::from_str_opt("other"), None);
    }
}
