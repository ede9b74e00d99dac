//! Wire types for the GraphQL API and sample-extraction helpers.
//!
//! Field names follow the API's camelCase schema. Parsing is deliberately
//! lenient: optional fields default, and the extraction helpers filter out
//! anything non-finite so the aggregation core only ever sees usable
//! numbers.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// results { ... }
// ---------------------------------------------------------------------------

/// One classification result with review feedback, from the `results` query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub class_label: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub classified: bool,
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub batch_id: Option<String>,
}

// ---------------------------------------------------------------------------
// imageMetrics { ... }
// ---------------------------------------------------------------------------

/// Per-image operational metrics from the `imageMetrics` query.
///
/// `confidences`, `labels`, `bbox_coordinates`, and `box_proportions` are
/// parallel per-detection arrays; the timing fields are per-image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageMetric {
    pub image_url: Option<String>,
    pub labels: Vec<String>,
    pub confidences: Vec<f64>,
    /// Bounding boxes as `"x1,y1,x2,y2"` strings.
    pub bbox_coordinates: Vec<String>,
    /// Box-to-image area ratios in `[0, 1]`.
    pub box_proportions: Vec<f64>,
    pub preprocessing_time: Option<f64>,
    pub inference_time: Option<f64>,
    pub postprocessing_time: Option<f64>,
    pub batch_id: Option<String>,
}

impl ImageMetric {
    /// Areas (px²) of this image's bounding boxes. Malformed coordinate
    /// strings are skipped.
    pub fn bbox_areas(&self) -> impl Iterator<Item = f64> + '_ {
        self.bbox_coordinates
            .iter()
            .filter_map(|s| parse_bbox_area(s))
    }
}

/// Parse a `"x1,y1,x2,y2"` bounding box and return its area.
///
/// Returns `None` for anything that isn't exactly four finite numbers or
/// whose area would be non-finite or negative.
pub fn parse_bbox_area(coords: &str) -> Option<f64> {
    let mut parts = coords.split(',').map(|p| p.trim().parse::<f64>());
    let x1 = parts.next()?.ok()?;
    let y1 = parts.next()?.ok()?;
    let x2 = parts.next()?.ok()?;
    let y2 = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }

    let area = (x2 - x1) * (y2 - y1);
    (area.is_finite() && area >= 0.0).then_some(area)
}

/// Keep only finite values. The API occasionally returns nulls or NaN for
/// timing fields; filtering here keeps the aggregation preconditions simple.
pub fn finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values.into_iter().filter(|v| v.is_finite()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bbox_area_computes_width_times_height() {
        assert_eq!(parse_bbox_area("10,20,30,40"), Some(400.0));
        assert_eq!(parse_bbox_area("0,0,100,50"), Some(5000.0));
    }

    #[test]
    fn parse_bbox_area_tolerates_whitespace() {
        assert_eq!(parse_bbox_area(" 10, 20, 30, 40 "), Some(400.0));
    }

    #[test]
    fn parse_bbox_area_rejects_malformed_input() {
        assert_eq!(parse_bbox_area(""), None);
        assert_eq!(parse_bbox_area("10,20,30"), None);
        assert_eq!(parse_bbox_area("10,20,30,40,50"), None);
        assert_eq!(parse_bbox_area("a,b,c,d"), None);
    }

    #[test]
    fn parse_bbox_area_rejects_negative_area() {
        // Inverted coordinates produce a negative area.
        assert_eq!(parse_bbox_area("30,40,10,20"), Some(400.0));
        assert_eq!(parse_bbox_area("30,20,10,40"), None);
    }

    #[test]
    fn finite_drops_nan_and_infinities() {
        let values = vec![1.0, f64::NAN, 2.0, f64::INFINITY, f64::NEG_INFINITY];
        assert_eq!(finite(values), vec![1.0, 2.0]);
    }

    #[test]
    fn result_record_deserializes_camel_case() {
        let json = r#"{
            "classLabel": "scratch",
            "confidence": 0.92,
            "imageUrl": "https://img/1.png",
            "classified": true,
            "reviewed": true,
            "batchId": "b-1"
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.class_label, "scratch");
        assert_eq!(record.confidence, Some(0.92));
        assert!(record.classified);
        assert_eq!(record.batch_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn image_metric_defaults_missing_fields() {
        let json = r#"{"inferenceTime": 12.5}"#;
        let metric: ImageMetric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.inference_time, Some(12.5));
        assert!(metric.confidences.is_empty());
        assert!(metric.preprocessing_time.is_none());
    }

    #[test]
    fn bbox_areas_skips_bad_entries() {
        let metric = ImageMetric {
            bbox_coordinates: vec![
                "10,20,30,40".to_string(),
                "garbage".to_string(),
                "0,0,10,10".to_string(),
            ],
            ..ImageMetric::default()
        };
        let areas: Vec<f64> = metric.bbox_areas().collect();
        assert_eq!(areas, vec![400.0, 100.0]);
    }
}
