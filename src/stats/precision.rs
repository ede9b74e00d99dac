//! Per-class precision aggregation over reviewed classification results.
//!
//! Scans per-detection records of `{class_label, classified, reviewed}` and
//! produces two deliberately separate statistics:
//!
//! - **per-class precision** (and its unweighted mean, "average precision"),
//! - **overall accuracy** — total classified over total reviewed across all
//!   records, which weights classes by their record counts.
//!
//! The two differ whenever class sizes are uneven; consumers must not treat
//! one as a substitute for the other.

use std::collections::BTreeMap;

use serde::Serialize;

/// One per-detection record as returned by the `results` query.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub class_label: String,
    /// The model's prediction was confirmed correct.
    pub classified: bool,
    /// A human has provided ground-truth feedback for this prediction.
    pub reviewed: bool,
}

/// Accumulated counters for one class label.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ClassCounts {
    pub classified: usize,
    pub reviewed: usize,
}

impl ClassCounts {
    /// Precision for this class: `classified / reviewed`, zero-guarded and
    /// capped at 1.0 (classified can exceed reviewed when unreviewed
    /// predictions were counted as classified).
    pub fn precision(&self) -> f64 {
        if self.reviewed == 0 {
            0.0
        } else {
            (self.classified as f64 / self.reviewed as f64).min(1.0)
        }
    }
}

/// Precision for one class label, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct ClassPrecision {
    pub label: String,
    pub precision: f64,
    pub classified: usize,
    pub reviewed: usize,
}

/// Aggregated precision statistics across all classes.
#[derive(Debug, Clone, Serialize)]
pub struct PrecisionSummary {
    /// Sorted by label for stable output; consumers treat order as
    /// irrelevant.
    pub classes: Vec<ClassPrecision>,
    /// Unweighted arithmetic mean of per-class precisions.
    pub average_precision: f64,
    /// Total classified over total reviewed across all records.
    pub overall_accuracy: f64,
}

/// Accumulate per-class counters from a record scan.
///
/// Keys are class labels; a `BTreeMap` keeps iteration order stable
/// regardless of arrival order.
pub fn aggregate_counts(records: &[ReviewRecord]) -> BTreeMap<String, ClassCounts> {
    let mut counts: BTreeMap<String, ClassCounts> = BTreeMap::new();
    for record in records {
        let entry = counts.entry(record.class_label.clone()).or_default();
        if record.classified {
            entry.classified += 1;
        }
        if record.reviewed {
            entry.reviewed += 1;
        }
    }
    counts
}

/// Build the full precision summary from one response's records.
pub fn summarize(records: &[ReviewRecord]) -> PrecisionSummary {
    let counts = aggregate_counts(records);

    let classes: Vec<ClassPrecision> = counts
        .iter()
        .map(|(label, c)| ClassPrecision {
            label: label.clone(),
            precision: c.precision(),
            classified: c.classified,
            reviewed: c.reviewed,
        })
        .collect();

    let average_precision = if classes.is_empty() {
        0.0
    } else {
        classes.iter().map(|c| c.precision).sum::<f64>() / classes.len() as f64
    };

    let total_classified: usize = counts.values().map(|c| c.classified).sum();
    let total_reviewed: usize = counts.values().map(|c| c.reviewed).sum();
    let overall_accuracy = if total_reviewed == 0 {
        0.0
    } else {
        total_classified as f64 / total_reviewed as f64
    };

    PrecisionSummary {
        classes,
        average_precision,
        overall_accuracy,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, classified: bool, reviewed: bool) -> ReviewRecord {
        ReviewRecord {
            class_label: label.to_string(),
            classified,
            reviewed,
        }
    }

    #[test]
    fn per_class_precision_and_overall_accuracy_stay_separate() {
        let records = vec![
            record("A", true, true),
            record("A", false, true),
            record("B", true, false),
            record("B", true, true),
            record("C", false, true),
        ];
        let summary = summarize(&records);

        let by_label: std::collections::HashMap<&str, f64> = summary
            .classes
            .iter()
            .map(|c| (c.label.as_str(), c.precision))
            .collect();
        assert_eq!(by_label["A"], 0.5);
        assert_eq!(by_label["B"], 1.0);
        assert_eq!(by_label["C"], 0.0);

        // 3 classified / 4 reviewed across all records.
        assert_eq!(summary.overall_accuracy, 0.75);
        // (0.5 + 1.0 + 0.0) / 3 — distinct from overall accuracy.
        assert!((summary.average_precision - 0.5).abs() < 1e-9);
    }

    #[test]
    fn unreviewed_class_has_zero_precision() {
        let records = vec![record("X", true, false)];
        let summary = summarize(&records);
        assert_eq!(summary.classes[0].precision, 0.0);
        assert_eq!(summary.overall_accuracy, 0.0);
    }

    #[test]
    fn empty_records_produce_empty_summary() {
        let summary = summarize(&[]);
        assert!(summary.classes.is_empty());
        assert_eq!(summary.average_precision, 0.0);
        assert_eq!(summary.overall_accuracy, 0.0);
    }

    #[test]
    fn classes_are_sorted_by_label() {
        let records = vec![
            record("zebra", true, true),
            record("apple", true, true),
            record("mango", false, true),
        ];
        let summary = summarize(&records);
        let labels: Vec<&str> = summary.classes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn aggregate_counts_tallies_flags_independently() {
        let records = vec![
            record("A", true, false),
            record("A", false, true),
            record("A", true, true),
        ];
        let counts = aggregate_counts(&records);
        assert_eq!(counts["A"].classified, 2);
        assert_eq!(counts["A"].reviewed, 2);
    }
}
