/// Integration tests for the aggregation core.
///
/// Unit tests for individual functions live in each file's `#[cfg(test)]`
/// block. These tests pin down the cross-cutting properties the report
/// layer relies on: bin-count invariants, boundary placement, degenerate
/// inputs, and the precision summary arithmetic.
use optic::stats::precision::{ReviewRecord, summarize};
use optic::stats::{Histogram, Unit, fraction_above, mean};

fn review(label: &str, classified: bool, reviewed: bool) -> ReviewRecord {
    ReviewRecord {
        class_label: label.to_string(),
        classified,
        reviewed,
    }
}

// ---------------------------------------------------------------------------
// Histogram properties
// ---------------------------------------------------------------------------

#[test]
fn histogram_counts_always_sum_to_sample_count() {
    let cases: Vec<(Vec<f64>, usize)> = vec![
        ((0..100).map(|i| i as f64).collect(), 10),
        (vec![0.0, 0.0, 0.0, 1.0], 10),
        (vec![1.5], 5),
        (vec![3.0; 50], 15),
        (vec![-5.0, -1.0, 0.0, 2.5, 7.75], 7),
    ];

    for (samples, bins) in cases {
        let hist = Histogram::build(&samples, bins, Unit::Count);
        assert_eq!(
            hist.total_count(),
            samples.len(),
            "lost or duplicated samples for {samples:?} with {bins} bins"
        );
    }
}

#[test]
fn histogram_places_boundary_values_in_higher_bin() {
    // Range [0, 10) over 10 bins: width 1. A sample of exactly 2.0 belongs
    // to the [2, 3) bin, not [1, 2).
    let samples: Vec<f64> = vec![0.0, 2.0, 10.0];
    let hist = Histogram::build(&samples, 10, Unit::Count);

    assert_eq!(hist.bins[2].count, 1);
    assert_eq!(hist.bins[1].count, 0);
    // The maximum clamps into the last bin instead of falling off the end.
    assert_eq!(hist.bins[9].count, 1);
}

#[test]
fn histogram_of_identical_samples_is_a_single_bin() {
    let hist = Histogram::build(&[4.2; 12], 10, Unit::Score);
    assert_eq!(hist.bins.len(), 1);
    assert_eq!(hist.bins[0].count, 12);
}

#[test]
fn histogram_is_deterministic() {
    let samples: Vec<f64> = (0..37).map(|i| (i as f64 * 0.37) % 5.0).collect();
    let a = Histogram::build(&samples, 10, Unit::Milliseconds);
    let b = Histogram::build(&samples, 10, Unit::Milliseconds);

    for (x, y) in a.bins.iter().zip(b.bins.iter()) {
        assert_eq!(x.count, y.count);
        assert_eq!(x.label, y.label);
    }
}

#[test]
fn histogram_labels_cover_contiguous_ranges() {
    let samples: Vec<f64> = (0..20).map(|i| i as f64).collect();
    let hist = Histogram::build(&samples, 10, Unit::Count);

    for pair in hist.bins.windows(2) {
        assert!(
            (pair[0].upper - pair[1].lower).abs() < 1e-9,
            "bins must tile the sample range without gaps"
        );
    }
    assert_eq!(hist.bins[0].lower, 0.0);
    assert!((hist.bins[9].upper - 19.0).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Mean / fraction
// ---------------------------------------------------------------------------

#[test]
fn mean_of_known_samples() {
    assert_eq!(mean(&[10.0, 20.0, 30.0, 20.0, 10.0]), 18.0);
}

#[test]
fn mean_of_empty_is_nan() {
    assert!(mean(&[]).is_nan());
}

#[test]
fn fraction_above_is_strict() {
    let samples = [0.5, 0.8, 0.81, 0.9];
    assert_eq!(fraction_above(&samples, 0.8), 0.5);
}

// ---------------------------------------------------------------------------
// Precision summary
// ---------------------------------------------------------------------------

#[test]
fn precision_summary_known_fixture() {
    // A: 1 of 2 reviewed correct. B: 1 of 1. C: 0 of 1.
    let records = vec![
        review("A", true, true),
        review("A", false, true),
        review("B", true, true),
        review("C", false, true),
        review("B", true, false), // unreviewed; precision stays capped at 1.0
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
    assert!((summary.average_precision - 0.5).abs() < 1e-9);
    // 3 classified over 4 reviewed, weighted by record counts.
    assert!((summary.overall_accuracy - 0.75).abs() < 1e-9);
}

#[test]
fn precision_of_unreviewed_class_is_zero() {
    let records = vec![review("X", true, false), review("X", true, false)];
    let summary = summarize(&records);
    assert_eq!(summary.classes[0].precision, 0.0);
    assert_eq!(summary.overall_accuracy, 0.0);
}
