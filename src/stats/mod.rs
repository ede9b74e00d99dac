//! Pure aggregation core — summary statistics and histogram binning.
//!
//! Everything in this module is synchronous, allocation-light, and free of
//! I/O. The report layer feeds it sample slices extracted from one GraphQL
//! response; nothing here retains state between calls.
//!
//! Empty-input policy: [`mean`] and [`fraction_above`] return `NaN` on an
//! empty slice (sum over zero samples divided by zero). Callers that render
//! values must check for emptiness first — the report layer does this by
//! returning a "no data" outcome before aggregating.

pub mod precision;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Scalar statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean of `samples`. Returns `NaN` when `samples` is empty.
pub fn mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Fraction of samples strictly greater than `threshold` (`>`, not `>=`).
///
/// Returns `NaN` when `samples` is empty — same caller-guard obligation
/// as [`mean`].
pub fn fraction_above(samples: &[f64], threshold: f64) -> f64 {
    let above = samples.iter().filter(|&&s| s > threshold).count();
    above as f64 / samples.len() as f64
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Unit of measure for a sample set, used only for bin label formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Confidence score in `[0, 1]`, formatted with 2 decimals.
    Score,
    /// Duration in milliseconds, formatted with 2 decimals.
    Milliseconds,
    /// Bounding-box area in pixels², formatted as whole numbers.
    PixelsSquared,
    /// Box-to-image ratio, formatted as a percentage.
    Ratio,
    /// Detections per image, formatted with 1 decimal.
    Count,
}

impl Unit {
    fn format_value(self, v: f64) -> String {
        match self {
            Self::Score | Self::Milliseconds => format!("{v:.2}"),
            Self::PixelsSquared => format!("{v:.0}"),
            Self::Ratio => format!("{:.1}%", v * 100.0),
            Self::Count => format!("{v:.1}"),
        }
    }
}

/// One interval of a histogram's domain partition.
///
/// Bounds are half-open `[lower, upper)` except for the last bin of a
/// histogram, which is closed so the maximum sample is included.
#[derive(Debug, Clone, Serialize)]
pub struct Bin {
    /// Display label, `"lower - upper"` formatted per the histogram's unit.
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// A fixed-count, equal-width histogram over `[sample_min, sample_max]`.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// Bins in ascending order of `lower`; adjacent bins share a boundary.
    pub bins: Vec<Bin>,
    pub bin_width: f64,
    pub sample_min: f64,
    pub sample_max: f64,
}

impl Histogram {
    /// Partition `samples` into `bin_count` equal-width bins.
    ///
    /// Preconditions (enforced by callers, not validated here): `samples`
    /// is non-empty and `bin_count` is positive. Config values that reach
    /// this call are checked at load time.
    ///
    /// A sample exactly on an internal boundary lands in the higher bin;
    /// the maximum sample is clamped into the last bin. When all samples
    /// are identical the width is zero and the histogram degenerates to a
    /// single bin holding every sample.
    ///
    /// Invariant for non-empty input: bin counts sum to `samples.len()`.
    pub fn build(samples: &[f64], bin_count: usize, unit: Unit) -> Histogram {
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let width = (max - min) / bin_count as f64;

        if width == 0.0 {
            // All samples identical; one closed bin at the common value.
            let bin = Bin {
                label: format!("{} - {}", unit.format_value(min), unit.format_value(max)),
                lower: min,
                upper: max,
                count: samples.len(),
            };
            return Histogram {
                bins: vec![bin],
                bin_width: 0.0,
                sample_min: min,
                sample_max: max,
            };
        }

        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| {
                let lower = min + i as f64 * width;
                let upper = lower + width;
                Bin {
                    label: format!(
                        "{} - {}",
                        unit.format_value(lower),
                        unit.format_value(upper)
                    ),
                    lower,
                    upper,
                    count: 0,
                }
            })
            .collect();

        for &s in samples {
            let index = (((s - min) / width).floor() as usize).min(bin_count - 1);
            bins[index].count += 1;
        }

        Histogram {
            bins,
            bin_width: width,
            sample_min: min,
            sample_max: max,
        }
    }

    /// Total number of samples counted across all bins.
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

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
        // 0.8 itself does not count: strictly greater than.
        let samples = [0.5, 0.8, 0.81, 0.9];
        assert_eq!(fraction_above(&samples, 0.8), 0.5);
    }

    #[test]
    fn fraction_above_empty_is_nan() {
        assert!(fraction_above(&[], 0.8).is_nan());
    }

    #[test]
    fn histogram_counts_sum_to_sample_count() {
        let samples = [1.0, 2.5, 3.0, 4.4, 7.2, 9.9, 10.0];
        let hist = Histogram::build(&samples, 10, Unit::Milliseconds);
        assert_eq!(hist.total_count(), samples.len());
    }

    #[test]
    fn histogram_max_sample_lands_in_last_bin() {
        let samples = [0.0, 5.0, 10.0];
        let hist = Histogram::build(&samples, 10, Unit::Milliseconds);
        assert_eq!(hist.bins.len(), 10);
        assert_eq!(hist.bins[9].count, 1);
        assert_eq!(hist.total_count(), 3);
    }

    #[test]
    fn histogram_boundary_value_lands_in_higher_bin() {
        // Width is 1.0; the sample 2.0 sits exactly on the bins[1]/bins[2]
        // boundary and must be counted in bins[2].
        let samples = [0.0, 2.0, 10.0];
        let hist = Histogram::build(&samples, 10, Unit::Count);
        assert_eq!(hist.bins[2].count, 1);
        assert_eq!(hist.bins[1].count, 0);
    }

    #[test]
    fn histogram_degenerate_single_value_uses_one_bin() {
        let hist = Histogram::build(&[5.0, 5.0, 5.0], 10, Unit::Score);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 3);
        assert_eq!(hist.bin_width, 0.0);
    }

    #[test]
    fn histogram_bins_are_contiguous_and_ascending() {
        let samples = [1.0, 3.7, 8.2, 15.0];
        let hist = Histogram::build(&samples, 10, Unit::Milliseconds);
        for pair in hist.bins.windows(2) {
            assert!(pair[0].lower < pair[1].lower);
            assert!((pair[0].upper - pair[1].lower).abs() < 1e-9);
        }
    }

    #[test]
    fn histogram_is_deterministic() {
        let samples = [0.12, 0.5, 0.5, 0.77, 0.93];
        let a = Histogram::build(&samples, 10, Unit::Score);
        let b = Histogram::build(&samples, 10, Unit::Score);
        for (x, y) in a.bins.iter().zip(&b.bins) {
            assert_eq!(x.lower.to_bits(), y.lower.to_bits());
            assert_eq!(x.upper.to_bits(), y.upper.to_bits());
            assert_eq!(x.count, y.count);
        }
    }

    #[test]
    fn ratio_labels_are_percentages() {
        let hist = Histogram::build(&[0.0, 1.0], 2, Unit::Ratio);
        assert_eq!(hist.bins[0].label, "0.0% - 50.0%");
        assert_eq!(hist.bins[1].label, "50.0% - 100.0%");
    }

    #[test]
    fn area_labels_are_whole_numbers() {
        let hist = Histogram::build(&[0.0, 400.0], 2, Unit::PixelsSquared);
        assert_eq!(hist.bins[0].label, "0 - 200");
    }
}
