//! Configuration schema and defaults for optic.
//!
//! Defines the TOML-serializable configuration with two sections:
//! `[endpoint]` (where the GraphQL API lives) and `[charts]` (bin counts
//! and thresholds for the aggregation layer).
//!
//! Every field has a built-in default; users only set what they want to
//! override.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level optic configuration.
///
/// Maps directly to the `~/.optic/config.toml` and `.optic.toml` file
/// schemas. Missing sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticConfig {
    pub endpoint: EndpointConfig,
    pub charts: ChartsConfig,
}

// ---------------------------------------------------------------------------
// [endpoint]
// ---------------------------------------------------------------------------

/// GraphQL endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// GraphQL endpoint URL. Resolved once at startup and passed down —
    /// never re-read per report.
    pub url: String,
    /// HTTP request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/graphql".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [charts]
// ---------------------------------------------------------------------------

/// Bin counts and thresholds for the aggregation layer.
///
/// Bin counts must be positive — [`ChartsConfig::validate`] is applied after
/// config loading so the histogram builder never sees a zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Bins for the confidence-score distribution.
    pub confidence_bins: usize,
    /// Bins for pre/inference/post timing distributions.
    pub timing_bins: usize,
    /// Bins for the detections-per-image distribution.
    pub detection_bins: usize,
    /// Bins for the box-to-image proportion distribution.
    pub proportion_bins: usize,
    /// Bins for the bounding-box area distribution.
    pub box_size_bins: usize,
    /// A detection counts as high-confidence when its score is strictly
    /// greater than this.
    pub high_confidence_threshold: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            confidence_bins: 10,
            timing_bins: 10,
            detection_bins: 10,
            proportion_bins: 10,
            box_size_bins: 15,
            high_confidence_threshold: 0.8,
        }
    }
}

impl ChartsConfig {
    /// Clamp invalid values back to defaults. Zero bin counts would make
    /// the histogram builder divide by zero, so they are rejected here
    /// rather than validated on every call.
    pub fn validate(&mut self) {
        let defaults = ChartsConfig::default();
        if self.confidence_bins == 0 {
            self.confidence_bins = defaults.confidence_bins;
        }
        if self.timing_bins == 0 {
            self.timing_bins = defaults.timing_bins;
        }
        if self.detection_bins == 0 {
            self.detection_bins = defaults.detection_bins;
        }
        if self.proportion_bins == 0 {
            self.proportion_bins = defaults.proportion_bins;
        }
        if self.box_size_bins == 0 {
            self.box_size_bins = defaults.box_size_bins;
        }
        if !(0.0..=1.0).contains(&self.high_confidence_threshold) {
            self.high_confidence_threshold = defaults.high_confidence_threshold;
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl OpticConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `optic config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# optic Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (OPTIC_*)
#   2. Project config (.optic.toml in current directory)
#   3. User global config (~/.optic/config.toml)
#   4. Built-in defaults

[endpoint]
url = "http://localhost:8000/graphql"   # Or set OPTIC_ENDPOINT
timeout_ms = 10000                      # Or set OPTIC_TIMEOUT_MS

[charts]
confidence_bins = 10
timing_bins = 10
detection_bins = 10
proportion_bins = 10
box_size_bins = 15
high_confidence_threshold = 0.8         # Or set OPTIC_HIGH_CONFIDENCE_THRESHOLD
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = OpticConfig::default();
        assert_eq!(config.endpoint.url, "http://localhost:8000/graphql");
        assert_eq!(config.endpoint.timeout_ms, 10_000);
        assert_eq!(config.charts.confidence_bins, 10);
        assert_eq!(config.charts.box_size_bins, 15);
        assert_eq!(config.charts.high_confidence_threshold, 0.8);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[endpoint]
url = "https://metrics.example.com/graphql"
"#;
        let config: OpticConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.endpoint.url, "https://metrics.example.com/graphql");
        // Everything else falls back to defaults.
        assert_eq!(config.endpoint.timeout_ms, 10_000);
        assert_eq!(config.charts.timing_bins, 10);
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: OpticConfig = toml::from_str("").unwrap();
        assert_eq!(config.charts.detection_bins, 10);
    }

    #[test]
    fn validate_rejects_zero_bins() {
        let mut charts = ChartsConfig {
            confidence_bins: 0,
            ..ChartsConfig::default()
        };
        charts.validate();
        assert_eq!(charts.confidence_bins, 10);
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let mut charts = ChartsConfig {
            high_confidence_threshold: 1.5,
            ..ChartsConfig::default()
        };
        charts.validate();
        assert_eq!(charts.high_confidence_threshold, 0.8);
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = OpticConfig::default_toml();
        let config: OpticConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.charts.box_size_bins, 15);
    }
}
