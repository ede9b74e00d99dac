//! CLI command implementations for optic reports and diagnostics.
//!
//! Provides subcommand handlers for:
//! - `optic overview` — headline numbers across the dataset
//! - `optic confidence` — confidence distribution and high-confidence rate
//! - `optic timing [--phase]` — pipeline timing totals or one phase's distribution
//! - `optic boxes` / `optic proportions` — bounding-box size metrics
//! - `optic detections` — detections-per-image distribution
//! - `optic precision` — per-class precision from review feedback
//! - `optic classes` — detected class distribution
//! - `optic batches` — list selectable batches
//! - `optic health` — check endpoint reachability and config
//! - `optic config show|init|set|reset` — configuration management

use anyhow::Result;
use colored::Colorize;

use crate::client::GraphqlClient;
use crate::config;
use crate::report::{self, Phase, Scope};
use crate::stats::Histogram;
use crate::stats::precision::PrecisionSummary;

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn client() -> GraphqlClient {
    GraphqlClient::from_config(&config::load())
}

fn print_no_data() {
    println!("{}", "No data available.".yellow());
}

// ---------------------------------------------------------------------------
// optic overview
// ---------------------------------------------------------------------------

/// Show headline metrics across the dataset (or one batch).
pub fn run_overview(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let Some(overview) = report::overview(&client(), batch)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&overview)?),
        OutputFormat::Csv => print_overview_csv(&overview),
        OutputFormat::Table => print_overview_table(&overview),
    }

    Ok(())
}

fn print_overview_table(overview: &report::OverviewReport) {
    println!("{}", "Classification Overview".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("  {} {}", "Total images:    ".bold(), overview.total_images);
    println!(
        "  {} {:.2}",
        "Avg confidence:  ".bold(),
        overview.average_confidence
    );
    println!(
        "  {} {:.1}",
        "Avg detections:  ".bold(),
        overview.average_detections
    );
    println!();

    println!("{}", "Pipeline Latency (avg per image)".bold().cyan());
    println!("  {:<16} {:>10} {:>8}", "Phase", "Time (ms)", "Share");
    println!("  {}", "-".repeat(36));
    println!(
        "  {:<16} {:>10.1} {:>7.1}%",
        "Preprocessing", overview.average_preprocessing_ms, overview.preprocessing_share_pct
    );
    println!(
        "  {:<16} {:>10.1} {:>7.1}%",
        "Inference", overview.average_inference_ms, overview.inference_share_pct
    );
    println!(
        "  {:<16} {:>10.1} {:>7.1}%",
        "Postprocessing", overview.average_postprocessing_ms, overview.postprocessing_share_pct
    );
    println!("  {}", "-".repeat(36));
    println!(
        "  {:<16} {:>10.1}",
        "Total".bold(),
        overview.total_latency_ms
    );
}

fn print_overview_csv(overview: &report::OverviewReport) {
    println!("metric,value");
    println!("total_images,{}", overview.total_images);
    println!("average_confidence,{:.4}", overview.average_confidence);
    println!("average_detections,{:.2}", overview.average_detections);
    println!(
        "average_preprocessing_ms,{:.2}",
        overview.average_preprocessing_ms
    );
    println!("average_inference_ms,{:.2}", overview.average_inference_ms);
    println!(
        "average_postprocessing_ms,{:.2}",
        overview.average_postprocessing_ms
    );
    println!("total_latency_ms,{:.2}", overview.total_latency_ms);
}

// ---------------------------------------------------------------------------
// optic confidence
// ---------------------------------------------------------------------------

/// Show the confidence-score distribution.
pub fn run_confidence(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);
    let Some(confidence) = report::confidence(&graphql, batch, &cfg.charts)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&confidence)?),
        OutputFormat::Csv => print_histogram_csv(&confidence.histogram),
        OutputFormat::Table => {
            println!("{}", "Confidence Distribution".bold().cyan());
            println!("{}", "=".repeat(50));
            println!();
            println!("  {} {:.2}", "Average:        ".bold(), confidence.average);
            println!(
                "  {} {:.1}% (above {:.2})",
                "High confidence:".bold(),
                confidence.high_confidence_pct,
                confidence.threshold
            );
            println!();
            print_histogram_table(&confidence.histogram);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// optic timing
// ---------------------------------------------------------------------------

/// Show timing metrics. With a phase: that phase's distribution. Without:
/// summed totals for the phase-by-phase comparison.
pub fn run_timing(format: OutputFormat, phase: Option<Phase>, batch: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);

    match phase {
        Some(phase) => {
            let Some(timing) = report::timing(&graphql, phase, batch, &cfg.charts)? else {
                print_no_data();
                return Ok(());
            };
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&timing)?),
                OutputFormat::Csv => print_histogram_csv(&timing.histogram),
                OutputFormat::Table => {
                    println!(
                        "{}",
                        format!("{} Time Distribution", phase.label()).bold().cyan()
                    );
                    println!("{}", "=".repeat(50));
                    println!();
                    println!("  {} {:.1} ms", "Average:".bold(), timing.average_ms);
                    println!();
                    print_histogram_table(&timing.histogram);
                }
            }
        }
        None => {
            let Some(totals) = report::timing_totals(&graphql, batch)? else {
                print_no_data();
                return Ok(());
            };
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&totals)?),
                OutputFormat::Csv => {
                    println!("phase,total_ms");
                    println!("preprocessing,{:.2}", totals.preprocessing_ms);
                    println!("inference,{:.2}", totals.inference_ms);
                    println!("postprocessing,{:.2}", totals.postprocessing_ms);
                    println!("total,{:.2}", totals.total_ms);
                }
                OutputFormat::Table => print_timing_totals_table(&totals),
            }
        }
    }

    Ok(())
}

fn print_timing_totals_table(totals: &report::TimingTotals) {
    println!("{}", "Pipeline Time Totals".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {:<16} {:>12}", "Phase", "Total (ms)");
    println!("  {}", "-".repeat(30));
    println!("  {:<16} {:>12.1}", "Preprocessing", totals.preprocessing_ms);
    println!("  {:<16} {:>12.1}", "Inference", totals.inference_ms);
    println!(
        "  {:<16} {:>12.1}",
        "Postprocessing", totals.postprocessing_ms
    );
    println!("  {}", "-".repeat(30));
    println!("  {:<16} {:>12.1}", "Total".bold(), totals.total_ms);
}

// ---------------------------------------------------------------------------
// optic boxes / proportions
// ---------------------------------------------------------------------------

/// Show the bounding-box area distribution.
pub fn run_boxes(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);
    let Some(boxes) = report::box_sizes(&graphql, batch, &cfg.charts)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&boxes)?),
        OutputFormat::Csv => print_histogram_csv(&boxes.histogram),
        OutputFormat::Table => {
            println!("{}", "Bounding Box Size Distribution".bold().cyan());
            println!("{}", "=".repeat(50));
            println!();
            println!("  {} {:.0} px²", "Average area:".bold(), boxes.average_area);
            println!();
            print_histogram_table(&boxes.histogram);
        }
    }

    Ok(())
}

/// Show the box-to-image proportion distribution.
pub fn run_proportions(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);
    let Some(proportions) = report::proportions(&graphql, batch, &cfg.charts)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&proportions)?),
        OutputFormat::Csv => print_histogram_csv(&proportions.histogram),
        OutputFormat::Table => {
            println!("{}", "Box-to-Image Proportion Distribution".bold().cyan());
            println!("{}", "=".repeat(50));
            println!();
            println!(
                "  {} {:.1}%",
                "Average proportion:".bold(),
                proportions.average * 100.0
            );
            println!();
            print_histogram_table(&proportions.histogram);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// optic detections
// ---------------------------------------------------------------------------

/// Show the detections-per-image distribution.
pub fn run_detections(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);
    let Some(detections) = report::detections(&graphql, batch, &cfg.charts)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detections)?),
        OutputFormat::Csv => print_histogram_csv(&detections.histogram),
        OutputFormat::Table => {
            println!("{}", "Detections per Image".bold().cyan());
            println!("{}", "=".repeat(50));
            println!();
            println!("  {} {:.1}", "Average:".bold(), detections.average);
            println!();
            print_histogram_table(&detections.histogram);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// optic precision
// ---------------------------------------------------------------------------

/// Show per-class precision computed from review feedback.
pub fn run_precision(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let Some(summary) = report::precision_report(&client(), batch)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Csv => print_precision_csv(&summary),
        OutputFormat::Table => print_precision_table(&summary),
    }

    Ok(())
}

fn print_precision_table(summary: &PrecisionSummary) {
    println!("{}", "Class Precision Report".bold().cyan());
    println!("{}", "=".repeat(56));
    println!(
        "  {:<20} {:>10} {:>10} {:>10}",
        "Class", "Correct", "Reviewed", "Precision"
    );
    println!("  {}", "-".repeat(54));

    for (i, class) in summary.classes.iter().enumerate() {
        let line = format!(
            "  {:<20} {:>10} {:>10} {:>9.1}%",
            truncate(&class.label, 20),
            class.classified,
            class.reviewed,
            class.precision * 100.0,
        );
        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!("  {}", "-".repeat(54));
    println!(
        "  {} {:.1}%",
        "Average precision:".bold(),
        summary.average_precision * 100.0
    );
    println!(
        "  {} {:.1}%",
        "Overall accuracy: ".bold(),
        summary.overall_accuracy * 100.0
    );
}

fn print_precision_csv(summary: &PrecisionSummary) {
    println!("class,classified,reviewed,precision");
    for class in &summary.classes {
        println!(
            "{},{},{},{:.4}",
            class.label, class.classified, class.reviewed, class.precision,
        );
    }
}

// ---------------------------------------------------------------------------
// optic classes
// ---------------------------------------------------------------------------

/// Show the distribution of detected classes.
pub fn run_classes(format: OutputFormat, batch: Option<&str>) -> Result<()> {
    let Some(dist) = report::class_distribution(&client(), batch)? else {
        print_no_data();
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dist)?),
        OutputFormat::Csv => {
            println!("class,count");
            for class in &dist.classes {
                println!("{},{}", class.label, class.count);
            }
        }
        OutputFormat::Table => print_classes_table(&dist),
    }

    Ok(())
}

fn print_classes_table(dist: &report::ClassDistribution) {
    println!("{}", "Detected Class Distribution".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {:<20} {:>8} {:>8}", "Class", "Count", "Share");
    println!("  {}", "-".repeat(48));

    for (i, class) in dist.classes.iter().enumerate() {
        let share = class.count as f64 / dist.total_detections as f64 * 100.0;
        let line = format!(
            "  {:<20} {:>8} {:>7.1}%",
            truncate(&class.label, 20),
            class.count,
            share,
        );
        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!("  {}", "-".repeat(48));
    println!(
        "  {} {}",
        "Total detections:".bold(),
        dist.total_detections
    );
}

// ---------------------------------------------------------------------------
// optic batches
// ---------------------------------------------------------------------------

/// List the batches available for filtering.
pub fn run_batches(format: OutputFormat, scope: Scope) -> Result<()> {
    let batches = report::batches(&client(), scope)?;

    if batches.is_empty() {
        println!("{}", "No batches found.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batches)?),
        OutputFormat::Csv => {
            println!("id,name");
            for batch in &batches {
                println!("{},{}", batch.id, batch.name);
            }
        }
        OutputFormat::Table => {
            println!("{}", "Available Batches".bold().cyan());
            println!("{}", "=".repeat(50));
            for batch in &batches {
                println!("  {:<16} {}", batch.name.bold(), batch.id.dimmed());
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// optic health
// ---------------------------------------------------------------------------

/// Check endpoint reachability and configuration status.
pub fn run_health() -> Result<()> {
    println!("{}", "optic Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.optic/config.toml found"
        } else {
            "not found (run `optic config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".optic.toml found"
        } else {
            "none (optional)"
        },
    );

    let cfg = config::load();
    let graphql = GraphqlClient::from_config(&cfg);
    let reachable = graphql.is_reachable();
    let detail = if reachable {
        format!("reachable at {}", graphql.endpoint())
    } else {
        format!(
            "not reachable at {} — is the backend running?",
            graphql.endpoint()
        )
    };
    print_health_item("GraphQL endpoint", reachable, &detail);
    print_health_item("Timeout", true, &format!("{} ms", cfg.endpoint.timeout_ms));

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<20} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// optic config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective optic Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.optic/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.optic/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".optic.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".optic.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "OPTIC_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.optic/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to point optic at your GraphQL backend.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

const BAR_WIDTH: usize = 30;

/// Print a histogram as a labeled bar chart, one bin per row.
fn print_histogram_table(histogram: &Histogram) {
    let max_count = histogram
        .bins
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(1);

    println!("  {:<22} {:>6}", "Range", "Count");
    println!("  {}", "-".repeat(22 + 8 + BAR_WIDTH));

    for (i, bin) in histogram.bins.iter().enumerate() {
        let filled = bin.count * BAR_WIDTH / max_count;
        let bar: String = "█".repeat(filled);
        let line = format!("  {:<22} {:>6} {}", bin.label, bin.count, bar.cyan());
        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }

    println!("  {}", "-".repeat(22 + 8 + BAR_WIDTH));
    println!("  {} {}", "Samples:".bold(), histogram.total_count());
}

fn print_histogram_csv(histogram: &Histogram) {
    println!("range,lower,upper,count");
    for bin in &histogram.bins {
        println!(
            "{},{:.4},{:.4},{}",
            bin.label, bin.lower, bin.upper, bin.count,
        );
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
