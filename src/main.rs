use anyhow::Result;
use clap::{Parser, Subcommand};

use optic::cli::{self, OutputFormat};
use optic::report::{Phase, Scope};
use optic::web;

#[derive(Debug, Parser)]
#[command(name = "optic")]
#[command(about = "Metrics reports for image-classification results")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Headline metrics: image count, confidence, detections, latency
    Overview {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Restrict to one batch id
        #[arg(long)]
        batch: Option<String>,
    },
    /// Confidence-score distribution and high-confidence rate
    Confidence {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Pipeline timing: totals, or one phase's distribution with --phase
    Timing {
        /// Phase to break down: pre, inference, post
        #[arg(long)]
        phase: Option<String>,
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Bounding-box area distribution
    Boxes {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Box-to-image proportion distribution
    Proportions {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Detections-per-image distribution
    Detections {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Per-class precision from review feedback
    Precision {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// Distribution of detected classes
    Classes {
        #[arg(long, default_value = "table")]
        format: String,
        #[arg(long)]
        batch: Option<String>,
    },
    /// List available batches
    Batches {
        /// Which dataset to list batches from: internal (default), feedback
        #[arg(long, default_value = "internal")]
        scope: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check endpoint reachability and config
    Health,
    /// Serve the local web dashboard
    Web {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:9317")]
        addr: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective merged configuration
    Show,
    /// Write a default config file to ~/.optic/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a config value, e.g. `optic config set endpoint.url http://host/graphql`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Overview { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_overview(fmt, batch.as_deref())
        }
        Commands::Confidence { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_confidence(fmt, batch.as_deref())
        }
        Commands::Timing {
            phase,
            format,
            batch,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            let phase = match phase.as_deref() {
                Some(raw) => Some(
                    Phase::from_str_opt(raw)
                        .ok_or_else(|| anyhow::anyhow!("unknown phase: {raw} (expected pre, inference, or post)"))?,
                ),
                None => None,
            };
            cli::run_timing(fmt, phase, batch.as_deref())
        }
        Commands::Boxes { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_boxes(fmt, batch.as_deref())
        }
        Commands::Proportions { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_proportions(fmt, batch.as_deref())
        }
        Commands::Detections { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_detections(fmt, batch.as_deref())
        }
        Commands::Precision { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_precision(fmt, batch.as_deref())
        }
        Commands::Classes { format, batch } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_classes(fmt, batch.as_deref())
        }
        Commands::Batches { scope, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            let scope = Scope::from_str_opt(&scope)
                .ok_or_else(|| anyhow::anyhow!("unknown scope: {scope} (expected internal or feedback)"))?;
            cli::run_batches(fmt, scope)
        }
        Commands::Health => cli::run_health(),
        Commands::Web { addr } => web::serve(&addr),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
