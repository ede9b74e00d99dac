//! optic — CLI and local dashboard for image-classification metrics.
//!
//! Fetches classification results and per-image operational metrics from a
//! GraphQL backend and turns them into distributions, summaries, and a
//! per-class precision report. One fetch/aggregate pipeline serves both the
//! CLI subcommands and the embedded web dashboard.

pub mod cli;
pub mod client;
pub mod config;
pub mod report;
pub mod stats;
pub mod web;
