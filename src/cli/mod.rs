//! Command-line parsing for the sales analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DEFAULT_DATA_FILE;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales data analysis and revenue forecasting")]
pub struct Cli {
    /// Log filter (e.g. `info`, `debug`, `sales_insight=trace`).
    #[arg(long, global = true, env = "SALES_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a synthetic sales CSV.
    Generate(GenerateArgs),
    /// Clean the data, print statistics and rankings, optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Print the linear-trend revenue forecast.
    Forecast(ForecastArgs),
    /// Write the Markdown report together with its SVG charts.
    Report(ReportArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same analysis pipeline as `sales analyze`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Input file selection shared by every analysis command.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Sales CSV (product_id, product_name, quantity_sold, sale_date, price).
    #[arg(short = 'f', long = "file", env = "SALES_DATA", default_value = DEFAULT_DATA_FILE)]
    pub file: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, default_value = DEFAULT_DATA_FILE)]
    pub output: PathBuf,

    /// Number of rows.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Number of rows whose price is blanked out.
    #[arg(long = "missing", default_value_t = 50)]
    pub missing_prices: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Latest possible sale date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_anchor)]
    pub anchor: Option<chrono::NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of products in the revenue ranking.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Length of the "recent sales" window, in days.
    #[arg(long, default_value_t = 30)]
    pub days: i64,

    /// Months to forecast below the tables.
    #[arg(short = 'm', long, default_value_t = 3)]
    pub months: usize,

    /// Export the per-product summary to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Also write SVG charts into this directory.
    #[arg(long, value_name = "DIR")]
    pub charts: Option<PathBuf>,

    /// Render an ASCII plot of monthly revenue.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of months to forecast.
    #[arg(short = 'm', long, default_value_t = 3)]
    pub months: usize,

    /// Print the fit and forecast as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report path.
    #[arg(short = 'o', long, default_value = "sales_report.md")]
    pub output: PathBuf,

    /// Chart directory (defaults to the report's directory).
    #[arg(long, value_name = "DIR")]
    pub charts: Option<PathBuf>,

    /// Number of months to forecast.
    #[arg(short = 'm', long, default_value_t = 3)]
    pub months: usize,

    /// Number of products in the revenue ranking.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Initial forecast horizon in months (adjustable with +/-).
    #[arg(short = 'm', long, default_value_t = 3)]
    pub months: usize,
}

fn parse_anchor(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
