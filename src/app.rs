//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the analysis pipeline
//! - prints reports/plots
//! - writes optional exports, charts and the Markdown report

use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use tracing::info;

use crate::cli::{AnalyzeArgs, Command, ForecastArgs, GenerateArgs, ReportArgs, TuiArgs};
use crate::data::{SampleConfig, generate_sample, write_sales_csv};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::plot::ChartData;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may provide SALES_DATA / SALES_LOG; it is optional.
    dotenvy::dotenv().ok();

    // We want `sales` and `sales -f data.csv` to behave like `sales tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_logging(&cli.log_level);

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Forecast(args) => handle_forecast(args),
        Command::Report(args) => handle_report(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        missing_prices: args.missing_prices,
        seed: args.seed,
        anchor: args.anchor.unwrap_or_else(|| Local::now().date_naive()),
    };
    let records = generate_sample(&config)?;
    write_sales_csv(&args.output, &records)?;
    println!("Wrote {} rows to {}", records.len(), args.output.display());
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_cleaning_summary(run.analyzer.cleaning_report()));
    println!("{}", crate::report::format_product_statistics(&run.stats));
    println!("{}", crate::report::format_top_products(&run.top));
    match &run.recent {
        Some(recent) => println!("{}", crate::report::format_recent_summary(recent)),
        None => println!("Last {} Days Analysis: no sales in window\n", config.recent_days),
    }
    println!("{}", crate::report::format_monthly(&run.monthly, &run.moving_average));
    match &run.forecast {
        Ok(fc) => println!("{}", crate::report::format_forecast(&fc.points)),
        Err(err) => println!("Forecast unavailable: {err}\n"),
    }

    if config.plot {
        let plot = crate::plot::render_monthly_plot(
            &run.monthly,
            run.forecast.as_ref().ok(),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_summary {
        crate::io::write_summary_csv(path, &run.analyzer.export_rows())?;
        println!("Results exported to {}", path.display());
    }
    if let Some(dir) = &config.chart_dir {
        let files = write_run_charts(dir, &run)?;
        println!("Wrote {} charts to {}", files.len(), dir.display());
    }

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let path = crate::cli::picker::resolve_input(&args.input.file)?;
    let analyzer = crate::analysis::SalesAnalyzer::from_csv(&path)?;
    let forecast = analyzer.forecast(args.months)?;

    if args.json {
        println!("{}", crate::io::forecast_json(&forecast)?);
    } else {
        println!("{}", crate::report::format_forecast(&forecast.points));
    }
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AnalysisConfig {
        csv_path: crate::cli::picker::resolve_input(&args.input.file)?,
        top_n: args.top,
        forecast_months: args.months,
        ..AnalysisConfig::default()
    };
    let run = pipeline::run_analysis(&config)?;

    let chart_dir = args
        .charts
        .clone()
        .or_else(|| args.output.parent().map(Path::to_path_buf))
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."));
    let charts = write_run_charts(&chart_dir, &run)?;

    let input = crate::report::ReportInput {
        analyzer: &run.analyzer,
        top_n: config.top_n,
        recent_days: config.recent_days,
        forecast: run.forecast.as_ref().ok(),
        charts: &charts,
    };
    crate::report::write_markdown_report(&args.output, &input)?;
    println!("Report written to {}", args.output.display());
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = AnalysisConfig {
        csv_path: crate::cli::picker::resolve_input(&args.input.file)?,
        forecast_months: args.months.clamp(crate::tui::MIN_HORIZON, crate::tui::MAX_HORIZON),
        ..AnalysisConfig::default()
    };
    crate::tui::run(config)
}

pub(crate) fn write_run_charts(dir: &Path, run: &pipeline::RunOutput) -> Result<Vec<PathBuf>, AppError> {
    let top = run.analyzer.top_products(10);
    crate::plot::write_charts(
        dir,
        &ChartData {
            monthly: &run.monthly,
            moving_average: &run.moving_average,
            top: &top,
            forecast: run.forecast.as_ref().ok(),
        },
    )
}

pub fn analysis_config_from_args(args: &AnalyzeArgs) -> Result<AnalysisConfig, AppError> {
    let config = AnalysisConfig {
        csv_path: crate::cli::picker::resolve_input(&args.input.file)?,
        top_n: args.top,
        recent_days: args.days,
        forecast_months: args.months,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_summary: args.export.clone(),
        chart_dir: args.charts.clone(),
        ..AnalysisConfig::default()
    };
    info!(path = %config.csv_path.display(), top = config.top_n, days = config.recent_days, "analysis config");
    Ok(config)
}

/// Rewrite argv so `sales` defaults to `sales tui`.
///
/// Rules:
/// - `sales`                      -> `sales tui`
/// - `sales -f data.csv ...`      -> `sales tui -f data.csv ...`
/// - `sales --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "analyze" | "forecast" | "report" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(args(&["sales"])), args(&["sales", "tui"]));
        assert_eq!(
            rewrite_args(args(&["sales", "-f", "x.csv"])),
            args(&["sales", "tui", "-f", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [&["sales", "analyze", "--plot"][..], &["sales", "--help"], &["sales", "report"]] {
            assert_eq!(rewrite_args(args(argv)), args(argv));
        }
    }

    #[test]
    fn report_writes_markdown_and_charts() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        let records = generate_sample(&SampleConfig {
            count: 300,
            missing_prices: 10,
            seed: 3,
            anchor: chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        })
        .unwrap();
        write_sales_csv(&csv, &records).unwrap();

        let output = dir.path().join("out").join("sales_report.md");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        handle_report(ReportArgs {
            input: crate::cli::InputArgs { file: csv },
            output: output.clone(),
            charts: None,
            months: 3,
            top: 5,
        })
        .unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("## Top Products by Revenue"));
        assert!(text.contains("(monthly_sales.svg)"));
        assert!(dir.path().join("out").join("sales_trend.svg").exists());
    }
}
