//! Shared analysis pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> cleaning -> statistics/rankings -> monthly series -> forecast
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::analysis::SalesAnalyzer;
use crate::domain::{AnalysisConfig, MonthlyRevenue, ProductSummary, ProductTotals, RecentSummary};
use crate::error::{AnalysisError, AppError};
use crate::forecast::Forecast;

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub analyzer: SalesAnalyzer,
    pub stats: Vec<ProductSummary>,
    pub top: Vec<ProductTotals>,
    pub monthly: Vec<MonthlyRevenue>,
    pub moving_average: Vec<Option<f64>>,
    pub recent: Option<RecentSummary>,
    /// A short history is not fatal for the run; callers decide how to show it.
    pub forecast: Result<Forecast, AnalysisError>,
}

impl RunOutput {
    /// Re-run only the forecast (e.g. when the TUI changes the horizon).
    pub fn reforecast(&mut self, months: usize) {
        self.forecast = self.analyzer.forecast(months);
    }
}

/// Load `config.csv_path` and run the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let analyzer = SalesAnalyzer::from_csv(&config.csv_path)?;
    info!(
        path = %config.csv_path.display(),
        rows = analyzer.sales().len(),
        "loaded sales data"
    );
    Ok(run_with_analyzer(analyzer, config))
}

/// Run the pipeline over an already-cleaned dataset.
pub fn run_with_analyzer(analyzer: SalesAnalyzer, config: &AnalysisConfig) -> RunOutput {
    let stats = analyzer.product_statistics();
    let top = analyzer.top_products(config.top_n);
    let monthly = analyzer.monthly_sales();
    let moving_average = analyzer.moving_average(config.moving_average_window);
    let recent = analyzer.recent_summary(config.recent_days);

    let forecast = analyzer.forecast(config.forecast_months);
    if let Err(err) = &forecast {
        warn!("{err}");
    }

    RunOutput {
        analyzer,
        stats,
        top,
        monthly,
        moving_average,
        recent,
        forecast,
    }
}
