//! Chart rendering.
//!
//! - `ascii`: fixed-grid terminal plot for `analyze --plot`
//! - `svg`: Plotters SVG files linked from the Markdown report

pub mod ascii;
pub mod svg;

pub use ascii::render_monthly_plot;
pub use svg::{ChartData, write_charts};
