//! Plotters-powered revenue chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - the same drawing code style as the SVG charts
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; `render()`
/// only draws. X values are month positions (0 = first observed month).
pub struct SalesChart<'a> {
    /// Observed monthly revenue.
    pub revenue: &'a [(f64, f64)],
    /// Moving average of `revenue` (may be empty).
    pub average: &'a [(f64, f64)],
    /// Forecast line, starting at the last observed month (may be empty).
    pub forecast: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for SalesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            // Tick labels are drawn by Ratatui around the chart, so the Plotters
            // label areas stay at zero.
            let mut chart = ChartBuilder::on(&root).margin(1).build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(&WHITE)
                .draw()?;

            let revenue_color = RGBColor(0, 255, 255); // cyan
            let average_color = RGBColor(255, 200, 0); // amber
            let forecast_color = RGBColor(255, 0, 255); // magenta

            chart.draw_series(LineSeries::new(self.average.iter().copied(), &average_color))?;
            chart.draw_series(LineSeries::new(self.forecast.iter().copied(), &forecast_color))?;
            chart.draw_series(LineSeries::new(self.revenue.iter().copied(), &revenue_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a `Pixel`
            // marks each observed month cleanly.
            chart.draw_series(self.revenue.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
