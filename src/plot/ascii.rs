//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed monthly revenue: `o`
//! - fitted trend line: `-`
//! - forecast months: `F`
//!
//! The x axis is the month position: observed months first, then the forecast
//! horizon.

use crate::domain::MonthlyRevenue;
use crate::forecast::Forecast;

/// Render monthly revenue with an optional trend/forecast overlay.
pub fn render_monthly_plot(
    monthly: &[MonthlyRevenue],
    forecast: Option<&Forecast>,
    width: usize,
    height: usize,
) -> String {
    let observed: Vec<(f64, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.revenue))
        .collect();

    let (projected, trend) = match forecast {
        Some(fc) => {
            let projected: Vec<(f64, f64)> = fc
                .points
                .iter()
                .enumerate()
                .map(|(k, p)| ((fc.observed + k) as f64, p.predicted_revenue))
                .collect();
            let last = (fc.observed + fc.points.len()).saturating_sub(1);
            let trend = vec![(0.0, fc.fitted(0)), (last as f64, fc.fitted(last))];
            (projected, Some(trend))
        }
        None => (Vec::new(), None),
    };

    let x_max = (observed.len() + projected.len()).saturating_sub(1).max(1) as f64;
    let header = match (monthly.first(), monthly.last()) {
        (Some(first), Some(last)) => format!(
            "Plot: months=[{} .. {}] +{} forecast",
            first.month.format("%Y-%m"),
            last.month.format("%Y-%m"),
            projected.len()
        ),
        _ => "Plot: no monthly data".to_string(),
    };

    render_plot(&header, &observed, &projected, trend.as_deref(), 0.0, x_max, width, height)
}

#[allow(clippy::too_many_arguments)]
fn render_plot(
    header: &str,
    observed: &[(f64, f64)],
    projected: &[(f64, f64)],
    trend: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(observed, projected, trend).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Trend first so points overlay it.
    if let Some(line) = trend {
        draw_curve(&mut grid, line, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in projected {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'F';
    }
    for &(x, y) in observed {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!("{header} | revenue=[{y_min:.2}, {y_max:.2}]\n"));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(
    observed: &[(f64, f64)],
    projected: &[(f64, f64)],
    trend: Option<&[(f64, f64)]>,
) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let all = observed
        .iter()
        .chain(projected.iter())
        .chain(trend.unwrap_or_default().iter());
    for &(_, y) in all {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: give it a unit band so it lands mid-plot.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::forecast::forecast_revenue;

    fn month(m: u32, revenue: f64) -> MonthlyRevenue {
        let next = NaiveDate::from_ymd_opt(2024, m + 1, 1).unwrap();
        MonthlyRevenue { month: next.pred_opt().unwrap(), revenue }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let monthly = vec![month(1, 100.0), month(2, 110.0)];
        let txt = render_monthly_plot(&monthly, None, 10, 5);
        let expected = concat!(
            "Plot: months=[2024-01 .. 2024-02] +0 forecast | revenue=[99.50, 110.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn forecast_points_follow_observed_months() {
        let monthly = vec![month(1, 100.0), month(2, 200.0), month(3, 300.0)];
        let fc = forecast_revenue(&monthly, 2).unwrap();
        let txt = render_monthly_plot(&monthly, Some(&fc), 20, 8);
        let rows: Vec<&str> = txt.lines().skip(1).collect();

        let body = rows.concat();
        assert_eq!(rows.len(), 8);
        assert_eq!(body.matches('o').count(), 3);
        assert_eq!(body.matches('F').count(), 2);
        // Highest forecast sits top-right, first observation bottom-left.
        assert!(rows[0].ends_with('F'));
        assert!(rows[7].starts_with('o'));
        assert!(body.contains('-'));
    }

    #[test]
    fn flat_and_empty_series_still_render() {
        let flat = render_monthly_plot(&[month(1, 50.0), month(2, 50.0)], None, 10, 5);
        let body: String = flat.lines().skip(1).collect();
        assert_eq!(body.matches('o').count(), 2);

        let empty = render_monthly_plot(&[], None, 10, 5);
        assert!(empty.starts_with("Plot: no monthly data"));
        assert_eq!(empty.lines().count(), 6);
    }
}
