//! Ratatui-based terminal dashboard.
//!
//! Three tabs over one analysis run:
//! - **Statistics**: per-product statistics, top products, recent window
//! - **Charts**: monthly revenue with its moving average, top products by revenue
//! - **Forecast**: trend projection for an adjustable horizon
//!
//! The dataset is cleaned once on startup; changing the horizon only refits
//! the forecast.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
};
use tracing::info;

use crate::app::pipeline::{RunOutput, run_analysis};
use crate::domain::{AnalysisConfig, ProductTotals};
use crate::error::AppError;
use crate::report::{ReportInput, fmt_money, fmt_num, fmt_thousands, write_markdown_report};

mod plotters_chart;

use plotters_chart::SalesChart;

/// Forecast horizon limits (months).
pub const MIN_HORIZON: usize = 1;
pub const MAX_HORIZON: usize = 12;

/// Products shown in the Charts tab bar panel.
const TOP_CHART_PRODUCTS: usize = 10;

/// File names written into the output directory by `e` and `r`.
const EXPORT_FILE: &str = "sales_analysis_results.csv";
const REPORT_FILE: &str = "sales_report.md";

/// Start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    // Load before touching the terminal so errors print normally.
    let output = run_analysis(&config)?;
    let mut app = App::new(config, output, PathBuf::from("."));

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Statistics,
    Charts,
    Forecast,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Statistics, Tab::Charts, Tab::Forecast];

    fn title(self) -> &'static str {
        match self {
            Tab::Statistics => "Statistics",
            Tab::Charts => "Charts",
            Tab::Forecast => "Forecast",
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Statistics => 0,
            Tab::Charts => 1,
            Tab::Forecast => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    config: AnalysisConfig,
    run: RunOutput,
    tab: Tab,
    horizon: usize,
    /// Top products by revenue for the bar panel.
    top_chart: Vec<ProductTotals>,
    out_dir: PathBuf,
    status: String,
}

impl App {
    fn new(config: AnalysisConfig, run: RunOutput, out_dir: PathBuf) -> Self {
        let horizon = config.forecast_months.clamp(MIN_HORIZON, MAX_HORIZON);
        let status = format!(
            "{} rows from {}",
            run.analyzer.sales().len(),
            config.csv_path.display()
        );
        let top_chart = run.analyzer.top_products(TOP_CHART_PRODUCTS);
        let mut app = Self {
            config,
            run,
            tab: Tab::Statistics,
            horizon,
            top_chart,
            out_dir,
            status,
        };
        if !matches!(&app.run.forecast, Ok(fc) if fc.points.len() == horizon) {
            app.run.reforecast(horizon);
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a key press; returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Char('1') => self.tab = Tab::Statistics,
            KeyCode::Char('2') => self.tab = Tab::Charts,
            KeyCode::Char('3') => self.tab = Tab::Forecast,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => self.set_horizon(self.horizon + 1),
            KeyCode::Char('-') | KeyCode::Down => self.set_horizon(self.horizon.saturating_sub(1)),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.write_report(),
            _ => {}
        }
        false
    }

    fn set_horizon(&mut self, months: usize) {
        let months = months.clamp(MIN_HORIZON, MAX_HORIZON);
        if months == self.horizon {
            return;
        }
        self.horizon = months;
        self.run.reforecast(months);
        self.status = format!("horizon: {months} month(s)");
    }

    fn export(&mut self) {
        let path = self.out_dir.join(EXPORT_FILE);
        let rows = self.run.analyzer.export_rows();
        self.status = match crate::io::write_summary_csv(&path, &rows) {
            Ok(()) => {
                info!(path = %path.display(), "exported from dashboard");
                format!("Exported {} products to {}", rows.len(), path.display())
            }
            Err(err) => format!("Export failed: {err}"),
        };
    }

    /// Write the SVG charts and the Markdown report that links them.
    fn write_report(&mut self) {
        let path = self.out_dir.join(REPORT_FILE);
        self.status = match self.render_report(&path) {
            Ok(charts) => {
                info!(path = %path.display(), charts, "report written from dashboard");
                format!("Report written to {} ({charts} charts)", path.display())
            }
            Err(err) => format!("Report failed: {err}"),
        };
    }

    fn render_report(&self, path: &Path) -> Result<usize, AppError> {
        let charts = crate::app::write_run_charts(&self.out_dir, &self.run)?;
        let input = ReportInput {
            analyzer: &self.run.analyzer,
            top_n: self.config.top_n,
            recent_days: self.config.recent_days,
            forecast: self.run.forecast.as_ref().ok(),
            charts: &charts,
        };
        write_markdown_report(path, &input)?;
        Ok(charts.len())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Statistics => self.draw_statistics(frame, chunks[1]),
            Tab::Charts => self.draw_charts(frame, chunks[1]),
            Tab::Forecast => self.draw_forecast(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let report = self.run.analyzer.cleaning_report();
        let title = Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {}", self.config.csv_path.display())),
        ]);
        frame.render_widget(Paragraph::new(title), rows[0]);

        let total: f64 = self.run.monthly.iter().map(|m| m.revenue).sum();
        let info = format!(
            "rows: {} kept of {} | products: {} | months: {} | revenue: {}",
            report.rows_kept,
            report.rows_read,
            self.run.stats.len(),
            self.run.monthly.len(),
            fmt_money(total)
        );
        frame.render_widget(Paragraph::new(info).style(Style::default().fg(Color::Gray)), rows[1]);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, rows[2]);
    }

    fn draw_statistics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(self.config.top_n as u16 + 3)])
            .split(area);

        let header = Row::new([
            "product", "n", "qty", "qty mean", "qty std", "revenue", "rev mean", "rev std", "price", "min", "max",
        ])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.run.stats.iter().map(|s| {
            Row::new([
                Cell::from(s.product_name.clone()),
                Cell::from(s.sales.to_string()),
                Cell::from(fmt_thousands(s.quantity_total)),
                Cell::from(format!("{:.2}", s.quantity_mean)),
                Cell::from(fmt_num(s.quantity_std)),
                Cell::from(fmt_money(s.revenue_total)),
                Cell::from(fmt_money(s.revenue_mean)),
                Cell::from(fmt_num(s.revenue_std)),
                Cell::from(format!("{:.2}", s.price_mean)),
                Cell::from(format!("{:.2}", s.price_min)),
                Cell::from(format!("{:.2}", s.price_max)),
            ])
        });
        let widths = [
            Constraint::Length(14),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(15),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().title("Product Statistics").borders(Borders::ALL));
        frame.render_widget(table, chunks[0]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let top_rows = self.run.top.iter().enumerate().map(|(i, t)| {
            Row::new([
                Cell::from(format!("{}", i + 1)),
                Cell::from(t.product_name.clone()),
                Cell::from(fmt_money(t.revenue)),
                Cell::from(fmt_thousands(t.quantity_sold)),
            ])
        });
        let top = Table::new(
            top_rows,
            [Constraint::Length(3), Constraint::Length(14), Constraint::Length(16), Constraint::Length(10)],
        )
        .header(Row::new(["#", "product", "revenue", "quantity"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(
            Block::default()
                .title(format!("Top {} Products", self.config.top_n))
                .borders(Borders::ALL),
        );
        frame.render_widget(top, bottom[0]);

        let recent = match &self.run.recent {
            Some(r) => Text::from(vec![
                Line::from(format!("{} .. {}", r.start, r.end)),
                Line::from(format!("Revenue: {}", fmt_money(r.revenue))),
                Line::from(format!("Units:   {}", fmt_thousands(r.quantity))),
                Line::from(format!("Sales:   {}", r.sales)),
            ]),
            None => Text::from("No sales in window."),
        };
        let recent = Paragraph::new(recent).block(
            Block::default()
                .title(format!("Last {} Days", self.config.recent_days))
                .borders(Borders::ALL),
        );
        frame.render_widget(recent, bottom[1]);
    }

    fn draw_charts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let title = format!("Monthly Revenue ({}-month moving average)", self.config.moving_average_window);
        let series = chart_series(&self.run, None);
        self.draw_chart(frame, chunks[0], &title, &series);
        self.draw_top_products(frame, chunks[1]);
    }

    fn draw_top_products(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Top {} Products by Revenue", self.top_chart.len()))
            .borders(Borders::ALL);
        let bars = top_product_bars(&self.top_chart);
        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Green))
            .value_style(Style::default().fg(Color::Black).bg(Color::Green))
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        let forecast = match &self.run.forecast {
            Ok(fc) => fc,
            Err(err) => {
                let msg = Paragraph::new(err.to_string())
                    .style(Style::default().fg(Color::Yellow))
                    .block(Block::default().title("Forecast").borders(Borders::ALL));
                frame.render_widget(msg, area);
                return;
            }
        };

        let title = format!("Revenue Forecast ({} months)", self.horizon);
        let series = chart_series(&self.run, Some(forecast));
        self.draw_chart(frame, chunks[0], &title, &series);

        let rows = forecast
            .points
            .iter()
            .map(|p| Row::new([p.month.format("%b %Y").to_string(), fmt_money(p.predicted_revenue)]));
        let table = Table::new(rows, [Constraint::Length(10), Constraint::Length(18)])
            .header(Row::new(["month", "revenue"]).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(
                Block::default()
                    .title(format!("slope {}/mo", fmt_money(forecast.slope)))
                    .borders(Borders::ALL),
            );
        frame.render_widget(table, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, series: &ChartSeries) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if series.revenue.is_empty() {
            let msg = Paragraph::new("No monthly data.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesChart {
            revenue: &series.revenue,
            average: &series.average,
            forecast: &series.forecast,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &series.labels, series.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ switch  +/- horizon  e export  r report  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Plot-ready series: x is the month position, labels name each position.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    revenue: Vec<(f64, f64)>,
    average: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series; with a forecast the x axis extends over the horizon
/// and the moving average is left out.
fn chart_series(run: &RunOutput, forecast: Option<&crate::forecast::Forecast>) -> ChartSeries {
    let revenue: Vec<(f64, f64)> = run
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.revenue))
        .collect();
    let mut labels: Vec<String> = run.monthly.iter().map(|m| m.month.format("%Y-%m").to_string()).collect();

    let mut average = Vec::new();
    let mut projected = Vec::new();
    match forecast {
        Some(fc) => {
            if let Some(&last) = revenue.last() {
                projected.push(last);
            }
            for (k, p) in fc.points.iter().enumerate() {
                projected.push(((fc.observed + k) as f64, p.predicted_revenue));
                labels.push(p.month.format("%Y-%m").to_string());
            }
        }
        None => {
            average = run
                .moving_average
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                .collect();
        }
    }

    let x_bounds = [0.0, (labels.len().saturating_sub(1)).max(1) as f64];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in revenue.iter().chain(&average).chain(&projected) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        let mid = if y_min.is_finite() { y_min } else { 0.5 };
        y_min = mid - 0.5;
        y_max = mid + 0.5;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let y_bounds = [y_min - pad, y_max + pad];

    ChartSeries {
        revenue,
        average,
        forecast: projected,
        labels,
        x_bounds,
        y_bounds,
    }
}

/// One horizontal bar per product; the bar length is revenue in whole units.
fn top_product_bars(top: &[ProductTotals]) -> Vec<Bar<'static>> {
    top.iter()
        .map(|t| {
            Bar::default()
                .label(Line::from(t.product_name.clone()))
                .value(t.revenue.max(0.0).round() as u64)
                .text_value(fmt_money(t.revenue))
        })
        .collect()
}

/// Compact revenue tick: `950`, `12.3k`, `1.2M`.
fn fmt_axis_revenue(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 3,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    labels: &[String],
    y_bounds: [f64; 2],
) {
    let style = Style::default().fg(Color::Gray);

    // Month labels: at most one every 9 columns.
    let n = labels.len();
    if n > 0 {
        let max_labels = ((chart.width / 9).max(1)) as usize;
        let step = n.div_ceil(max_labels).max(1);
        for (i, label) in labels.iter().enumerate().step_by(step) {
            let u = if n > 1 { i as f64 / (n as f64 - 1.0) } else { 0.0 };
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let start = x.saturating_sub((label.len() / 2) as u16).max(inner.x);
            let y = chart.y + chart.height;
            if y >= inner.y + inner.height - 1 {
                continue;
            }
            let width = (label.len() as u16).min((inner.x + inner.width).saturating_sub(start));
            frame.render_widget(Paragraph::new(label.as_str()).style(style), Rect { x: start, y, width, height: 1 });
        }
    }

    let ticks = 5usize;
    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_revenue(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("revenue").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
