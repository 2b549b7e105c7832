//! Reporting: terminal tables and the Markdown report.

pub mod format;
pub mod markdown;

pub use format::*;
pub use markdown::{ReportInput, render_markdown, write_markdown_report};
