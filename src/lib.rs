//! `sales-insight` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the analysis can be driven from other front-ends (the TUI, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
