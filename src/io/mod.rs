//! Input/output helpers.
//!
//! - CSV ingest (`ingest`)
//! - summary CSV / forecast JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
