//! Data sources: the synthetic sales generator.

pub mod sample;

pub use sample::*;
