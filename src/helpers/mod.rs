//! Helper functions shared across the pipeline

mod date;

pub use date::*;
