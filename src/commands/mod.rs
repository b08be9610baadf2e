//! CLI commands

pub mod check;
pub mod ingest;
pub mod list;
