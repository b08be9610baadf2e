//! Configuration module

mod settings;

pub use settings::IngestConfig;
pub use settings::CONFIG_FILE;
