//! Ingestion configuration (_ingest.yml)

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the optional config file at the content root
pub const CONFIG_FILE: &str = "_ingest.yml";

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// File extensions treated as posts (without the dot)
    pub extensions: Vec<String>,

    /// Glob patterns, relative to the content directory, to skip
    pub exclude: Vec<String>,

    /// Follow symbolic links while walking the content directory
    pub follow_links: bool,

    /// IANA timezone for dates written without an offset
    pub timezone: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string(), "markdown".to_string()],
            exclude: Vec::new(),
            follow_links: true,
            timezone: "UTC".to_string(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: IngestConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {:?}", path))?;
        config
            .check()
            .with_context(|| format!("Invalid config {:?}", path))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load `_ingest.yml` from the content directory, or use defaults
    pub fn load_from_dir<P: AsRef<Path>>(content_dir: P) -> Result<Self> {
        let config_path = content_dir.as_ref().join(CONFIG_FILE);
        if config_path.is_file() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings that would only fail later, mid-run
    pub fn check(&self) -> Result<()> {
        self.timezone()?;
        self.exclude_patterns()?;
        if self.extensions.is_empty() {
            return Err(anyhow!("`extensions` must list at least one extension"));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone {:?}: {}", self.timezone, e))
    }

    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern {:?}", p))
            })
            .collect()
    }

    /// Whether a file extension marks a post (case-insensitive)
    pub fn is_post_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}
