//! post-manifest: validate a directory of Markdown posts and build a manifest
//!
//! Each run reads every post under a content directory, checks its
//! front-matter, derives a slug from its file name and, only if every file
//! is valid, produces a manifest of posts sorted newest first. A run holds
//! no state between invocations.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod manifest;

use anyhow::{bail, Result};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

use content::ContentLoader;
use error::IngestFailure;
use manifest::{Manifest, ManifestBuilder};

/// One content directory and the settings used to ingest it
#[derive(Debug, Clone)]
pub struct Ingest {
    /// Ingestion configuration
    pub config: config::IngestConfig,
    /// Content directory
    pub content_dir: PathBuf,
    timezone: Tz,
    excludes: Vec<glob::Pattern>,
}

impl Ingest {
    /// Open a content directory, reading `_ingest.yml` from it if present
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Result<Self> {
        let content_dir = content_dir.as_ref();
        ensure_dir(content_dir)?;
        let config = config::IngestConfig::load_from_dir(content_dir)?;
        Self::with_config(content_dir, config)
    }

    /// Open a content directory with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(content_dir: P, config: config::IngestConfig) -> Result<Self> {
        let content_dir = content_dir.as_ref().to_path_buf();
        ensure_dir(&content_dir)?;
        config.check()?;

        Ok(Self {
            timezone: config.timezone()?,
            excludes: config.exclude_patterns()?,
            config,
            content_dir,
        })
    }

    /// Open a content directory, with `config_path` overriding `_ingest.yml`
    pub fn open<P: AsRef<Path>>(content_dir: P, config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::with_config(content_dir, config::IngestConfig::load(path)?),
            None => Self::new(content_dir),
        }
    }

    /// Timezone for dates written without an offset
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn excludes(&self) -> &[glob::Pattern] {
        &self.excludes
    }

    /// Run one full ingestion pass.
    ///
    /// Files are processed concurrently; the manifest is only assembled once
    /// every file has reported back. Any error fails the whole run.
    pub async fn build(&self) -> Result<Manifest, IngestFailure> {
        let start = std::time::Instant::now();
        let loader = ContentLoader::new(self);

        tracing::debug!(phase = "discovering", dir = ?self.content_dir);
        let discovery = loader.discover();
        tracing::debug!(
            phase = "processing",
            files = discovery.files.len(),
            "Parsing, validating and normalizing posts"
        );
        let outcomes = loader.load_posts(discovery.files).await;

        tracing::debug!(phase = "aggregating", files = outcomes.len());
        let mut builder = ManifestBuilder::new();
        for error in discovery.errors {
            builder.add_error(error);
        }
        for outcome in outcomes {
            builder.add(outcome);
        }

        let result = builder.build();
        let elapsed = start.elapsed().as_secs_f64();
        match &result {
            Ok(manifest) => tracing::info!(
                phase = "succeeded",
                "Ingested {} posts ({} drafts) in {:.2}s",
                manifest.len(),
                manifest.drafts().count(),
                elapsed
            ),
            Err(failure) => tracing::info!(
                phase = "failed",
                "Ingestion failed with {} error(s) in {:.2}s",
                failure.len(),
                elapsed
            ),
        }
        result
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("Content directory not found: {:?}", path);
    }
    Ok(())
}
