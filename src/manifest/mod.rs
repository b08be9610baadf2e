//! Manifest builder
//!
//! Collects the outcome of every source file, rejects the whole batch if any
//! file failed or two files share a slug, and otherwise orders the posts
//! newest first.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::slug::find_collisions;
use crate::content::{BodyRef, FieldValue, FileOutcome, PostRecord};
use crate::error::{IngestError, IngestFailure};
use crate::helpers::date_xml;

/// Version of the JSON layout written by [`Manifest::to_json`]
pub const MANIFEST_VERSION: u32 = 1;

/// Accumulates per-file outcomes until every file has been seen
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    posts: Vec<PostRecord>,
    /// (path, slug) for every file, valid or not, in insertion order
    slugs: Vec<(PathBuf, String)>,
    errors: Vec<IngestError>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file's outcome
    pub fn add(&mut self, outcome: FileOutcome) {
        if let Some(slug) = outcome.slug() {
            self.slugs.push((outcome.path.clone(), slug));
        }

        match outcome.result {
            Ok(post) => self.posts.push(post),
            Err(kinds) => self.errors.extend(
                kinds
                    .into_iter()
                    .map(|kind| IngestError::new(&outcome.path, kind)),
            ),
        }
    }

    /// Record an error not tied to a parsed file (e.g. an unreadable directory)
    pub fn add_error(&mut self, error: IngestError) {
        self.errors.push(error);
    }

    /// Produce the manifest, or every error collected along the way
    pub fn build(self) -> Result<Manifest, IngestFailure> {
        let mut errors = self.errors;
        errors.extend(find_collisions(
            self.slugs.iter().map(|(p, s)| (p.as_path(), s.as_str())),
        ));

        if let Some(failure) = IngestFailure::from_errors(errors) {
            return Err(failure);
        }

        let mut posts = self.posts;
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(Manifest { posts })
    }
}

/// The validated, sorted posts of one ingestion run
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    posts: Vec<PostRecord>,
}

impl Manifest {
    /// Build a manifest from file outcomes in one step
    pub fn from_outcomes<I>(outcomes: I) -> Result<Self, IngestFailure>
    where
        I: IntoIterator<Item = FileOutcome>,
    {
        let mut builder = ManifestBuilder::new();
        for outcome in outcomes {
            builder.add(outcome);
        }
        builder.build()
    }

    /// Posts, newest first
    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn drafts(&self) -> impl Iterator<Item = &PostRecord> {
        self.posts.iter().filter(|p| p.draft)
    }

    /// Tag usage counts, most used first, then by name
    pub fn tag_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for tag in self.posts.iter().flat_map(|p| p.tags.iter()) {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
    }

    /// Serialize to JSON, terminated by a newline
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let document = ManifestDocument {
            version: MANIFEST_VERSION,
            posts: self.posts.iter().map(ManifestEntry::from).collect(),
        };
        let mut json = if pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest to `path`, replacing any previous file atomically
    pub fn write<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(pretty)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let tmp_path = staging_path(path);
        fs::write(&tmp_path, json).with_context(|| format!("Failed to write {:?}", tmp_path))?;
        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("Failed to replace {:?}", path));
        }

        tracing::info!("Wrote {} posts to {:?}", self.posts.len(), path);
        Ok(())
    }
}

/// Sibling file the manifest is written to before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[derive(Serialize)]
struct ManifestDocument<'a> {
    version: u32,
    posts: Vec<ManifestEntry<'a>>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    slug: &'a str,
    title: &'a str,
    date: String,
    draft: bool,
    tags: &'a [String],
    source: String,
    body: &'a BodyRef,
    #[serde(skip_serializing_if = "no_extra")]
    extra: &'a IndexMap<String, FieldValue>,
}

fn no_extra(extra: &&IndexMap<String, FieldValue>) -> bool {
    extra.is_empty()
}

impl<'a> From<&'a PostRecord> for ManifestEntry<'a> {
    fn from(post: &'a PostRecord) -> Self {
        Self {
            slug: &post.slug,
            title: &post.title,
            date: date_xml(&post.date),
            draft: post.draft,
            tags: &post.tags,
            source: post.source(),
            body: &post.body_ref,
            extra: &post.extra,
        }
    }
}
