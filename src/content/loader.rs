//! Content loader - discovers posts and runs each one through
//! parse → validate → normalize

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::slug::slug_for_path;
use super::{BodyRef, FrontMatter, PostRecord, Validator};
use crate::error::{ErrorKind, IngestError};
use crate::Ingest;

/// Result of pushing one source file through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    /// Path relative to the content directory
    pub path: PathBuf,
    pub result: Result<PostRecord, Vec<ErrorKind>>,
}

impl FileOutcome {
    /// Slug claimed by this file, whether or not its content validated
    pub fn slug(&self) -> Option<String> {
        match &self.result {
            Ok(post) => Some(post.slug.clone()),
            Err(_) => slug_for_path(&self.path).ok(),
        }
    }
}

/// Files found under the content directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Relative paths, sorted
    pub files: Vec<PathBuf>,
    /// Entries that could not be inspected
    pub errors: Vec<IngestError>,
}

/// Loads posts from a content directory
pub struct ContentLoader<'a> {
    ingest: &'a Ingest,
    validator: Validator,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(ingest: &'a Ingest) -> Self {
        Self {
            ingest,
            validator: Validator::new(ingest.timezone()),
        }
    }

    /// Walk the content directory for post files
    pub fn discover(&self) -> Discovery {
        let mut discovery = Discovery::default();

        let walker = WalkDir::new(&self.ingest.content_dir)
            .follow_links(self.ingest.config.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_skipped(e.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_else(|| PathBuf::from("."));
                    tracing::warn!("Cannot read {:?}: {}", path, e);
                    discovery.errors.push(IngestError::new(
                        path,
                        ErrorKind::Io {
                            message: e.to_string(),
                        },
                    ));
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_post_file(entry.path()) {
                discovery.files.push(self.relative(entry.path()));
            }
        }

        discovery.files.sort();
        discovery
    }

    /// Load every discovered post, one blocking task per file.
    ///
    /// Outcomes come back in discovery order regardless of which task
    /// finishes first.
    pub async fn load_posts(&self, files: Vec<PathBuf>) -> Vec<FileOutcome> {
        let handles: Vec<_> = files
            .into_iter()
            .map(|path| {
                let full_path = self.ingest.content_dir.join(&path);
                let validator = self.validator;
                let task = tokio::task::spawn_blocking({
                    let path = path.clone();
                    move || load_post(&full_path, path, &validator)
                });
                (path, task)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (path, task) in handles {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => FileOutcome {
                    path,
                    result: Err(vec![ErrorKind::Io {
                        message: format!("worker failed: {}", e),
                    }]),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    fn is_skipped(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(false);
        if hidden {
            return true;
        }

        let relative = to_slash(&self.relative(path));
        self.ingest.excludes().iter().any(|p| p.matches(&relative))
    }

    fn is_post_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.ingest.config.is_post_extension(e))
            .unwrap_or(false)
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.ingest.content_dir)
            .unwrap_or(path)
            .to_path_buf()
    }
}

/// Read and process a single post file
pub fn load_post(full_path: &Path, path: PathBuf, validator: &Validator) -> FileOutcome {
    let result = match fs::read_to_string(full_path) {
        Ok(content) => parse_post(&path, &content, validator),
        Err(e) => Err(vec![ErrorKind::Io {
            message: e.to_string(),
        }]),
    };

    match &result {
        Ok(post) => tracing::debug!("Loaded {:?} as `{}`", path, post.slug),
        Err(errors) => tracing::debug!("Rejected {:?} with {} error(s)", path, errors.len()),
    }

    FileOutcome { path, result }
}

/// Parse, validate and normalize one post from its content.
///
/// Pure: the outcome depends only on `path` and `content`.
pub fn parse_post(
    path: &Path,
    content: &str,
    validator: &Validator,
) -> Result<PostRecord, Vec<ErrorKind>> {
    let slug = slug_for_path(path);

    let (fm, body) = match FrontMatter::parse(content) {
        Ok(parsed) => parsed,
        Err(kind) => {
            let mut errors = vec![kind];
            errors.extend(slug.err());
            return Err(errors);
        }
    };

    let fields = validator.validate(fm);

    match (fields, slug) {
        (Ok(fields), Ok(slug)) => Ok(PostRecord {
            source_path: path.to_path_buf(),
            title: fields.title,
            date: fields.date,
            draft: fields.draft,
            tags: fields.tags,
            slug,
            body: body.text.to_string(),
            body_ref: BodyRef::new(body.text, body.offset),
            extra: fields.extra,
        }),
        (fields, slug) => {
            let mut errors = fields.err().unwrap_or_default();
            errors.extend(slug.err());
            Err(errors)
        }
    }
}

/// Render a relative path with `/` separators
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"---
title: "Running LLMs on Kubernetes"
date: "2025-12-16T09:00:00"
draft: false
tags: ["kubernetes", "llm", "gpu"]
---

# Running LLMs on Kubernetes
"#;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_post_round_trip() {
        let post = parse_post(Path::new("k8s-llm.md"), POST, &Validator::default()).unwrap();
        assert_eq!(post.title, "Running LLMs on Kubernetes");
        assert_eq!(post.tags, vec!["kubernetes", "llm", "gpu"]);
        assert_eq!(post.slug, "k8s-llm");
        assert!(!post.draft);
        assert_eq!(post.body, "\n# Running LLMs on Kubernetes\n");
        assert_eq!(&POST[post.body_ref.offset..], post.body);
        assert_eq!(post.body_ref.length, post.body.len());
    }

    #[test]
    fn test_parse_post_collects_slug_and_content_errors() {
        let errors = parse_post(Path::new("???.md"), "no front-matter", &Validator::default())
            .unwrap_err();
        assert_eq!(errors, vec![ErrorKind::MissingFrontMatter, ErrorKind::EmptySlug]);

        let errors = parse_post(Path::new("ok.md"), "---\ntitle: x\n", &Validator::default())
            .unwrap_err();
        assert_eq!(errors, vec![ErrorKind::UnterminatedFrontMatter]);
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.md", POST);
        write(dir.path(), "a/nested.markdown", POST);
        write(dir.path(), "notes.txt", "not a post");
        write(dir.path(), ".hidden/secret.md", POST);
        write(dir.path(), ".draft.md", POST);
        write(dir.path(), "drafts/wip.md", POST);
        write(dir.path(), "_ingest.yml", "exclude: [\"drafts/**\"]\n");

        let ingest = Ingest::new(dir.path()).unwrap();
        let discovery = ContentLoader::new(&ingest).discover();

        assert!(discovery.errors.is_empty());
        assert_eq!(
            discovery.files,
            vec![PathBuf::from("a").join("nested.markdown"), PathBuf::from("b.md")]
        );
    }

    #[tokio::test]
    async fn test_load_posts_keeps_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.md", POST);
        write(dir.path(), "two.md", "---\ntitle: Two\n---\n");
        write(dir.path(), "three.md", POST);

        let ingest = Ingest::new(dir.path()).unwrap();
        let loader = ContentLoader::new(&ingest);
        let discovery = loader.discover();
        let outcomes = loader.load_posts(discovery.files).await;

        let paths: Vec<_> = outcomes.iter().map(|o| o.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("one.md"),
                PathBuf::from("three.md"),
                PathBuf::from("two.md")
            ]
        );
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_ok());
        assert_eq!(
            outcomes[2].result.as_ref().unwrap_err(),
            &vec![ErrorKind::validation("date")]
        );
        assert_eq!(outcomes[2].slug().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let ingest = Ingest::new(dir.path()).unwrap();
        let loader = ContentLoader::new(&ingest);
        let outcomes = loader.load_posts(vec![PathBuf::from("binary.md")]).await;

        assert!(matches!(
            outcomes[0].result.as_ref().unwrap_err().as_slice(),
            [ErrorKind::Io { .. }]
        ));
    }
}
