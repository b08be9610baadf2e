//! Ingestion errors
//!
//! Per-file problems are values, not early returns: the pipeline collects
//! every [`IngestError`] of a run and reports them together as an
//! [`IngestFailure`].

use std::fmt;
use std::path::{Path, PathBuf};

/// What went wrong with a single source file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("missing front-matter: file must start with a `---` line")]
    MissingFrontMatter,

    #[error("unterminated front-matter: no closing `---` line found")]
    UnterminatedFrontMatter,

    #[error("malformed front-matter: {message}")]
    MalformedFrontMatter { message: String },

    #[error("missing or empty required field `{field}`")]
    ValidationError { field: String },

    #[error("invalid date `{value}`: expected an ISO 8601 date or date-time")]
    InvalidDate { value: String },

    #[error("field `{field}` has the wrong type: expected {expected}, found {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("filename does not produce a usable slug")]
    EmptySlug,

    #[error("slug `{slug}` is also used by {}", .other.display())]
    DuplicateSlug { slug: String, other: PathBuf },

    #[error("cannot read file: {message}")]
    Io { message: String },
}

impl ErrorKind {
    pub fn validation(field: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}

/// An error attached to the file it came from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {kind}", .path.display())]
pub struct IngestError {
    pub path: PathBuf,
    pub kind: ErrorKind,
}

impl IngestError {
    pub fn new(path: impl Into<PathBuf>, kind: ErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build a duplicate-slug error; `path` is the later file, `other` the
    /// one that claimed the slug first.
    pub fn duplicate_slug(path: &Path, other: &Path, slug: &str) -> Self {
        Self::new(
            path,
            ErrorKind::DuplicateSlug {
                slug: slug.to_string(),
                other: other.to_path_buf(),
            },
        )
    }
}

/// Every error collected during one run. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    errors: Vec<IngestError>,
}

impl IngestFailure {
    /// Wrap collected errors, ordered by path so reports are stable.
    /// Returns `None` when there is nothing to report.
    pub fn from_errors(mut errors: Vec<IngestError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        Some(Self { errors })
    }

    pub fn errors(&self) -> &[IngestError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for IngestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ingestion failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for IngestFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_names_the_file() {
        let err = IngestError::new(
            "posts/hello.md",
            ErrorKind::type_mismatch("draft", "boolean", "string"),
        );
        assert_eq!(
            err.to_string(),
            "posts/hello.md: field `draft` has the wrong type: expected boolean, found string"
        );
    }

    #[test]
    fn test_duplicate_slug_names_both_paths() {
        let err = IngestError::duplicate_slug(
            Path::new("b/hello.md"),
            Path::new("a/Hello.md"),
            "hello",
        );
        let line = err.to_string();
        assert!(line.starts_with("b/hello.md:"));
        assert!(line.contains("a/Hello.md"));
        assert!(line.contains("`hello`"));
    }

    #[test]
    fn test_failure_sorts_by_path() {
        let failure = IngestFailure::from_errors(vec![
            IngestError::new("z.md", ErrorKind::MissingFrontMatter),
            IngestError::new("a.md", ErrorKind::UnterminatedFrontMatter),
        ])
        .unwrap();
        assert_eq!(failure.len(), 2);
        assert_eq!(failure.errors()[0].path, PathBuf::from("a.md"));
        assert!(IngestFailure::from_errors(Vec::new()).is_none());
    }
}
