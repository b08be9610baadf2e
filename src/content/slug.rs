//! Slug derivation
//!
//! A slug depends only on the file name: the extension is dropped, the stem
//! is lowercased and transliterated to ASCII, and every run of other
//! characters becomes a single `-`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ErrorKind, IngestError};

/// Derive the slug for a source file
pub fn slug_for_path(path: &Path) -> Result<String, ErrorKind> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let slug = ::slug::slugify(stem.as_ref());
    if slug.is_empty() {
        return Err(ErrorKind::EmptySlug);
    }
    Ok(slug)
}

/// Report every slug claimed by more than one file.
///
/// `entries` must be in discovery order; later files are reported against
/// the first file that used the slug.
pub fn find_collisions<'a, I>(entries: I) -> Vec<IngestError>
where
    I: IntoIterator<Item = (&'a Path, &'a str)>,
{
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    let mut errors = Vec::new();

    for (path, slug) in entries {
        match seen.get(slug) {
            Some(first) => errors.push(IngestError::duplicate_slug(path, first, slug)),
            None => {
                seen.insert(slug, path);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn collisions(entries: &[(PathBuf, String)]) -> Vec<IngestError> {
        find_collisions(entries.iter().map(|(p, s)| (p.as_path(), s.as_str())))
    }

    fn slug(name: &str) -> Result<String, ErrorKind> {
        slug_for_path(Path::new(name))
    }

    #[test]
    fn test_slug_from_filename() {
        assert_eq!(slug("Getting Started with KafkaJS.md").unwrap(), "getting-started-with-kafkajs");
        assert_eq!(slug("posts/2025/SEPA__payments--guide.md").unwrap(), "sepa-payments-guide");
        assert_eq!(slug("--wasm-intro--.markdown").unwrap(), "wasm-intro");
        assert_eq!(slug("thread_pools.v2.md").unwrap(), "thread-pools-v2");
        assert_eq!(slug("Café Crème.md").unwrap(), "cafe-creme");
    }

    #[test]
    fn test_empty_slug() {
        assert_eq!(slug("---.md"), Err(ErrorKind::EmptySlug));
        assert_eq!(slug("!!!.md"), Err(ErrorKind::EmptySlug));
    }

    #[test]
    fn test_slug_ignores_directories() {
        assert_eq!(slug("a/hello.md"), slug("b/Hello.md"));
    }

    #[test]
    fn test_collisions_name_both_paths() {
        let entries = vec![
            (PathBuf::from("a/hello.md"), "hello".to_string()),
            (PathBuf::from("b/other.md"), "other".to_string()),
            (PathBuf::from("c/Hello.md"), "hello".to_string()),
            (PathBuf::from("d/HELLO.markdown"), "hello".to_string()),
        ];
        let errors = collisions(&entries);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            IngestError::duplicate_slug(Path::new("c/Hello.md"), Path::new("a/hello.md"), "hello")
        );
        assert_eq!(
            errors[1],
            IngestError::duplicate_slug(
                Path::new("d/HELLO.markdown"),
                Path::new("a/hello.md"),
                "hello"
            )
        );
    }

    #[test]
    fn test_no_collisions() {
        let entries = vec![
            (PathBuf::from("a.md"), "a".to_string()),
            (PathBuf::from("b.md"), "b".to_string()),
        ];
        assert!(collisions(&entries).is_empty());
    }
}
