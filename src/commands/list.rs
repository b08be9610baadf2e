//! List manifest content

use anyhow::Result;

use crate::helpers::date_xml;
use crate::Ingest;

/// List posts, tags or drafts from a successful ingestion
pub async fn run(ingest: &Ingest, content_type: &str) -> Result<()> {
    let manifest = ingest.build().await?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", manifest.len());
            for post in manifest.posts() {
                println!(
                    "  {} - {}{} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    if post.draft { " (draft)" } else { "" },
                    post.slug
                );
            }
        }
        "tag" | "tags" => {
            let tags = manifest.tag_counts();
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        "draft" | "drafts" => {
            let drafts: Vec<_> = manifest.drafts().collect();
            println!("Drafts ({}):", drafts.len());
            for post in drafts {
                println!("  {} - {} [{}]", date_xml(&post.date), post.title, post.source());
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, draft",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = Ingest::new(dir.path()).unwrap();
        assert!(run(&ingest, "post").await.is_ok());
        assert!(run(&ingest, "drafts").await.is_ok());
        assert!(run(&ingest, "category").await.is_err());
    }
}
