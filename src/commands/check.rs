//! Validate the content directory without writing anything

use anyhow::Result;

use crate::Ingest;

/// Run the full pipeline and print a summary; never writes a manifest
pub async fn run(ingest: &Ingest) -> Result<()> {
    let manifest = ingest.build().await?;
    println!(
        "OK: {} posts ({} drafts, {} tags) in {:?}",
        manifest.len(),
        manifest.drafts().count(),
        manifest.tag_counts().len(),
        ingest.content_dir
    );
    Ok(())
}
