//! Build the manifest and write it to disk

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::CONFIG_FILE;
use crate::error::IngestFailure;
use crate::Ingest;

/// Ingest the content directory and write the manifest to `output`.
///
/// Nothing is written unless every file is valid.
pub async fn run(ingest: &Ingest, output: &Path, pretty: bool) -> Result<()> {
    let manifest = ingest.build().await?;
    manifest.write(output, pretty)?;
    Ok(())
}

/// Re-run the ingestion whenever a post or config file changes, until Ctrl-C
pub async fn watch(
    ingest: &Ingest,
    output: &Path,
    pretty: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            let _ = tx.send(res);
        },
    )?;

    debouncer
        .watcher()
        .watch(&ingest.content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", ingest.content_dir);

    if let Some(path) = config_path {
        debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", path);
    }

    let watched = WatchFilter::new(ingest, output, config_path);
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
            event = rx.recv() => match event {
                Some(Ok(events)) => {
                    let changed: Vec<_> = events
                        .iter()
                        .filter(|e| watched.is_relevant(&e.path))
                        .collect();
                    if changed.is_empty() {
                        continue;
                    }
                    for event in &changed {
                        tracing::info!("File changed: {:?}", event.path);
                    }
                    rebuild(ingest, output, pretty, config_path).await;
                }
                Some(Err(e)) => tracing::error!("Watch error: {:?}", e),
                None => break,
            }
        }
    }

    Ok(())
}

async fn rebuild(ingest: &Ingest, output: &Path, pretty: bool, config_path: Option<&Path>) {
    // Config edits take effect on the next run
    let ingest = match Ingest::open(&ingest.content_dir, config_path) {
        Ok(reloaded) => reloaded,
        Err(e) => {
            tracing::error!("Config reload failed, keeping previous settings: {:#}", e);
            ingest.clone()
        }
    };

    match run(&ingest, output, pretty).await {
        Ok(()) => println!("Regenerated {:?}", output),
        Err(e) => {
            report(&e);
            println!("Manifest left unchanged");
        }
    }
}

/// Print an error for the user on stderr
pub fn report(err: &anyhow::Error) {
    eprint!("{}", format_report(err));
}

/// One `<path>: <description>` line per failing file, then a summary line
pub fn format_report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<IngestFailure>() {
        Some(failure) => {
            let mut out = String::new();
            for error in failure.errors() {
                out.push_str(&format!("{}\n", error));
            }
            out.push_str(&format!("{} error(s); no manifest written\n", failure.len()));
            out
        }
        None => format!("Error: {:#}\n", err),
    }
}

/// Decides which filesystem events should trigger a rebuild
struct WatchFilter<'a> {
    ingest: &'a Ingest,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl<'a> WatchFilter<'a> {
    fn new(ingest: &'a Ingest, output: &Path, config_path: Option<&Path>) -> Self {
        Self {
            ingest,
            output: output.canonicalize().ok(),
            config_path: config_path.and_then(|p| p.canonicalize().ok()),
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        let in_git = path.components().any(|c| c.as_os_str() == ".git");
        if in_git || path.to_string_lossy().ends_with('~') {
            return false;
        }

        let canonical = path.canonicalize().ok();
        if canonical.is_some() && canonical == self.output {
            return false;
        }
        if canonical.is_some() && canonical == self.config_path {
            return true;
        }

        if path.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILE) {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.ingest.config.is_post_extension(e))
            .unwrap_or(false)
    }
}
