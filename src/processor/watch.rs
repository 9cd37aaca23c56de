//! Re-extraction on input change.
//!
//! The diagnostic log keeps growing while a drive test runs. Watch mode runs
//! one pass up front, then another after each burst of modifications to the
//! input. Passes run one at a time on the blocking pool; a failed pass is
//! logged and the watch keeps going.

use super::ran::RanExtractor;
use crate::error::{ExtractError, Result};
use crate::models::ExtractionStats;

use indicatif::{ProgressBar, ProgressStyle};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Watches one input log and re-runs its extractor
pub struct RanWatcher {
    extractor: RanExtractor,
    debounce: Duration,
}

impl RanWatcher {
    pub fn new(extractor: RanExtractor, debounce: Duration) -> Self {
        Self {
            extractor,
            debounce,
        }
    }

    /// Run until the event source closes or the future is dropped.
    ///
    /// The initial pass must succeed; a missing input at start-up is an error.
    /// The watch is registered first so writes made during that pass still
    /// trigger a follow-up pass.
    pub async fn run(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<()>(1);
        let target = self.extractor.input_path().to_path_buf();
        let filter_target = target.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| match result {
                Ok(event) if touches(&event, &filter_target) => {
                    // A full channel already holds a pending change
                    let _ = tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => warn!("Watch backend error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(&watch_dir(&target), RecursiveMode::NonRecursive)?;

        let stats = self.run_pass().await?;
        info!(
            "Initial pass wrote {} readings to {}",
            stats.readings_emitted,
            stats.output_path.display()
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("valid spinner template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("Watching {}", target.display()));

        while rx.recv().await.is_some() {
            tokio::time::sleep(self.debounce).await;
            while rx.try_recv().is_ok() {}

            debug!("Change detected on {}", target.display());
            match self.run_pass().await {
                Ok(stats) => spinner.set_message(format!(
                    "Watching {} ({} readings in last pass)",
                    target.display(),
                    stats.readings_emitted
                )),
                Err(e) => warn!("Extraction pass failed: {}", e),
            }
        }

        spinner.finish_and_clear();
        Ok(())
    }

    async fn run_pass(&self) -> Result<ExtractionStats> {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.process())
            .await
            .map_err(|e| ExtractError::Watch {
                message: format!("Extraction task failed: {}", e),
            })?
    }
}

/// Directory to register with the backend; watching the parent survives
/// editors and loggers that replace the file
fn watch_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches(event: &Event, target: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let Some(name) = target.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(name))
}
