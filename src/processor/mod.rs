//! Extraction passes over whole log files.
//!
//! `ran` turns the interleaved GPS/modem log into the RAN table, `delay` and
//! `throughput` flatten the probe logs recorded alongside it, and `watch`
//! re-runs the RAN pass as the log grows. `run_all` processes a capture
//! directory laid out with the conventional file names.

pub mod delay;
pub mod ran;
pub mod throughput;
pub mod watch;

#[cfg(test)]
pub mod tests;

pub use delay::{DelaySample, extract_delay_log, parse_delay_log};
pub use ran::{RanExtractor, extract_ran};
pub use throughput::{ThroughputSample, extract_throughput_log, parse_throughput_log};
pub use watch::RanWatcher;

use crate::constants::file_names;
use crate::error::{ExtractError, Result};
use crate::models::{ExtractionStats, ProbeStats};

use colored::*;
use std::path::Path;
use tokio::task;
use tracing::{info, warn};

/// Outcome of a combined run. `None` marks an input that was not present.
#[derive(Debug, Clone, Default)]
pub struct CaptureStats {
    pub ran: Option<ExtractionStats>,
    pub delay: Option<ProbeStats>,
    pub throughput: Option<ProbeStats>,
}

impl CaptureStats {
    pub fn tables_written(&self) -> usize {
        [
            self.ran.is_some(),
            self.delay.is_some(),
            self.throughput.is_some(),
        ]
        .iter()
        .filter(|written| **written)
        .count()
    }
}

/// Run every extractor over `dir`, skipping logs that are not there.
///
/// `ran` carries the configuration and resolver for the RAN pass; its paths
/// are replaced with the conventional names under `dir`.
pub async fn run_all(dir: &Path, ran: RanExtractor) -> Result<CaptureStats> {
    println!(
        "{} {}",
        "Processing capture directory".bright_green().bold(),
        dir.display()
    );

    let ran = ran.with_paths(
        dir.join(file_names::RAN_LOG),
        dir.join(file_names::RAN_TABLE),
    );
    let ran_stats = skip_missing(task::spawn_blocking(move || ran.process()).await)?;

    let delay_input = dir.join(file_names::DELAY_LOG);
    let delay_output = dir.join(file_names::DELAY_TABLE);
    let delay_stats = skip_missing(
        task::spawn_blocking(move || extract_delay_log(&delay_input, &delay_output)).await,
    )?;

    let throughput_input = dir.join(file_names::THROUGHPUT_LOG);
    let throughput_output = dir.join(file_names::THROUGHPUT_TABLE);
    let throughput_stats = skip_missing(
        task::spawn_blocking(move || extract_throughput_log(&throughput_input, &throughput_output))
            .await,
    )?;

    let stats = CaptureStats {
        ran: ran_stats,
        delay: delay_stats,
        throughput: throughput_stats,
    };
    info!("Wrote {} of 3 tables", stats.tables_written());
    Ok(stats)
}

/// A missing log is expected in a partial capture; anything else aborts
fn skip_missing<T>(
    joined: std::result::Result<Result<T>, task::JoinError>,
) -> Result<Option<T>> {
    let result = joined.map_err(|e| ExtractError::Io(std::io::Error::other(e)))?;
    match result {
        Ok(stats) => Ok(Some(stats)),
        Err(ExtractError::MissingInputFile { path, .. }) => {
            warn!("Skipping {}: not found", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
