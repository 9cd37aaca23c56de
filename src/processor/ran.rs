//! Single-pass RAN log extraction.
//!
//! Streams the diagnostic log line by line through the assembler and writes
//! every closed reading straight to the table. Nothing but the open reading
//! is held in memory.

use crate::assembler::RecordAssembler;
use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::models::ExtractionStats;
use crate::table::TableWriter;
use crate::timezone::TimezoneResolver;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extracts one diagnostic log into one RAN table
#[derive(Clone)]
pub struct RanExtractor {
    input_path: PathBuf,
    output_path: PathBuf,
    config: ExtractorConfig,
    resolver: Arc<dyn TimezoneResolver + Send + Sync>,
}

impl std::fmt::Debug for RanExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RanExtractor")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .finish_non_exhaustive()
    }
}

impl RanExtractor {
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        resolver: Arc<dyn TimezoneResolver + Send + Sync>,
    ) -> Self {
        Self {
            input_path,
            output_path,
            config: ExtractorConfig::default(),
            resolver,
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Same configuration and resolver, different files
    pub fn with_paths(mut self, input_path: PathBuf, output_path: PathBuf) -> Self {
        self.input_path = input_path;
        self.output_path = output_path;
        self
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run one complete pass. Only an unopenable input or an unwritable
    /// output fails; bad lines are absorbed.
    pub fn process(&self) -> Result<ExtractionStats> {
        let start_time = Instant::now();

        let input = File::open(&self.input_path)
            .map_err(|e| ExtractError::missing_input(&self.input_path, e))?;
        let output = File::create(&self.output_path).map_err(|e| ExtractError::OutputWrite {
            path: self.output_path.clone(),
            source: e,
        })?;

        debug!(
            "Extracting {} -> {}",
            self.input_path.display(),
            self.output_path.display()
        );

        let mut stats = extract_ran(
            BufReader::new(input),
            BufWriter::new(output),
            &self.config,
            self.resolver.as_ref(),
        )?;
        stats.output_path = self.output_path.clone();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        info!(
            "Wrote {} readings from {} lines ({} ignored, {} short, {} malformed fields, {} neighbours dropped)",
            stats.readings_emitted,
            stats.lines_read,
            stats.lines_ignored,
            stats.structural_anomalies,
            stats.malformed_fields,
            stats.neighbors_dropped
        );

        Ok(stats)
    }
}

/// Core pass over any line source and sink
pub fn extract_ran<R: BufRead, W: Write>(
    mut reader: R,
    writer: W,
    config: &ExtractorConfig,
    resolver: &dyn TimezoneResolver,
) -> Result<ExtractionStats> {
    let mut table = TableWriter::new(writer, &config.output)?;
    let mut assembler = RecordAssembler::new(&config.format, resolver);
    let mut lines_read = 0;

    // Logs captured over telnet can carry stray non-UTF-8 bytes
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        lines_read += 1;

        let line = String::from_utf8_lossy(&buffer);
        if let Some(reading) = assembler.feed_line(&line) {
            table.write_reading(&reading)?;
        }
    }

    if let Some(reading) = assembler.finish() {
        table.write_reading(&reading)?;
    }

    let mut stats = assembler.stats().clone();
    stats.lines_read = lines_read;
    stats.readings_emitted = table.rows_written();
    table.finish()?.flush()?;

    Ok(stats)
}
