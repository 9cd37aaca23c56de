//! RAN Extractor Library
//!
//! Flattens drive-test diagnostic logs, where GPS NMEA sentences and LTE
//! modem AT-command responses are interleaved, into fixed-width
//! comma-separated tables with one row per measurement sample.
//!
//! This library provides tools for:
//! - Classifying raw log lines against a configurable line layout
//! - Decoding coordinates, hexadecimal cell identifiers and UTC fixes
//! - Resolving fix times to local wall-clock time from the coordinate
//! - Assembling readings and writing them as constant-width rows
//! - Flattening the companion nping and iperf3 probe logs

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod models;
pub mod processor;
pub mod table;
pub mod timezone;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use assembler::{AssemblerState, RecordAssembler};
pub use config::{ExtractorConfig, FormatDescriptor, OutputConfig};
pub use error::{ExtractError, FieldError, Result};
pub use models::{CellId, ExtractionStats, Field, NeighborCell, ProbeStats, Reading, ServingCell};
pub use processor::{RanExtractor, extract_ran};
pub use timezone::{GeoTimezoneResolver, TimezoneResolver, UtcResolver};
