//! Core data structures for RAN log extraction.
//!
//! A `Reading` is one output row in the making. Every slot is a `Field`, so a
//! value that never arrived, arrived blank, or arrived garbled stays
//! distinguishable until the table writer renders it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// State of a single output slot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    /// No line carrying this field was seen for the reading
    #[default]
    Absent,
    /// The carrying line was seen but its token was blank
    Empty,
    /// The token was present but could not be decoded
    Invalid,
    Value(T),
}

impl<T> Field<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Field::Value(_))
    }
}

impl Field<String> {
    /// Pass-through token: blank becomes `Empty`
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            Field::Empty
        } else {
            Field::Value(token.to_string())
        }
    }
}

/// Cell identity split from a 16-bit field packed as (major byte, minor byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Serving cell report decoded from one modem response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServingCell {
    pub mcc: Field<String>,
    pub mnc: Field<String>,
    pub pci: Field<String>,
    pub earfcn: Field<String>,
    pub cell_id: Field<CellId>,
    pub lac: Field<u32>,
    pub rsrp: Field<String>,
    pub rsrq: Field<String>,
    pub rssi: Field<String>,
    pub sinr: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NeighborCell {
    pub earfcn: Field<String>,
    pub pci: Field<String>,
    pub rsrq: Field<String>,
    pub rsrp: Field<String>,
    pub rssi: Field<String>,
}

/// One measurement sample, opened by an altitude sentence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    /// Metres, truncated to a multiple of 10
    pub altitude: Field<i64>,
    pub latitude: Field<f64>,
    pub longitude: Field<f64>,
    /// Local wall-clock time of the position fix
    pub timestamp: Field<NaiveDateTime>,
    /// `None` until a serving cell report arrives
    pub serving_cell: Option<ServingCell>,
    /// In arrival order, never more than `MAX_NEIGHBOR_CELLS`
    pub neighbor_cells: Vec<NeighborCell>,
}

impl Reading {
    pub fn with_altitude(altitude: Field<i64>) -> Self {
        Self {
            altitude,
            ..Default::default()
        }
    }
}

/// Counters for one RAN extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub lines_read: usize,
    pub readings_emitted: usize,
    pub lines_ignored: usize,
    /// Classified lines with too few tokens
    pub structural_anomalies: usize,
    /// Individual fields replaced by an invalid placeholder
    pub malformed_fields: usize,
    /// Neighbour reports beyond the per-reading limit
    pub neighbors_dropped: usize,
    /// Data lines seen before the first altitude sentence
    pub orphan_lines: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}

/// Counters for a probe log pass (delay or throughput)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeStats {
    pub records_written: usize,
    pub output_path: PathBuf,
}
