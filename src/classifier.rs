//! Line classification for the interleaved diagnostic log.
//!
//! Classification is a literal prefix match against the format descriptor;
//! leading whitespace is part of the prefix. Unmatched lines are `Ignored`.

use crate::config::FormatDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    AltitudeMarker,
    PositionFix,
    ServingCellReport,
    NeighborCellReport,
    Ignored,
}

/// A raw line tagged with its kind and split on commas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub kind: LineKind,
    pub tokens: Vec<&'a str>,
}

impl<'a> ClassifiedLine<'a> {
    /// Token at `index`, if the line is long enough
    pub fn token(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }
}

pub fn classify<'a>(line: &'a str, format: &FormatDescriptor) -> ClassifiedLine<'a> {
    let line = line.trim_end_matches(['\r', '\n']);

    let kind = if line.starts_with(&format.altitude.prefix) {
        LineKind::AltitudeMarker
    } else if line.starts_with(&format.position.prefix) {
        LineKind::PositionFix
    } else if line.starts_with(&format.serving_cell.prefix) {
        LineKind::ServingCellReport
    } else if line.starts_with(&format.neighbor_cell.prefix) {
        LineKind::NeighborCellReport
    } else {
        LineKind::Ignored
    };

    let tokens = match kind {
        LineKind::Ignored => Vec::new(),
        _ => line.split(',').collect(),
    };

    ClassifiedLine { kind, tokens }
}

/// Minimum token count the layout requires for `kind`
pub fn min_tokens(kind: LineKind, format: &FormatDescriptor) -> usize {
    match kind {
        LineKind::AltitudeMarker => format.altitude.min_tokens,
        LineKind::PositionFix => format.position.min_tokens,
        LineKind::ServingCellReport => format.serving_cell.min_tokens,
        LineKind::NeighborCellReport => format.neighbor_cell.min_tokens,
        LineKind::Ignored => 0,
    }
}
