//! Reading assembly from classified log lines.
//!
//! `RecordAssembler` is a two-state machine. An altitude sentence always
//! closes the current reading (if any) and opens a new one; position, serving
//! cell and neighbour lines fill the open reading. Lines with fewer tokens
//! than their layout requires are dropped whole, while blank or garbled
//! tokens become placeholders so the row keeps its shape.

use crate::classifier::{ClassifiedLine, LineKind, classify, min_tokens};
use crate::config::FormatDescriptor;
use crate::constants::MAX_NEIGHBOR_CELLS;
use crate::decoder::{
    decode_altitude, decode_cell_id, decode_lac, decode_latitude, decode_longitude,
    decode_utc_timestamp,
};
use crate::error::FieldError;
use crate::models::{ExtractionStats, Field, NeighborCell, Reading, ServingCell};
use crate::timezone::TimezoneResolver;
use chrono::NaiveDateTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssemblerState {
    /// No altitude sentence seen yet
    #[default]
    Idle,
    Accumulating(Reading),
}

pub struct RecordAssembler<'a> {
    format: &'a FormatDescriptor,
    resolver: &'a dyn TimezoneResolver,
    state: AssemblerState,
    stats: ExtractionStats,
}

/// Decoded position group of one fix sentence
struct PositionFix {
    latitude: Field<f64>,
    longitude: Field<f64>,
    timestamp: Field<NaiveDateTime>,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(format: &'a FormatDescriptor, resolver: &'a dyn TimezoneResolver) -> Self {
        Self {
            format,
            resolver,
            state: AssemblerState::Idle,
            stats: ExtractionStats::default(),
        }
    }

    pub fn state(&self) -> &AssemblerState {
        &self.state
    }

    /// Anomaly counters gathered so far
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Classify and feed one raw line
    pub fn feed_line(&mut self, line: &str) -> Option<Reading> {
        let classified = classify(line, self.format);
        self.feed(&classified)
    }

    /// Feed one classified line; returns the reading closed by it, if any
    pub fn feed(&mut self, line: &ClassifiedLine<'_>) -> Option<Reading> {
        if line.kind == LineKind::Ignored {
            self.stats.lines_ignored += 1;
            return None;
        }

        let required = min_tokens(line.kind, self.format);
        if line.tokens.len() < required {
            debug!(
                "Dropping {:?} line with {} tokens (need {})",
                line.kind,
                line.tokens.len(),
                required
            );
            self.stats.structural_anomalies += 1;
            return None;
        }

        match line.kind {
            LineKind::AltitudeMarker => self.on_altitude(line),
            LineKind::PositionFix => {
                self.on_position(line);
                None
            }
            LineKind::ServingCellReport => {
                self.on_serving_cell(line);
                None
            }
            LineKind::NeighborCellReport => {
                self.on_neighbor_cell(line);
                None
            }
            LineKind::Ignored => None,
        }
    }

    /// Close the open reading at end of input
    pub fn finish(&mut self) -> Option<Reading> {
        match std::mem::take(&mut self.state) {
            AssemblerState::Accumulating(reading) => Some(reading),
            AssemblerState::Idle => None,
        }
    }

    fn on_altitude(&mut self, line: &ClassifiedLine<'_>) -> Option<Reading> {
        let token = line.token(self.format.altitude.altitude).unwrap_or("");
        let altitude = self.decode(token, decode_altitude);

        let next = AssemblerState::Accumulating(Reading::with_altitude(altitude));
        match std::mem::replace(&mut self.state, next) {
            AssemblerState::Accumulating(previous) => Some(previous),
            AssemblerState::Idle => None,
        }
    }

    fn on_position(&mut self, line: &ClassifiedLine<'_>) {
        if !self.ensure_accumulating(line.kind) {
            return;
        }

        let fix = self.decode_position(line);
        if let AssemblerState::Accumulating(reading) = &mut self.state {
            reading.latitude = fix.latitude;
            reading.longitude = fix.longitude;
            reading.timestamp = fix.timestamp;
        }
    }

    fn decode_position(&mut self, line: &ClassifiedLine<'_>) -> PositionFix {
        let format = self.format;
        let layout = &format.position;
        let token = |index: usize| line.token(index).unwrap_or("").trim();

        let time = token(layout.utc_time);
        let lat = token(layout.latitude);
        let lat_hemisphere = token(layout.latitude_hemisphere);
        let lon = token(layout.longitude);
        let lon_hemisphere = token(layout.longitude_hemisphere);
        let date = token(layout.utc_date);

        // A partial group would shift the columns that follow it
        if [time, lat, lon, date].iter().any(|t| t.is_empty()) {
            return PositionFix {
                latitude: Field::Empty,
                longitude: Field::Empty,
                timestamp: Field::Empty,
            };
        }

        let latitude = self.decode(lat, |t| decode_latitude(t, lat_hemisphere));
        let longitude = self.decode(lon, |t| decode_longitude(t, lon_hemisphere));

        let timestamp = match decode_utc_timestamp(date, time) {
            Ok(utc) => match (latitude.value(), longitude.value()) {
                (Some(&lat), Some(&lon)) => Field::Value(self.resolver.resolve(lat, lon, utc)),
                // Local time cannot be derived without both coordinates
                _ => Field::Invalid,
            },
            Err(e) => {
                self.record_malformed(&e);
                Field::Invalid
            }
        };

        PositionFix {
            latitude,
            longitude,
            timestamp,
        }
    }

    fn on_serving_cell(&mut self, line: &ClassifiedLine<'_>) {
        if !self.ensure_accumulating(line.kind) {
            return;
        }

        let format = self.format;
        let layout = &format.serving_cell;
        let token = |index: usize| line.token(index).unwrap_or("");

        let serving = ServingCell {
            mcc: Field::from_token(token(layout.mcc)),
            mnc: Field::from_token(token(layout.mnc)),
            pci: Field::from_token(token(layout.pci)),
            earfcn: Field::from_token(token(layout.earfcn)),
            cell_id: self.decode(token(layout.cell_id), decode_cell_id),
            lac: self.decode(token(layout.lac), decode_lac),
            rsrp: Field::from_token(token(layout.rsrp)),
            rsrq: Field::from_token(token(layout.rsrq)),
            rssi: Field::from_token(token(layout.rssi)),
            sinr: Field::from_token(token(layout.sinr)),
        };

        if let AssemblerState::Accumulating(reading) = &mut self.state {
            if reading.serving_cell.is_some() {
                debug!("Second serving cell report for reading, replacing the first");
            }
            reading.serving_cell = Some(serving);
        }
    }

    fn on_neighbor_cell(&mut self, line: &ClassifiedLine<'_>) {
        if !self.ensure_accumulating(line.kind) {
            return;
        }

        let format = self.format;
        let layout = &format.neighbor_cell;
        let token = |index: usize| Field::from_token(line.token(index).unwrap_or(""));
        let neighbor = NeighborCell {
            earfcn: token(layout.earfcn),
            pci: token(layout.pci),
            rsrq: token(layout.rsrq),
            rsrp: token(layout.rsrp),
            rssi: token(layout.rssi),
        };

        if let AssemblerState::Accumulating(reading) = &mut self.state {
            if reading.neighbor_cells.len() < MAX_NEIGHBOR_CELLS {
                reading.neighbor_cells.push(neighbor);
            } else {
                self.stats.neighbors_dropped += 1;
                debug!("Neighbour cell limit reached, dropping report");
            }
        }
    }

    /// False (and counted) when there is no reading to attach to
    fn ensure_accumulating(&mut self, kind: LineKind) -> bool {
        match self.state {
            AssemblerState::Accumulating(_) => true,
            AssemblerState::Idle => {
                debug!("{:?} before first altitude sentence, ignoring", kind);
                self.stats.orphan_lines += 1;
                false
            }
        }
    }

    /// Blank token is `Empty`; decode failure is `Invalid`
    fn decode<T>(
        &mut self,
        token: &str,
        decoder: impl FnOnce(&str) -> Result<T, FieldError>,
    ) -> Field<T> {
        if token.trim().is_empty() {
            return Field::Empty;
        }
        match decoder(token) {
            Ok(value) => Field::Value(value),
            Err(e) => {
                self.record_malformed(&e);
                Field::Invalid
            }
        }
    }

    fn record_malformed(&mut self, error: &FieldError) {
        debug!("{}", error);
        self.stats.malformed_fields += 1;
    }
}
