//! Fixed-width table output.
//!
//! Column positions matter more than names to downstream consumers, so every
//! row is rendered to exactly `RAN_COLUMN_COUNT` fields. Non-values render as
//! literal placeholder tokens:
//!
//! - never reported: the configured absent placeholder (`NA`)
//! - reported blank: the lowercased column name (`altitude`, `nb3_rsrp`)
//! - undecodable: `invalid_` plus the lowercased column name

use crate::config::OutputConfig;
use crate::constants::{
    INVALID_PLACEHOLDER_PREFIX, MAX_NEIGHBOR_CELLS, NEIGHBOR_CELL_COLUMNS, RAN_COLUMN_COUNT,
    READING_COLUMNS, SERVING_CELL_COLUMNS,
};
use crate::error::Result;
use crate::models::{Field, NeighborCell, Reading, ServingCell};
use std::fmt::Display;
use std::io::Write;

/// Header names of the RAN table in output order
pub fn ran_header() -> Vec<String> {
    let mut header: Vec<String> = READING_COLUMNS
        .iter()
        .chain(SERVING_CELL_COLUMNS)
        .map(|name| name.to_string())
        .collect();

    for k in 1..=MAX_NEIGHBOR_CELLS {
        for name in NEIGHBOR_CELL_COLUMNS {
            header.push(format!("NB{}_{}", k, name));
        }
    }

    debug_assert_eq!(header.len(), RAN_COLUMN_COUNT);
    header
}

/// Renders readings against the header
pub struct RowRenderer<'a> {
    output: &'a OutputConfig,
    header: Vec<String>,
}

impl<'a> RowRenderer<'a> {
    pub fn new(output: &'a OutputConfig) -> Self {
        Self {
            output,
            header: ran_header(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn render(&self, reading: &Reading) -> Vec<String> {
        let mut row = Vec::with_capacity(RAN_COLUMN_COUNT);

        row.push(self.cell(&reading.altitude, row.len()));
        row.push(self.cell(&reading.latitude, row.len()));
        row.push(self.cell(&reading.longitude, row.len()));

        let date = map_field(&reading.timestamp, |ts| {
            ts.format(&self.output.date_format).to_string()
        });
        let time = map_field(&reading.timestamp, |ts| {
            ts.format(&self.output.time_format).to_string()
        });
        row.push(self.cell(&date, row.len()));
        row.push(self.cell(&time, row.len()));

        let absent_serving = ServingCell::default();
        let serving = reading.serving_cell.as_ref().unwrap_or(&absent_serving);
        row.push(self.cell(&serving.mcc, row.len()));
        row.push(self.cell(&serving.mnc, row.len()));
        row.push(self.cell(&serving.pci, row.len()));
        row.push(self.cell(&serving.earfcn, row.len()));
        row.push(self.cell(&serving.cell_id, row.len()));
        row.push(self.cell(&serving.lac, row.len()));
        row.push(self.cell(&serving.rsrp, row.len()));
        row.push(self.cell(&serving.rsrq, row.len()));
        row.push(self.cell(&serving.rssi, row.len()));
        row.push(self.cell(&serving.sinr, row.len()));

        let absent_neighbor = NeighborCell::default();
        for k in 0..MAX_NEIGHBOR_CELLS {
            let neighbor = reading.neighbor_cells.get(k).unwrap_or(&absent_neighbor);
            row.push(self.cell(&neighbor.earfcn, row.len()));
            row.push(self.cell(&neighbor.pci, row.len()));
            row.push(self.cell(&neighbor.rsrq, row.len()));
            row.push(self.cell(&neighbor.rsrp, row.len()));
            row.push(self.cell(&neighbor.rssi, row.len()));
        }

        row
    }

    fn cell<T: Display>(&self, field: &Field<T>, column: usize) -> String {
        match field {
            Field::Value(v) => v.to_string(),
            Field::Absent => self.output.absent_placeholder.clone(),
            Field::Empty => self.header[column].to_lowercase(),
            Field::Invalid => format!(
                "{}{}",
                INVALID_PLACEHOLDER_PREFIX,
                self.header[column].to_lowercase()
            ),
        }
    }
}

fn map_field<T, U>(field: &Field<T>, f: impl FnOnce(&T) -> U) -> Field<U> {
    match field {
        Field::Value(v) => Field::Value(f(v)),
        Field::Absent => Field::Absent,
        Field::Empty => Field::Empty,
        Field::Invalid => Field::Invalid,
    }
}

/// Writes the header on creation, then one row per reading
pub struct TableWriter<'a, W: Write> {
    writer: csv::Writer<W>,
    renderer: RowRenderer<'a>,
    rows_written: usize,
}

impl<'a, W: Write> TableWriter<'a, W> {
    pub fn new(sink: W, output: &'a OutputConfig) -> Result<Self> {
        let renderer = RowRenderer::new(output);
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(renderer.header())?;

        Ok(Self {
            writer,
            renderer,
            rows_written: 0,
        })
    }

    pub fn write_reading(&mut self, reading: &Reading) -> Result<()> {
        let row = self.renderer.render(reading);
        self.writer.write_record(&row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| crate::error::ExtractError::Io(e.into_error()))
    }
}
