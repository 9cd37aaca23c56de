//! Configuration management and validation.
//!
//! The token offsets of each diagnostic line class are configuration data
//! rather than code: vendor dumps disagree on column positions, so the whole
//! layout can be overridden from a TOML file. Defaults reproduce the layout
//! observed in the field logs.

use crate::constants::{
    ALTITUDE_MIN_TOKENS, ALTITUDE_PREFIX, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    DEFAULT_ABSENT_PLACEHOLDER, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT, NEIGHBOR_CELL_MIN_TOKENS,
    NEIGHBOR_CELL_PREFIX, POSITION_MIN_TOKENS, POSITION_PREFIX, SERVING_CELL_MIN_TOKENS,
    SERVING_CELL_PREFIX,
};
use crate::error::{ExtractError, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Top-level extractor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Line prefixes and token offsets
    pub format: FormatDescriptor,

    /// Output rendering options
    pub output: OutputConfig,
}

/// Output rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// chrono format string for the Date column
    pub date_format: String,

    /// chrono format string for the Time column
    pub time_format: String,

    /// Token for fields never reported for a reading
    pub absent_placeholder: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            absent_placeholder: DEFAULT_ABSENT_PLACEHOLDER.to_string(),
        }
    }
}

/// Layout of every line class the classifier recognises
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatDescriptor {
    pub altitude: AltitudeLayout,
    pub position: PositionLayout,
    pub serving_cell: ServingCellLayout,
    pub neighbor_cell: NeighborCellLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltitudeLayout {
    pub prefix: String,
    pub min_tokens: usize,
    pub altitude: usize,
}

impl Default for AltitudeLayout {
    fn default() -> Self {
        Self {
            prefix: ALTITUDE_PREFIX.to_string(),
            min_tokens: ALTITUDE_MIN_TOKENS,
            altitude: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionLayout {
    pub prefix: String,
    pub min_tokens: usize,
    pub utc_time: usize,
    pub latitude: usize,
    pub latitude_hemisphere: usize,
    pub longitude: usize,
    pub longitude_hemisphere: usize,
    pub utc_date: usize,
}

impl Default for PositionLayout {
    fn default() -> Self {
        Self {
            prefix: POSITION_PREFIX.to_string(),
            min_tokens: POSITION_MIN_TOKENS,
            utc_time: 1,
            latitude: 3,
            latitude_hemisphere: 4,
            longitude: 5,
            longitude_hemisphere: 6,
            utc_date: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingCellLayout {
    pub prefix: String,
    pub min_tokens: usize,
    pub mcc: usize,
    pub mnc: usize,
    pub cell_id: usize,
    pub pci: usize,
    pub earfcn: usize,
    pub lac: usize,
    pub rsrp: usize,
    pub rsrq: usize,
    pub rssi: usize,
    pub sinr: usize,
}

impl Default for ServingCellLayout {
    fn default() -> Self {
        Self {
            prefix: SERVING_CELL_PREFIX.to_string(),
            min_tokens: SERVING_CELL_MIN_TOKENS,
            mcc: 4,
            mnc: 5,
            cell_id: 6,
            pci: 7,
            earfcn: 8,
            lac: 12,
            rsrp: 13,
            rsrq: 14,
            rssi: 15,
            sinr: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborCellLayout {
    pub prefix: String,
    pub min_tokens: usize,
    pub earfcn: usize,
    pub pci: usize,
    pub rsrq: usize,
    pub rsrp: usize,
    pub rssi: usize,
}

impl Default for NeighborCellLayout {
    fn default() -> Self {
        Self {
            prefix: NEIGHBOR_CELL_PREFIX.to_string(),
            min_tokens: NEIGHBOR_CELL_MIN_TOKENS,
            earfcn: 2,
            pci: 3,
            rsrq: 4,
            rsrp: 5,
            rssi: 6,
        }
    }
}

impl FormatDescriptor {
    /// Reject layouts that would read past their own minimum token count
    pub fn validate(&self) -> Result<()> {
        check_layout(
            "altitude",
            &self.altitude.prefix,
            self.altitude.min_tokens,
            &[self.altitude.altitude],
        )?;
        let p = &self.position;
        check_layout(
            "position",
            &p.prefix,
            p.min_tokens,
            &[
                p.utc_time,
                p.latitude,
                p.latitude_hemisphere,
                p.longitude,
                p.longitude_hemisphere,
                p.utc_date,
            ],
        )?;
        let s = &self.serving_cell;
        check_layout(
            "serving_cell",
            &s.prefix,
            s.min_tokens,
            &[
                s.mcc, s.mnc, s.cell_id, s.pci, s.earfcn, s.lac, s.rsrp, s.rsrq, s.rssi, s.sinr,
            ],
        )?;
        let n = &self.neighbor_cell;
        check_layout(
            "neighbor_cell",
            &n.prefix,
            n.min_tokens,
            &[n.earfcn, n.pci, n.rsrq, n.rsrp, n.rssi],
        )?;
        Ok(())
    }
}

fn check_layout(name: &str, prefix: &str, min_tokens: usize, offsets: &[usize]) -> Result<()> {
    if prefix.is_empty() {
        return Err(ExtractError::configuration(format!(
            "{} layout has an empty prefix",
            name
        )));
    }

    // offsets is never empty for the built-in layouts
    let highest = offsets.iter().copied().max().unwrap_or(0);
    if highest >= min_tokens {
        return Err(ExtractError::configuration(format!(
            "{} layout reads token {} but only requires {} tokens",
            name, highest, min_tokens
        )));
    }
    Ok(())
}

impl ExtractorConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ExtractError::configuration(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Default config file location (may not exist)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Explicit file, then the default location if present, then built-in defaults
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using config file: {}", path.display());
            return Self::from_file(path);
        }

        match Self::default_config_path().filter(|path| path.exists()) {
            Some(path) => {
                info!("Using config file: {}", path.display());
                Self::from_file(&path)
            }
            None => {
                debug!("No config file found, using built-in layout");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.format.validate()?;
        if self.output.absent_placeholder.trim().is_empty() {
            return Err(ExtractError::configuration(
                "absent_placeholder must not be blank",
            ));
        }
        check_time_format("date_format", &self.output.date_format)?;
        check_time_format("time_format", &self.output.time_format)?;
        Ok(())
    }
}

/// Invalid strftime specifiers only surface at render time, so catch them here
fn check_time_format(name: &str, format: &str) -> Result<()> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ExtractError::configuration(format!(
            "{} '{}' is not a valid chrono format",
            name, format
        )));
    }
    Ok(())
}
