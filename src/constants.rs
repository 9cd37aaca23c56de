//! Application constants for the extractor
//!
//! Line prefixes, minimum token counts and column names for the default
//! diagnostic dump layout, plus the conventional file names used by the
//! combined run.

// =============================================================================
// Line prefixes (leading space is part of the prefix)
// =============================================================================

/// GPS fix sentence carrying altitude; starts a new reading
pub const ALTITUDE_PREFIX: &str = " $GPGGA";

/// GPS recommended-minimum sentence carrying position, date and time
pub const POSITION_PREFIX: &str = " $GPRMC";

/// Modem serving cell response
pub const SERVING_CELL_PREFIX: &str = " \"servingcell\"";

/// Modem intra-frequency neighbour cell response
pub const NEIGHBOR_CELL_PREFIX: &str = " \"neighbourcell intra\"";

// =============================================================================
// Minimum token counts per line class
// =============================================================================

pub const ALTITUDE_MIN_TOKENS: usize = 10;
pub const POSITION_MIN_TOKENS: usize = 10;
pub const SERVING_CELL_MIN_TOKENS: usize = 17;
pub const NEIGHBOR_CELL_MIN_TOKENS: usize = 8;

// =============================================================================
// Output table layout
// =============================================================================

/// Maximum neighbour cells kept per reading
pub const MAX_NEIGHBOR_CELLS: usize = 10;

/// Leading columns: altitude, position and local timestamp
pub const READING_COLUMNS: &[&str] = &["Altitude", "latitude", "longitude", "Date", "Time"];

/// Serving cell columns in output order
pub const SERVING_CELL_COLUMNS: &[&str] = &[
    "MCC", "MNC", "PCI", "EARFCN", "CellID", "LAC", "RSRP", "RSRQ", "RSSI", "SINR",
];

/// Per-neighbour columns, prefixed with `NB<k>_` in the header
pub const NEIGHBOR_CELL_COLUMNS: &[&str] = &["EARFCN", "PCI", "RSRQ", "RSRP", "RSSI"];

/// Total number of columns in every row of the RAN table
pub const RAN_COLUMN_COUNT: usize = READING_COLUMNS.len()
    + SERVING_CELL_COLUMNS.len()
    + MAX_NEIGHBOR_CELLS * NEIGHBOR_CELL_COLUMNS.len();

// =============================================================================
// Placeholders and formats
// =============================================================================

/// Token written for a field that was never reported for a reading
pub const DEFAULT_ABSENT_PLACEHOLDER: &str = "NA";

/// Prefix for fields whose raw token could not be decoded
pub const INVALID_PLACEHOLDER_PREFIX: &str = "invalid_";

pub const DEFAULT_DATE_FORMAT: &str = "%Y/%b/%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

// =============================================================================
// Probe logs
// =============================================================================

pub const DELAY_COLUMNS: &[&str] = &[
    "Date",
    "Time",
    "Max_RTT_ms",
    "Sent_Packets",
    "Received_Packets",
];

pub const THROUGHPUT_COLUMNS: &[&str] = &["Date", "Time", "UL", "DL"];

/// Conventional (input, output) file names for the combined run
pub mod file_names {
    pub const RAN_LOG: &str = "lte_log.txt";
    pub const RAN_TABLE: &str = "lte_data.txt";
    pub const DELAY_LOG: &str = "nping_log.txt";
    pub const DELAY_TABLE: &str = "nping_data.txt";
    pub const THROUGHPUT_LOG: &str = "iperf3_log.txt";
    pub const THROUGHPUT_TABLE: &str = "iperf3_data.txt";
}

/// Config file location under the user config directory
pub const CONFIG_DIR_NAME: &str = "ran-extractor";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Quiet period after a file change before re-extracting, in milliseconds
pub const WATCH_DEBOUNCE_MS: u64 = 500;
