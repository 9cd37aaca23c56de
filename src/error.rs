//! Error handling for log extraction.
//!
//! `ExtractError` covers the conditions that abort a pass (the input cannot be
//! opened, the output cannot be written, the configuration is unusable).
//! `FieldError` covers per-field decode failures; those are always absorbed
//! by the assembler and turned into placeholders.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Input log not found or unreadable: {path}")]
    MissingInputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write output table: {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("File watch error: {message}")]
    Watch { message: String },
}

impl ExtractError {
    pub fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MissingInputFile {
            path: path.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<notify::Error> for ExtractError {
    fn from(error: notify::Error) -> Self {
        Self::Watch {
            message: error.to_string(),
        }
    }
}

/// Per-field decode failure. Never aborts a pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Malformed coordinate: '{value}'")]
    MalformedCoordinate { value: String },

    #[error("Malformed hexadecimal identifier: '{value}'")]
    MalformedHex { value: String },

    #[error("Malformed timestamp: '{value}'")]
    MalformedTimestamp { value: String },

    #[error("Malformed number: '{value}'")]
    MalformedNumber { value: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
