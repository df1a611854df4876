//! Error types for NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Source file does not exist
    #[error("Source file not found: {0}")]
    NotFound(String),

    /// libnetcdf refused to open the file
    #[error("Failed to open NetCDF file {path}: {reason}")]
    Open { path: String, reason: String },

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format (unexpected rank, mismatched axes)
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Index past the end of an axis
    #[error("{axis} index {index} out of range (length {len})")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    /// Requested coordinate value is not on the grid
    #[error("No {axis} coordinate equal to {value}")]
    NoSuchCoordinate { axis: &'static str, value: f64 },

    /// Reading values from a variable failed
    #[error("Failed to read {variable}: {reason}")]
    Read { variable: String, reason: String },
}

impl NetCdfError {
    pub(crate) fn out_of_range(axis: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { axis, index, len }
    }
}
