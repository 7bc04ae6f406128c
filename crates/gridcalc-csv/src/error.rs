//! CSV error types

use gridcalc_core::{MAX_COLS, MAX_ROWS};
use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors from loading or saving a sheet as CSV
#[derive(Debug, Error)]
pub enum CsvError {
    /// File could not be opened, created or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV or a failed record write
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A non-empty field past the last addressable row or column (1-based)
    #[error("Field at row {row}, column {column} is outside the {}x{} grid", MAX_ROWS, MAX_COLS)]
    OutOfGrid { row: usize, column: usize },
}
