//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`Value`] - Scalar cell values (blank, number, text)
//! - [`CellCoordinate`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellProvider`] - The host contract the evaluator reads cells through
//! - [`Sheet`] - An in-memory host grid with a `"row:col"` keyed formula store
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{Sheet, Value};
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_value("A1", 10.0).unwrap();
//! sheet.set_formula("B1", "=A1*2").unwrap();
//!
//! assert_eq!(sheet.value("A1").unwrap(), Value::Number(10.0));
//! assert_eq!(sheet.formula("B1").unwrap(), Some("=A1*2"));
//! ```

pub mod cell;
pub mod error;
pub mod provider;
pub mod sheet;

// Re-exports for convenience
pub use cell::{
    column_to_index, format_number, index_to_column, parse_cell_ref, parse_range,
    CellCoordinate, CellRange, Value,
};
pub use error::{Error, Result};
pub use provider::{is_formula, CellContent, CellProvider, NoCells};
pub use sheet::{FormulaEntry, FormulaStore, Sheet};

/// Maximum number of rows addressable from formula text
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns addressable from formula text
pub const MAX_COLS: u32 = 16_384;
