//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Value`] - The scalar held by (or computed for) a cell
//! - [`CellCoordinate`] - A cell's zero-based location (e.g., "A1" is col 0, row 0)
//! - [`CellRange`] - An inclusive rectangle of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{
    column_to_index, index_to_column, parse_cell_ref, parse_range, CellCoordinate, CellRange,
    CellRangeIterator,
};
pub use value::{format_number, Value};
