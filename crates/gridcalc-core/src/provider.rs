//! The cell-provider contract
//!
//! The formula engine never owns grid data. Everything it knows about other
//! cells comes through a [`CellProvider`], which reports either a plain value
//! or the raw text of a stored formula. The engine evaluates formula cells
//! itself so it can guard against reference cycles.

use crate::cell::{CellCoordinate, Value};

/// What a host reports for one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// A plain (displayed) value
    Value(Value),
    /// Raw formula text, including the leading '='
    Formula(String),
}

impl CellContent {
    /// Content of an empty cell
    pub fn blank() -> Self {
        CellContent::Value(Value::Blank)
    }

    /// Classify raw stored input: strings starting with '=' are formulas
    pub fn from_input(raw: &str) -> Self {
        if is_formula(raw) {
            CellContent::Formula(raw.to_string())
        } else {
            CellContent::Value(Value::from_input(raw))
        }
    }
}

impl From<Value> for CellContent {
    fn from(value: Value) -> Self {
        CellContent::Value(value)
    }
}

impl From<f64> for CellContent {
    fn from(n: f64) -> Self {
        CellContent::Value(Value::Number(n))
    }
}

/// Returns true iff the raw stored value is formula text
pub fn is_formula(raw: &str) -> bool {
    raw.starts_with('=')
}

/// Supplies cell contents to the evaluator by zero-based coordinate
pub trait CellProvider {
    /// Look up one cell
    fn cell(&self, coord: CellCoordinate) -> CellContent;
}

impl<F> CellProvider for F
where
    F: Fn(CellCoordinate) -> CellContent,
{
    fn cell(&self, coord: CellCoordinate) -> CellContent {
        self(coord)
    }
}

/// A provider with no cells at all; every lookup is blank
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCells;

impl CellProvider for NoCells {
    fn cell(&self, _coord: CellCoordinate) -> CellContent {
        CellContent::blank()
    }
}
