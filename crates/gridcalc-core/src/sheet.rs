//! In-memory host grid
//!
//! A [`Sheet`] keeps two things apart: the displayed value of every cell and,
//! for formula cells, the raw formula text in a [`FormulaStore`]. It is the
//! reference implementation of the [`CellProvider`] contract.

use crate::cell::{CellCoordinate, CellRange, Value};
use crate::error::{Error, Result};
use crate::provider::{is_formula, CellContent, CellProvider};
use ahash::AHashMap;

/// Raw formula text stored for one cell
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaEntry {
    /// Cell the formula lives in
    pub coord: CellCoordinate,
    /// Formula text including the leading '='
    pub text: String,
}

/// Formula text per cell, keyed by `"row:col"` (zero-based)
#[derive(Debug, Clone, Default)]
pub struct FormulaStore {
    entries: AHashMap<String, FormulaEntry>,
}

impl FormulaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Formula text at a coordinate
    pub fn get(&self, coord: CellCoordinate) -> Option<&str> {
        self.entries.get(&coord.key()).map(|e| e.text.as_str())
    }

    /// Formula text by raw `"row:col"` key
    pub fn get_by_key(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.text.as_str())
    }

    /// Store formula text, replacing any previous formula at that cell
    pub fn insert(&mut self, coord: CellCoordinate, text: impl Into<String>) -> Option<String> {
        let entry = FormulaEntry {
            coord,
            text: text.into(),
        };
        self.entries.insert(coord.key(), entry).map(|e| e.text)
    }

    /// Remove the formula at a coordinate
    pub fn remove(&mut self, coord: CellCoordinate) -> Option<String> {
        self.entries.remove(&coord.key()).map(|e| e.text)
    }

    /// Check whether a cell holds a formula
    pub fn contains(&self, coord: CellCoordinate) -> bool {
        self.entries.contains_key(&coord.key())
    }

    /// Number of stored formulas
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no formulas are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in row-major order
    pub fn entries(&self) -> Vec<&FormulaEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.coord);
        entries
    }
}

/// A single grid of displayed values plus its formula store
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    values: AHashMap<CellCoordinate, Value>,
    formulas: FormulaStore,
}

static BLANK: Value = Value::Blank;

impl Sheet {
    /// Create a new empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            values: AHashMap::new(),
            formulas: FormulaStore::new(),
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Displayed value at an A1-style address
    pub fn value(&self, address: &str) -> Result<Value> {
        let coord = CellCoordinate::parse(address)?;
        Ok(self.value_at(coord).clone())
    }

    /// Displayed value at a coordinate
    pub fn value_at(&self, coord: CellCoordinate) -> &Value {
        self.values.get(&coord).unwrap_or(&BLANK)
    }

    /// Formula text at an A1-style address
    pub fn formula(&self, address: &str) -> Result<Option<&str>> {
        let coord = CellCoordinate::parse(address)?;
        Ok(self.formulas.get(coord))
    }

    /// Formula text at a coordinate
    pub fn formula_at(&self, coord: CellCoordinate) -> Option<&str> {
        self.formulas.get(coord)
    }

    /// The formula store
    pub fn formulas(&self) -> &FormulaStore {
        &self.formulas
    }

    /// Set a plain value at an A1-style address, clearing any formula there
    pub fn set_value<V: Into<Value>>(&mut self, address: &str, value: V) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_value_at(coord, value);
        Ok(())
    }

    /// Set a plain value at a coordinate, clearing any formula there
    pub fn set_value_at<V: Into<Value>>(&mut self, coord: CellCoordinate, value: V) {
        self.formulas.remove(coord);
        self.put_value(coord, value.into());
    }

    /// Store formula text at an A1-style address
    pub fn set_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_formula_at(coord, formula)
    }

    /// Store formula text at a coordinate
    ///
    /// The displayed value is left alone until the host evaluates the formula.
    pub fn set_formula_at(&mut self, coord: CellCoordinate, formula: &str) -> Result<()> {
        if !is_formula(formula) {
            return Err(Error::NotAFormula(formula.to_string()));
        }
        self.formulas.insert(coord, formula);
        Ok(())
    }

    /// Store raw input at an A1-style address (formula or plain value)
    pub fn set_input(&mut self, address: &str, raw: &str) -> Result<()> {
        let coord = CellCoordinate::parse(address)?;
        self.set_input_at(coord, raw);
        Ok(())
    }

    /// Store raw input at a coordinate (formula or plain value)
    pub fn set_input_at(&mut self, coord: CellCoordinate, raw: &str) {
        match CellContent::from_input(raw) {
            CellContent::Formula(text) => {
                self.formulas.insert(coord, text);
            }
            CellContent::Value(value) => self.set_value_at(coord, value),
        }
    }

    /// Overwrite the displayed value without touching the formula store
    pub fn set_displayed_at(&mut self, coord: CellCoordinate, value: Value) {
        self.put_value(coord, value);
    }

    /// Remove value and formula from a cell
    pub fn clear_at(&mut self, coord: CellCoordinate) {
        self.values.remove(&coord);
        self.formulas.remove(coord);
    }

    /// Smallest range containing every non-blank value and every formula
    pub fn used_range(&self) -> Option<CellRange> {
        let mut coords = self
            .values
            .keys()
            .copied()
            .chain(self.formulas.entries().into_iter().map(|e| e.coord));

        let first = coords.next()?;
        let (mut min, mut max) = (first, first);
        for c in coords {
            min = CellCoordinate::new(min.col.min(c.col), min.row.min(c.row));
            max = CellCoordinate::new(max.col.max(c.col), max.row.max(c.row));
        }
        Some(CellRange::new(min, max))
    }

    fn put_value(&mut self, coord: CellCoordinate, value: Value) {
        if value.is_blank() {
            self.values.remove(&coord);
        } else {
            self.values.insert(coord, value);
        }
    }
}

impl CellProvider for Sheet {
    fn cell(&self, coord: CellCoordinate) -> CellContent {
        match self.formulas.get(coord) {
            Some(text) => CellContent::Formula(text.to_string()),
            None => CellContent::Value(self.value_at(coord).clone()),
        }
    }
}
