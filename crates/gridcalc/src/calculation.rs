//! Sheet calculation
//!
//! Host-side behavior around the evaluator: committing formula-bar input into
//! a cell and recalculating every stored formula.
//!
//! There is no dependency tracking. Committing a value does not refresh the
//! formula cells that read it; call [`SheetCalculationExt::calculate`] for that.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_value("A1", 10.0).unwrap();
//! sheet.set_formula("A2", "=A1*2").unwrap();
//! sheet.set_formula("B1", "=B2").unwrap();
//! sheet.set_formula("B2", "=B1").unwrap();
//!
//! let stats = sheet.calculate();
//! assert_eq!(stats.formula_count, 3);
//! assert_eq!(stats.cycles, 2);
//! assert_eq!(sheet.value("A2").unwrap(), Value::Number(20.0));
//! ```

use crate::{CellCoordinate, ErrorSentinel, Evaluator, Result, Sheet, Value};

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of formula cells evaluated
    pub formula_count: usize,
    /// Cells that ended up as `#ERROR!`
    pub errors: usize,
    /// Cells that called an unknown function (`#NAME?`)
    pub unknown_functions: usize,
    /// Cells caught in a reference cycle (`#CYCLE!`)
    pub cycles: usize,
}

impl CalculationStats {
    fn record(&mut self, value: &Value) {
        self.formula_count += 1;
        match ErrorSentinel::from_value(value) {
            Some(ErrorSentinel::Error) => self.errors += 1,
            Some(ErrorSentinel::Name) => self.unknown_functions += 1,
            Some(ErrorSentinel::Cycle) => self.cycles += 1,
            None => {}
        }
    }
}

/// Extension trait for Sheet to add calculation methods
pub trait SheetCalculationExt {
    /// Commit raw input to a cell the way a formula bar does
    ///
    /// Formula input is evaluated with the target as the current cell, stored,
    /// and its result written as the displayed value. Plain input is stored as
    /// a number or text and clears any formula. Returns the displayed value.
    fn commit_input(&mut self, coord: CellCoordinate, raw: &str, evaluator: &Evaluator) -> Value;

    /// [`commit_input`](Self::commit_input) by A1-style address with default options
    fn commit(&mut self, address: &str, raw: &str) -> Result<Value>;

    /// Evaluate the formula stored in a cell without changing anything
    ///
    /// Returns `None` when the cell holds no formula.
    fn evaluate_cell(&self, coord: CellCoordinate, evaluator: &Evaluator) -> Option<Value>;

    /// Evaluate every stored formula once with default options
    fn calculate(&mut self) -> CalculationStats;

    /// Evaluate every stored formula once, in row-major order, and write the
    /// results as displayed values
    fn calculate_with(&mut self, evaluator: &Evaluator) -> CalculationStats;
}

impl SheetCalculationExt for Sheet {
    fn commit_input(&mut self, coord: CellCoordinate, raw: &str, evaluator: &Evaluator) -> Value {
        if !crate::is_formula(raw) {
            self.set_input_at(coord, raw);
            return self.value_at(coord).clone();
        }

        let value = evaluator.evaluate(raw, &*self, Some(coord));
        tracing::debug!(cell = %coord, formula = raw, result = %value, "committed formula");

        self.set_input_at(coord, raw);
        self.set_displayed_at(coord, value.clone());
        value
    }

    fn commit(&mut self, address: &str, raw: &str) -> Result<Value> {
        let coord = CellCoordinate::parse(address)?;
        Ok(self.commit_input(coord, raw, &Evaluator::default()))
    }

    fn evaluate_cell(&self, coord: CellCoordinate, evaluator: &Evaluator) -> Option<Value> {
        let formula = self.formula_at(coord)?;
        Some(evaluator.evaluate(formula, self, Some(coord)))
    }

    fn calculate(&mut self) -> CalculationStats {
        self.calculate_with(&Evaluator::default())
    }

    fn calculate_with(&mut self, evaluator: &Evaluator) -> CalculationStats {
        let mut stats = CalculationStats::default();

        // Formulas are read from the store, never from displayed values, so
        // every result can be computed before any is written back
        let results: Vec<(CellCoordinate, Value)> = self
            .formulas()
            .entries()
            .into_iter()
            .map(|entry| {
                let value = evaluator.evaluate(&entry.text, &*self, Some(entry.coord));
                (entry.coord, value)
            })
            .collect();

        for (coord, value) in results {
            stats.record(&value);
            self.set_displayed_at(coord, value);
        }

        tracing::debug!(
            sheet = self.name(),
            formulas = stats.formula_count,
            errors = stats.errors,
            cycles = stats.cycles,
            "calculated sheet"
        );
        stats
    }
}
