//! # gridcalc
//!
//! An embeddable spreadsheet formula engine.
//!
//! gridcalc evaluates formula text such as `=SUM(A1:B3)*2` against cell data
//! owned by a host. Formula cells may reference other formula cells; those are
//! evaluated on demand, and reference loops are reported as `#CYCLE!` instead
//! of recursing without bound.
//!
//! ## Features
//!
//! - Tokenizer, parser and evaluator with ~60 built-in functions
//! - Left-to-right "compatible" arithmetic or conventional operator precedence
//! - An in-memory [`Sheet`] host with a formula store
//! - Read and write CSV files (`csv` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut sheet = Sheet::new("Sheet1");
//! sheet.set_value("A1", 10.0).unwrap();
//! sheet.set_value("A2", 20.0).unwrap();
//!
//! let evaluator = Evaluator::default();
//! let a3 = CellCoordinate::parse("A3").unwrap();
//! let shown = sheet.commit_input(a3, "=SUM(A1:A2)*2", &evaluator);
//!
//! assert_eq!(shown, Value::Number(60.0));
//! assert_eq!(sheet.formula("A3").unwrap(), Some("=SUM(A1:A2)*2"));
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{CalculationStats, SheetCalculationExt};

// Re-export core types
pub use gridcalc_core::{
    column_to_index, format_number, index_to_column, is_formula, parse_cell_ref, parse_range,
    CellContent, CellCoordinate, CellProvider, CellRange, Error, FormulaEntry, FormulaStore,
    NoCells, Result, Sheet, Value, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate_formula, parse_formula, parse_formula_with, supported_functions, tokenize,
    ArithmeticMode, ErrorSentinel, Evaluator, EvaluatorOptions, FormulaError, FormulaExpr,
    FormulaResult, FunctionCategory, Token, TokenKind,
};

// Re-export CSV types
#[cfg(feature = "csv")]
pub use gridcalc_csv::{
    CsvError, CsvReadOptions, CsvReader, CsvResult, CsvWriteOptions, CsvWriter, LineTerminator,
};

/// Formula engine internals
pub mod formula {
    pub use gridcalc_formula::*;
}
