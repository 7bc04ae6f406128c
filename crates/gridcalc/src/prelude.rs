//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation
    CalculationStats,
    // Cells
    CellContent,
    CellCoordinate,
    CellProvider,
    CellRange,
    // Errors
    Error,
    ErrorSentinel,
    // Evaluation
    Evaluator,
    EvaluatorOptions,
    ArithmeticMode,
    Result,
    Sheet,
    SheetCalculationExt,
    Value,
};

#[cfg(feature = "csv")]
pub use crate::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
