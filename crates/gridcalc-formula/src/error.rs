//! Formula error types

use gridcalc_core::{CellCoordinate, CellRange, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
///
/// None of these escape [`crate::evaluate_formula`]; they are folded into an
/// [`ErrorSentinel`] at the entry point.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reference that cannot be resolved
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A range used where a single value is needed
    #[error("Range {0} cannot be used as a single value")]
    RangeInScalarContext(CellRange),

    /// Range expansion over the configured cell limit
    #[error("Range {range} has {cells} cells (limit: {limit})")]
    RangeTooLarge {
        range: CellRange,
        cells: u64,
        limit: usize,
    },

    /// Parentheses or calls nested deeper than the configured limit
    #[error("Formula nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// A formula cell that (transitively) refers back to itself
    #[error("Circular reference detected involving cell {0}")]
    CircularReference(CellCoordinate),

    /// Chain of formula cells, or total evaluation nesting, past its limit
    #[error("Formula evaluation deeper than {0} levels")]
    DepthExceeded(usize),
}

impl FormulaError {
    /// Cycle-guard errors propagate through nested formula cells; everything
    /// else is contained to the cell that raised it
    pub fn is_cycle(&self) -> bool {
        matches!(
            self,
            FormulaError::CircularReference(_) | FormulaError::DepthExceeded(_)
        )
    }

    /// The sentinel this error is reported as
    pub fn sentinel(&self) -> ErrorSentinel {
        if self.is_cycle() {
            ErrorSentinel::Cycle
        } else {
            ErrorSentinel::Error
        }
    }
}

/// Reserved result strings shown verbatim in the affected cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSentinel {
    /// `#ERROR!` - anything that failed during tokenizing, parsing or evaluation
    Error,
    /// `#NAME?` - call to a function that is not registered
    Name,
    /// `#CYCLE!` - formula cells referring to each other in a loop
    Cycle,
}

impl ErrorSentinel {
    /// The literal string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSentinel::Error => "#ERROR!",
            ErrorSentinel::Name => "#NAME?",
            ErrorSentinel::Cycle => "#CYCLE!",
        }
    }

    /// Recognize a sentinel string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "#ERROR!" => Some(ErrorSentinel::Error),
            "#NAME?" => Some(ErrorSentinel::Name),
            "#CYCLE!" => Some(ErrorSentinel::Cycle),
            _ => None,
        }
    }

    /// Recognize a sentinel held in a value
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Self::parse(s),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorSentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorSentinel {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::parse(s).ok_or_else(|| FormulaError::Parse(format!("'{}' is not an error value", s)))
    }
}

impl From<ErrorSentinel> for Value {
    fn from(sentinel: ErrorSentinel) -> Self {
        Value::text(sentinel.as_str())
    }
}
