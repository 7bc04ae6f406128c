//! # gridcalc-formula
//!
//! Formula engine for gridcalc.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Parsing (tokens → AST), with a left-to-right compatible mode and a
//!   conventional precedence mode
//! - Evaluation against a host [`CellProvider`], with cycle detection across
//!   formula cells
//! - A fixed registry of built-in functions (~60)
//!
//! Evaluation never fails outwards: problems are reported as the reserved
//! strings `#ERROR!`, `#NAME?` and `#CYCLE!`.
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_formula::{evaluate_formula, NoCells, Value};
//!
//! assert_eq!(evaluate_formula("=SUM(1,2,3)", &NoCells, None), Value::Number(6.0));
//! assert_eq!(evaluate_formula("=2+3*4", &NoCells, None), Value::Number(20.0));
//! assert_eq!(evaluate_formula("=UNKNOWNFN()", &NoCells, None), Value::text("#NAME?"));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod options;
pub mod parser;
pub mod tokenizer;

pub use ast::{BinaryOperator, FormulaExpr};
pub use error::{ErrorSentinel, FormulaError, FormulaResult};
pub use evaluator::{evaluate_formula, Evaluator};
pub use functions::{
    registry, supported_functions, FunctionCategory, FunctionContext, FunctionDef,
    FunctionRegistry,
};
pub use options::{ArithmeticMode, EvaluatorOptions};
pub use parser::{parse_formula, parse_formula_with, parse_tokens};
pub use tokenizer::{tokenize, Token, TokenKind};

pub use gridcalc_core::{is_formula, CellContent, CellCoordinate, CellProvider, NoCells, Value};
