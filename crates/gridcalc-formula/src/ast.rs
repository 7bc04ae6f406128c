//! Formula Abstract Syntax Tree types

use gridcalc_core::{CellCoordinate, CellRange};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// Numeric literal
    Number(f64),
    /// Quoted string literal (delimiters removed)
    Text(String),
    /// Bare word that is neither a reference, a number nor a call; evaluates to itself
    Bare(String),

    // === References ===
    /// Single cell reference
    CellRef(CellCoordinate),
    /// Inclusive range reference
    RangeRef(CellRange),

    // === Operators ===
    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary negation
    Negate(Box<FormulaExpr>),

    // === Function call ===
    Function {
        /// Upper-cased function name
        name: String,
        args: Vec<FormulaExpr>,
    },
}

impl FormulaExpr {
    pub(crate) fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    // Text
    Concat,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    /// Map an operator token to its operator
    ///
    /// `=` and `==` both mean equality; `<>` and `!=` both mean inequality.
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "%" => BinaryOperator::Modulo,
            "^" => BinaryOperator::Power,
            "&" => BinaryOperator::Concat,
            "=" | "==" => BinaryOperator::Equal,
            "<>" | "!=" => BinaryOperator::NotEqual,
            "<" => BinaryOperator::LessThan,
            "<=" => BinaryOperator::LessEqual,
            ">" => BinaryOperator::GreaterThan,
            ">=" => BinaryOperator::GreaterEqual,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Comparison operators produce `1` or `0`
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::LessThan
                | BinaryOperator::LessEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterEqual
        )
    }

    /// Binding strength in precedence mode (higher binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::And | BinaryOperator::Or => 1,
            op if op.is_comparison() => 2,
            BinaryOperator::Concat => 3,
            BinaryOperator::Add | BinaryOperator::Subtract => 4,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 5,
            BinaryOperator::Power => 6,
            _ => 0,
        }
    }
}
