//! Formula evaluator
//!
//! Evaluates formula text against a [`CellProvider`]. Formula cells reached
//! through references are evaluated here, not by the host, so that the chain
//! of cells being evaluated can be tracked and cycles reported as `#CYCLE!`.

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::error::{ErrorSentinel, FormulaError, FormulaResult};
use crate::functions::{registry, FunctionContext};
use crate::options::EvaluatorOptions;
use crate::parser::parse_formula_with;
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use gridcalc_core::{CellContent, CellCoordinate, CellProvider, Value};
use std::cmp::Ordering;

/// Evaluate a formula with default options
///
/// Never fails: errors become `#ERROR!`, cycles become `#CYCLE!` and calls to
/// unknown functions become `#NAME?`.
///
/// # Example
/// ```rust
/// use gridcalc_formula::{evaluate_formula, CellContent, CellCoordinate, Value};
///
/// let cells = |coord: CellCoordinate| match (coord.col, coord.row) {
///     (0, 0) => CellContent::from(10.0),
///     (0, 1) => CellContent::from(32.0),
///     _ => CellContent::blank(),
/// };
///
/// assert_eq!(evaluate_formula("=SUM(A1:A2)", &cells, None), Value::Number(42.0));
/// assert_eq!(evaluate_formula("=NOPE(1)", &cells, None), Value::text("#NAME?"));
/// ```
pub fn evaluate_formula<P>(formula: &str, provider: &P, current: Option<CellCoordinate>) -> Value
where
    P: CellProvider + ?Sized,
{
    Evaluator::default().evaluate(formula, provider, current)
}

/// Formula evaluator
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvaluatorOptions,
    now: Option<DateTime<Utc>>,
}

impl Evaluator {
    /// Create an evaluator with the given options
    pub fn new(options: EvaluatorOptions) -> Self {
        Self { options, now: None }
    }

    /// Options in effect
    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Pin the clock seen by `TODAY` and `NOW`
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Evaluate formula text (one leading `=` is optional)
    ///
    /// `current` is the cell the formula belongs to, if any; a reference back
    /// to it is reported as a cycle.
    pub fn evaluate<P>(&self, formula: &str, provider: &P, current: Option<CellCoordinate>) -> Value
    where
        P: CellProvider + ?Sized,
    {
        match self.try_evaluate(formula, provider, current) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(formula, error = %e, "formula evaluation failed");
                e.sentinel().into()
            }
        }
    }

    /// Evaluate formula text, returning the structured error on failure
    pub fn try_evaluate<P>(
        &self,
        formula: &str,
        provider: &P,
        current: Option<CellCoordinate>,
    ) -> FormulaResult<Value>
    where
        P: CellProvider + ?Sized,
    {
        let ctx = FunctionContext::at(self.now.unwrap_or_else(Utc::now));
        let mut evaluation = Evaluation::new(&self.options, provider, ctx);
        if let Some(cell) = current {
            evaluation.visited.insert(cell);
        }
        evaluation.run(formula).map(displayed)
    }
}

/// A formula result as a host would display it; never blank
fn displayed(value: Value) -> Value {
    match value {
        Value::Blank => Value::text(""),
        v => v,
    }
}

/// State for one top-level evaluation
struct Evaluation<'a, P: ?Sized> {
    options: &'a EvaluatorOptions,
    provider: &'a P,
    ctx: FunctionContext,
    /// Formula cells on the active evaluation chain, plus the current cell
    visited: AHashSet<CellCoordinate>,
    /// Formula cells already evaluated, so shared dependencies run once
    resolved: AHashMap<CellCoordinate, Value>,
    /// Formula cells on the active chain
    depth: usize,
    /// Operators, calls and formula cells currently being evaluated
    stack: usize,
}

impl<'a, P> Evaluation<'a, P>
where
    P: CellProvider + ?Sized,
{
    fn new(options: &'a EvaluatorOptions, provider: &'a P, ctx: FunctionContext) -> Self {
        Self {
            options,
            provider,
            ctx,
            visited: AHashSet::new(),
            resolved: AHashMap::new(),
            depth: 0,
            stack: 0,
        }
    }

    fn run(&mut self, formula: &str) -> FormulaResult<Value> {
        // Parsing recurses too, so it only gets what is left of the budget
        let remaining = self.options.max_recursion.saturating_sub(self.stack);
        let expr = if remaining < self.options.max_nesting {
            let options = EvaluatorOptions {
                max_nesting: remaining,
                ..self.options.clone()
            };
            parse_formula_with(formula, &options).map_err(|e| match e {
                FormulaError::NestingTooDeep(_) => {
                    FormulaError::DepthExceeded(self.options.max_recursion)
                }
                e => e,
            })?
        } else {
            parse_formula_with(formula, self.options)?
        };
        self.eval(&expr)
    }

    /// Claim one level of the evaluation-wide recursion budget
    fn descend(&mut self) -> FormulaResult<()> {
        if self.stack >= self.options.max_recursion {
            tracing::debug!(
                max_recursion = self.options.max_recursion,
                "evaluation nested too deep"
            );
            return Err(FormulaError::DepthExceeded(self.options.max_recursion));
        }
        self.stack += 1;
        Ok(())
    }

    /// Evaluate an expression to a single value
    fn eval(&mut self, expr: &FormulaExpr) -> FormulaResult<Value> {
        let nested = matches!(
            expr,
            FormulaExpr::BinaryOp { .. } | FormulaExpr::Negate(_) | FormulaExpr::Function { .. }
        );
        if !nested {
            return self.eval_node(expr);
        }

        self.descend()?;
        let result = self.eval_node(expr);
        self.stack -= 1;
        result
    }

    fn eval_node(&mut self, expr: &FormulaExpr) -> FormulaResult<Value> {
        match expr {
            FormulaExpr::Number(n) => Ok(Value::Number(*n)),
            FormulaExpr::Text(s) | FormulaExpr::Bare(s) => Ok(Value::Text(s.clone())),
            FormulaExpr::CellRef(coord) => match self.resolve_cell(*coord)? {
                Value::Blank => Ok(Value::Number(0.0)),
                v => Ok(v),
            },
            FormulaExpr::RangeRef(range) => Err(FormulaError::RangeInScalarContext(*range)),
            FormulaExpr::Negate(inner) => Ok(number(-self.eval(inner)?.to_number())),
            FormulaExpr::Function { name, args } => self.call_function(name, args),
            FormulaExpr::BinaryOp { .. } => {
                // Walk the left spine so long chains do not recurse per operator
                let mut spine = Vec::new();
                let mut node = expr;
                while let FormulaExpr::BinaryOp { op, left, right } = node {
                    spine.push((*op, right.as_ref()));
                    node = left.as_ref();
                }

                let mut acc = self.eval(node)?;
                for (op, right) in spine.into_iter().rev() {
                    let rhs = self.eval(right)?;
                    acc = apply_binary(op, &acc, &rhs);
                }
                Ok(acc)
            }
        }
    }

    /// Evaluate one function argument; ranges expand to every cell value
    fn eval_argument(&mut self, expr: &FormulaExpr, out: &mut Vec<Value>) -> FormulaResult<()> {
        match expr {
            FormulaExpr::RangeRef(range) => {
                let cells = range.cell_count();
                let limit = self.options.max_range_cells;
                if cells > limit as u64 {
                    return Err(FormulaError::RangeTooLarge {
                        range: *range,
                        cells,
                        limit,
                    });
                }
                out.reserve(cells as usize);
                for coord in range.cells() {
                    out.push(self.resolve_cell(coord)?);
                }
            }
            // A lone cell keeps blank as blank so ISBLANK and COUNTA can see it
            FormulaExpr::CellRef(coord) => out.push(self.resolve_cell(*coord)?),
            other => out.push(self.eval(other)?),
        }
        Ok(())
    }

    fn call_function(&mut self, name: &str, args: &[FormulaExpr]) -> FormulaResult<Value> {
        let Some(def) = registry().get(name) else {
            tracing::debug!(function = name, "unknown function");
            return Ok(ErrorSentinel::Name.into());
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            self.eval_argument(arg, &mut values)?;
        }

        Ok((def.implementation)(&values, &self.ctx))
    }

    /// Value of a referenced cell, evaluating it first if it holds a formula
    fn resolve_cell(&mut self, coord: CellCoordinate) -> FormulaResult<Value> {
        if self.visited.contains(&coord) {
            tracing::debug!(cell = %coord, "circular reference");
            return Err(FormulaError::CircularReference(coord));
        }
        if let Some(value) = self.resolved.get(&coord) {
            return Ok(value.clone());
        }

        let text = match self.provider.cell(coord) {
            CellContent::Value(value) => {
                tracing::trace!(cell = %coord, value = %value, "resolved cell");
                return Ok(value);
            }
            CellContent::Formula(text) => text,
        };

        if self.depth >= self.options.max_depth {
            tracing::debug!(cell = %coord, max_depth = self.options.max_depth, "formula chain too deep");
            return Err(FormulaError::DepthExceeded(self.options.max_depth));
        }

        self.descend()?;

        tracing::trace!(cell = %coord, formula = %text, "evaluating referenced formula");
        self.visited.insert(coord);
        self.depth += 1;
        let result = self.run(&text);
        self.depth -= 1;
        self.stack -= 1;
        self.visited.remove(&coord);

        let value = match result {
            Ok(value) => displayed(value),
            Err(e) if e.is_cycle() => return Err(e),
            Err(e) => {
                // Contained to the referenced cell
                tracing::debug!(cell = %coord, error = %e, "referenced formula failed");
                ErrorSentinel::Error.into()
            }
        };
        self.resolved.insert(coord, value.clone());
        Ok(value)
    }
}

/// Arithmetic results that are not finite display as `0`
fn number(n: f64) -> Value {
    Value::Number(if n.is_finite() { n } else { 0.0 })
}

fn apply_binary(op: BinaryOperator, left: &Value, right: &Value) -> Value {
    use BinaryOperator::*;

    match op {
        Add => number(left.to_number() + right.to_number()),
        Subtract => number(left.to_number() - right.to_number()),
        Multiply => number(left.to_number() * right.to_number()),
        Divide | Modulo => {
            let divisor = right.to_number();
            if divisor == 0.0 {
                return Value::Number(0.0);
            }
            let dividend = left.to_number();
            number(if op == Divide {
                dividend / divisor
            } else {
                dividend % divisor
            })
        }
        Power => number(left.to_number().powf(right.to_number())),
        Concat => Value::Text(left.to_text() + &right.to_text()),
        And => Value::from(left.is_truthy() && right.is_truthy()),
        Or => Value::from(left.is_truthy() || right.is_truthy()),
        Equal => Value::from(compare(left, right) == Ordering::Equal),
        NotEqual => Value::from(compare(left, right) != Ordering::Equal),
        LessThan => Value::from(compare(left, right) == Ordering::Less),
        LessEqual => Value::from(compare(left, right) != Ordering::Greater),
        GreaterThan => Value::from(compare(left, right) == Ordering::Greater),
        GreaterEqual => Value::from(compare(left, right) != Ordering::Less),
    }
}

/// Numbers (and numeric text) compare numerically; anything else compares as
/// case-insensitive text
fn compare(left: &Value, right: &Value) -> Ordering {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => left
            .to_text()
            .to_lowercase()
            .cmp(&right.to_text().to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ArithmeticMode;
    use ahash::AHashMap;
    use chrono::TimeZone;
    use gridcalc_core::NoCells;
    use pretty_assertions::assert_eq;

    /// Provider over a fixed set of raw inputs
    struct Grid(AHashMap<CellCoordinate, CellContent>);

    impl Grid {
        fn new(cells: &[(&str, &str)]) -> Self {
            Grid(
                cells
                    .iter()
                    .map(|(addr, raw)| {
                        (CellCoordinate::parse(addr).unwrap(), CellContent::from_input(raw))
                    })
                    .collect(),
            )
        }
    }

    impl CellProvider for Grid {
        fn cell(&self, coord: CellCoordinate) -> CellContent {
            self.0.get(&coord).cloned().unwrap_or_else(CellContent::blank)
        }
    }

    fn eval(formula: &str) -> Value {
        evaluate_formula(formula, &NoCells, None)
    }

    fn eval_in(grid: &Grid, formula: &str) -> Value {
        evaluate_formula(formula, grid, None)
    }

    fn eval_precedence(formula: &str) -> Value {
        Evaluator::new(EvaluatorOptions::with_precedence()).evaluate(formula, &NoCells, None)
    }

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_numeric_literals() {
        for n in [0.0, 1.0, 42.0, -7.0, 3.25, -0.5, 1e10, 123456.789] {
            assert_eq!(eval(&format!("={}", n)), num(n), "literal {}", n);
        }
        assert_eq!(eval("=-5"), num(-5.0));
        assert_eq!(eval("7"), num(7.0));
    }

    #[test]
    fn test_arithmetic_compatible_mode() {
        assert_eq!(eval("=2+3*4"), num(20.0));
        assert_eq!(eval("=10-2-3"), num(5.0));
        assert_eq!(eval("=2^3"), num(8.0));
        assert_eq!(eval("=7%3"), num(1.0));
        assert_eq!(eval("=2*(3+4)"), num(14.0));
        assert_eq!(eval("=1-2*3"), num(-3.0));
    }

    #[test]
    fn test_arithmetic_precedence_mode() {
        assert_eq!(eval_precedence("=2+3*4"), num(14.0));
        assert_eq!(eval_precedence("=(2+3)*4"), num(20.0));
        assert_eq!(eval_precedence("=2^3^2"), num(512.0));
        assert_eq!(eval_precedence("=-2^2"), num(4.0));
        assert_eq!(eval_precedence("=1+2>2"), num(1.0));
        assert_eq!(eval_precedence("=1<2&&3<2"), num(0.0));
        assert_eq!(eval_precedence("=\"a\"&1+1"), Value::text("a2"));
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(eval("=5/0"), num(0.0));
        assert_eq!(eval("=5%0"), num(0.0));
        assert_eq!(eval("=5/0+1"), num(1.0));
        assert_eq!(eval("=0^-1"), num(0.0));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("=1>0"), num(1.0));
        assert_eq!(eval("=1<0"), num(0.0));
        assert_eq!(eval("=2>=2"), num(1.0));
        assert_eq!(eval("=2<=1"), num(0.0));
        assert_eq!(eval("=2=2"), num(1.0));
        assert_eq!(eval("=2==2"), num(1.0));
        assert_eq!(eval("=2<>2"), num(0.0));
        assert_eq!(eval("=2!=3"), num(1.0));
        assert_eq!(eval("=\"abc\"=\"ABC\""), num(1.0));
        assert_eq!(eval("=\"10\"=10"), num(1.0));
        assert_eq!(eval("=\"b\">\"a\""), num(1.0));
        // Text never coerces to 0 for comparison
        assert_eq!(eval("=\"yes\"=\"no\""), num(0.0));
        assert_eq!(eval("=\"yes\"<>\"no\""), num(1.0));
    }

    #[test]
    fn test_first_comparison_ends_chain() {
        // (1+1) > 1, the trailing +100 is dropped
        assert_eq!(eval("=1+1>1+100"), num(1.0));
        assert_eq!(eval("=5>3+10"), num(1.0));
        assert_eq!(eval_precedence("=5>3+10"), num(0.0));
    }

    #[test]
    fn test_text_and_bare_words() {
        assert_eq!(eval("=\"hello\""), Value::text("hello"));
        assert_eq!(eval("='x y'"), Value::text("x y"));
        assert_eq!(eval("=hello"), Value::text("hello"));
        assert_eq!(eval("=TRUE"), num(1.0));
        assert_eq!(eval("=\"a\"&\"b\""), Value::text("ab"));
        assert_eq!(eval("="), Value::text(""));
        assert_eq!(eval(""), Value::text(""));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("=SUM(1,2,3)"), num(6.0));
        assert_eq!(eval("=AVERAGE(2,4)"), num(3.0));
        assert_eq!(eval("=COUNT(1,\"x\",2)"), num(2.0));
        assert_eq!(eval("=COUNTA(1,\"\",\"x\")"), num(2.0));
        assert_eq!(eval("=IF(1>0,\"yes\",\"no\")"), Value::text("yes"));
        assert_eq!(eval("=IF(0,\"yes\",\"no\")"), Value::text("no"));
        assert_eq!(eval("=ROUND(3.14159,2)"), num(3.14));
        assert_eq!(eval("=ROUNDUP(3.141,2)"), num(3.15));
        assert_eq!(eval("=ROUNDDOWN(3.149,2)"), num(3.14));
        assert_eq!(eval("=sum(1,2)"), num(3.0));
        assert_eq!(eval("=SUM(1,,2)"), num(3.0));
        assert_eq!(eval("=SUM(1+1,MAX(3,4)*2)"), num(10.0));
        assert_eq!(eval("=UPPER(CONCAT(\"a\",LEFT(\"bcd\",2)))"), Value::text("ABC"));
        assert_eq!(eval("=SUM(1,2)*2"), num(6.0));
        assert_eq!(eval("=-ABS(-3)"), num(-3.0));
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        assert_eq!(eval("=UNKNOWNFN()"), Value::text("#NAME?"));
        assert_eq!(eval("=UNKNOWNFN(1,2)"), Value::text("#NAME?"));
        // Arguments of an unknown function are never evaluated
        assert_eq!(eval("=UNKNOWNFN(A1:B2)"), Value::text("#NAME?"));
        // Nested: the sentinel is just text to the outer call
        assert_eq!(eval("=LEN(NOPE())"), num(6.0));
    }

    #[test]
    fn test_malformed_formulas_are_errors() {
        assert_eq!(eval("=(1+2"), Value::text("#ERROR!"));
        assert_eq!(eval("=SUM(1,2"), Value::text("#ERROR!"));
        assert_eq!(eval("=1 2"), Value::text("#ERROR!"));
        assert_eq!(eval("=*3"), Value::text("#ERROR!"));
        assert_eq!(eval("=A1:B2"), Value::text("#ERROR!"));
        assert_eq!(eval("=A1:B2+1"), Value::text("#ERROR!"));
    }

    #[test]
    fn test_vlookup_stub_and_conditionals() {
        let grid = Grid::new(&[("A1", "apple"), ("A2", "pear"), ("B1", "3"), ("B2", "4")]);
        assert_eq!(eval_in(&grid, "=VLOOKUP(\"pear\",A1:B2,2)"), Value::text("pear"));
        assert_eq!(eval_in(&grid, "=VLOOKUP(5,A1:B2,2,FALSE)"), num(5.0));
        assert_eq!(eval_in(&grid, "=SUMIF(B1:B2,\">3\")"), num(7.0));
        assert_eq!(eval_in(&grid, "=COUNTIF(A1:A2,\"pear\")"), num(1.0));
    }

    #[test]
    fn test_cell_references() {
        let grid = Grid::new(&[("A1", "10"), ("A2", "hello"), ("B1", "2.5")]);
        assert_eq!(eval_in(&grid, "=A1"), num(10.0));
        assert_eq!(eval_in(&grid, "=a1*b1"), num(25.0));
        assert_eq!(eval_in(&grid, "=A2"), Value::text("hello"));
        // Blank cells are 0 in scalar context
        assert_eq!(eval_in(&grid, "=C9"), num(0.0));
        assert_eq!(eval_in(&grid, "=C9+1"), num(1.0));
        // ...but blank as function arguments
        assert_eq!(eval_in(&grid, "=ISBLANK(C9)"), num(1.0));
        assert_eq!(eval_in(&grid, "=ISBLANK(A1)"), num(0.0));
    }

    #[test]
    fn test_ranges() {
        let grid = Grid::new(&[
            ("A1", "1"),
            ("B1", "2"),
            ("A2", "3"),
            ("B2", "4"),
            ("A3", "text"),
        ]);
        assert_eq!(eval_in(&grid, "=SUM(A1:B2)"), num(10.0));
        assert_eq!(eval_in(&grid, "=SUM(B2:A1)"), num(10.0));
        assert_eq!(eval_in(&grid, "=COUNT(A1:B3)"), num(4.0));
        assert_eq!(eval_in(&grid, "=COUNTA(A1:B3)"), num(5.0));
        // Row-major order
        assert_eq!(eval_in(&grid, "=CONCAT(A1:B2)"), Value::text("1234"));
        assert_eq!(eval_in(&grid, "=SUM(A1:A2,B1:B2,100)"), num(110.0));
    }

    #[test]
    fn test_range_size_limit() {
        let options = EvaluatorOptions {
            max_range_cells: 4,
            ..Default::default()
        };
        let evaluator = Evaluator::new(options);
        assert_eq!(evaluator.evaluate("=SUM(A1:B2)", &NoCells, None), num(0.0));
        assert_eq!(
            evaluator.evaluate("=SUM(A1:C2)", &NoCells, None),
            Value::text("#ERROR!")
        );
        assert!(matches!(
            evaluator.try_evaluate("=SUM(A1:C2)", &NoCells, None),
            Err(FormulaError::RangeTooLarge { cells: 6, limit: 4, .. })
        ));
    }

    #[test]
    fn test_cross_cell_recursion() {
        let grid = Grid::new(&[
            ("A1", "5"),
            ("A2", "=A1*2"),
            ("A3", "=A2+A1"),
            ("A4", "=SUM(A1:A3)"),
        ]);
        assert_eq!(eval_in(&grid, "=A3"), num(15.0));
        assert_eq!(eval_in(&grid, "=A4"), num(30.0));
        // Shared dependencies are not cycles
        assert_eq!(eval_in(&grid, "=A2+A2+A3"), num(35.0));
    }

    #[test]
    fn test_cycle_detection() {
        let grid = Grid::new(&[("A1", "=B1"), ("B1", "=A1")]);
        assert_eq!(eval_in(&grid, "=A1"), Value::text("#CYCLE!"));
        assert_eq!(
            evaluate_formula("=B1", &grid, Some(CellCoordinate::new(0, 0))),
            Value::text("#CYCLE!")
        );
        assert!(matches!(
            Evaluator::default().try_evaluate("=A1+1", &grid, None),
            Err(FormulaError::CircularReference(_))
        ));

        // Cycles surface through functions and ranges as well
        let grid = Grid::new(&[("A1", "1"), ("A2", "=SUM(A1:A3)"), ("A3", "=A2")]);
        assert_eq!(eval_in(&grid, "=A3"), Value::text("#CYCLE!"));
        assert_eq!(eval_in(&grid, "=IF(1,1,A2)"), Value::text("#CYCLE!"));
    }

    #[test]
    fn test_self_reference_from_current_cell() {
        let grid = Grid::new(&[("A1", "5")]);
        let current = Some(CellCoordinate::new(0, 0));
        assert_eq!(evaluate_formula("=A1+1", &grid, current), Value::text("#CYCLE!"));
        assert_eq!(evaluate_formula("=A1+1", &grid, None), num(6.0));
        assert_eq!(evaluate_formula("=SUM(A1:B2)", &grid, current), Value::text("#CYCLE!"));
    }

    #[test]
    fn test_depth_limit() {
        // A1 = A2 + 1, A2 = A3 + 1, ..., A20 = 0
        let mut cells: Vec<(String, String)> = (1..20)
            .map(|i| (format!("A{}", i), format!("=A{}+1", i + 1)))
            .collect();
        cells.push(("A20".into(), "0".into()));
        let refs: Vec<(&str, &str)> = cells.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let grid = Grid::new(&refs);

        assert_eq!(eval_in(&grid, "=A1"), num(19.0));

        let shallow = Evaluator::new(EvaluatorOptions {
            max_depth: 5,
            ..Default::default()
        });
        assert_eq!(shallow.evaluate("=A1", &grid, None), Value::text("#CYCLE!"));
        assert_eq!(shallow.evaluate("=A16", &grid, None), num(4.0));
    }

    #[test]
    fn test_errors_in_referenced_cells_stay_local() {
        let grid = Grid::new(&[("A1", "=(1+"), ("A2", "=NOPE()"), ("A3", "=A1")]);
        assert_eq!(eval_in(&grid, "=A1"), Value::text("#ERROR!"));
        assert_eq!(eval_in(&grid, "=A3"), Value::text("#ERROR!"));
        assert_eq!(eval_in(&grid, "=LEN(A1)"), num(7.0));
        assert_eq!(eval_in(&grid, "=A2"), Value::text("#NAME?"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("={}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval(&deep), Value::text("#ERROR!"));
        let ok = format!("={}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&ok), num(1.0));
    }

    #[test]
    fn test_long_chains() {
        let formula = format!("=1{}", "+1".repeat(2000));
        assert_eq!(eval(&formula), num(2001.0));
        assert_eq!(eval(&format!("={}5", "-".repeat(1001))), num(-5.0));
    }

    /// `A1` through `A{count}` each hold `formula(next)`, and the cell after
    /// the last holds `1`
    fn chain(count: usize, formula: impl Fn(usize) -> String) -> Grid {
        let mut cells: Vec<(String, String)> = (1..=count)
            .map(|i| (format!("A{}", i), formula(i + 1)))
            .collect();
        cells.push((format!("A{}", count + 1), "1".into()));
        let refs: Vec<(&str, &str)> = cells.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        Grid::new(&refs)
    }

    fn nested_abs(levels: usize, inner: &str) -> String {
        format!("={}{}{}", "ABS(".repeat(levels), inner, ")".repeat(levels))
    }

    /// Runs on a thread with a small stack, the way a host worker might
    fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_recursion_budget_spans_cells() {
        // Every cell is within the nesting limit, and the chain within
        // max_depth, but together they are far too deep
        let grid = chain(127, |next| nested_abs(60, &format!("A{}", next)));
        let result = on_small_stack(move || {
            let value = evaluate_formula("=A1", &grid, None);
            let error = Evaluator::default().try_evaluate("=A1", &grid, None);
            (value, matches!(error, Err(FormulaError::DepthExceeded(512))))
        });
        assert_eq!(result, (Value::text("#CYCLE!"), true));

        // A short chain of the same cells fits
        let grid = chain(5, |next| nested_abs(60, &format!("A{}", next)));
        assert_eq!(eval_in(&grid, "=A1"), num(1.0));
    }

    #[test]
    fn test_chain_at_max_depth_on_small_stack() {
        let results = on_small_stack(|| {
            let bare = chain(128, |next| format!("=A{}", next));
            let summed = chain(128, |next| format!("=A{}+1", next));
            let too_long = chain(129, |next| format!("=A{}", next));
            let nested = chain(20, |next| nested_abs(10, &format!("A{}", next)));
            [
                eval_in(&bare, "=A1"),
                eval_in(&summed, "=A1"),
                eval_in(&too_long, "=A1"),
                eval_in(&nested, "=A1"),
            ]
        });
        assert_eq!(
            results,
            [num(1.0), num(129.0), Value::text("#CYCLE!"), num(1.0)]
        );
    }

    #[test]
    fn test_recursion_budget_option() {
        let grid = chain(10, |next| format!("=A{}+1", next));
        let tight = Evaluator::new(EvaluatorOptions {
            max_recursion: 8,
            ..Default::default()
        });
        assert_eq!(tight.evaluate("=A1", &grid, None), Value::text("#CYCLE!"));
        assert_eq!(tight.evaluate("=A8", &grid, None), num(4.0));
        assert_eq!(eval_in(&grid, "=A1"), num(11.0));

        // The parser only gets what is left of the budget
        let grid = Grid::new(&[("A1", "=((((2))))")]);
        assert_eq!(tight.evaluate("=A1", &grid, None), num(2.0));
        assert_eq!(
            tight.evaluate("=ABS(ABS(ABS(ABS(A1))))", &grid, None),
            Value::text("#CYCLE!")
        );
    }

    #[test]
    fn test_shared_dependencies_evaluated_once() {
        // Without reuse this is 2^40 evaluations of A41
        let grid = chain(40, |next| format!("=A{}+A{}", next, next));
        assert_eq!(eval_in(&grid, "=A1"), num(1099511627776.0));

        // Reuse does not hide a reference back to the current cell
        let grid = Grid::new(&[("A1", "=B1+B1"), ("B1", "=C1"), ("C1", "7")]);
        assert_eq!(eval_in(&grid, "=A1"), num(14.0));
        assert_eq!(eval_in(&grid, "=B1+A1+B1"), num(28.0));
        assert_eq!(
            evaluate_formula("=A1+B1", &grid, Some(CellCoordinate::new(1, 0))),
            Value::text("#CYCLE!")
        );
    }

    #[test]
    fn test_references_outside_the_grid_are_errors() {
        assert_eq!(eval("=XFE1+1"), Value::text("#ERROR!"));
        assert_eq!(eval("=A1048577"), Value::text("#ERROR!"));
        assert_eq!(eval("=SUM(A1:XFE1)"), Value::text("#ERROR!"));
        assert_eq!(eval("=A0"), Value::text("#ERROR!"));
        assert_eq!(eval("=XFD1048576"), num(0.0));
        assert!(matches!(
            Evaluator::default().try_evaluate("=XFE1", &NoCells, None),
            Err(FormulaError::InvalidReference(_))
        ));

        let grid = Grid::new(&[("A1", "=XFE1"), ("A2", "=A1&\"!\"")]);
        assert_eq!(eval_in(&grid, "=A2"), Value::text("#ERROR!!"));
    }

    #[test]
    fn test_clock_functions_use_pinned_time() {
        let now = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let evaluator = Evaluator::default().with_now(now);
        assert_eq!(
            evaluator.evaluate("=TODAY()", &NoCells, None),
            Value::text("2030-01-02")
        );
        assert_eq!(evaluator.evaluate("=YEAR(NOW())", &NoCells, None), num(2030.0));
    }

    #[test]
    fn test_options_accessor() {
        let evaluator = Evaluator::new(EvaluatorOptions::with_precedence());
        assert_eq!(evaluator.options().arithmetic, ArithmeticMode::Precedence);
    }
}
