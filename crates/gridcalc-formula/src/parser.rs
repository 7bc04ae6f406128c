//! Formula parser
//!
//! A recursive descent parser over the tokenizer's output. Arithmetic chains
//! are reduced according to [`ArithmeticMode`]: either one flat left-to-right
//! fold, or conventional operator precedence.

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::error::{FormulaError, FormulaResult};
use crate::options::{ArithmeticMode, EvaluatorOptions};
use crate::tokenizer::{tokenize, Token, TokenKind};
use gridcalc_core::{CellCoordinate, CellRange};
use lazy_regex::regex_is_match;

/// Parse a formula string into an AST with default options
///
/// A single leading `=` is stripped. An empty formula parses to empty text.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    parse_formula_with(formula, &EvaluatorOptions::default())
}

/// Parse a formula string into an AST
pub fn parse_formula_with(formula: &str, options: &EvaluatorOptions) -> FormulaResult<FormulaExpr> {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    parse_tokens(&tokenize(body), options)
}

/// Parse an already tokenized formula body
pub fn parse_tokens(tokens: &[Token], options: &EvaluatorOptions) -> FormulaResult<FormulaExpr> {
    if tokens.is_empty() {
        return Ok(FormulaExpr::Text(String::new()));
    }

    let mut parser = FormulaParser::new(tokens, options);
    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if let Some(extra) = parser.peek() {
        return Err(FormulaError::Parse(format!(
            "Unexpected '{}' after expression",
            extra
        )));
    }

    Ok(expr)
}

/// Formula parser
struct FormulaParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    mode: ArithmeticMode,
    depth: usize,
    max_nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(tokens: &'a [Token], options: &EvaluatorOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            mode: options.arithmetic,
            depth: 0,
            max_nesting: options.max_nesting,
        }
    }

    // === Token access ===

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek_operator(&self) -> Option<&'a str> {
        self.peek()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(Token::as_str)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        self.peek_operator().and_then(BinaryOperator::from_token)
    }

    fn expect_operator(&mut self, expected: &str) -> FormulaResult<()> {
        match self.advance() {
            Some(t) if t.is_operator(expected) => Ok(()),
            Some(t) => Err(FormulaError::Parse(format!(
                "Expected '{}', got '{}'",
                expected, t
            ))),
            None => Err(FormulaError::Parse(format!(
                "Expected '{}', got end of formula",
                expected
            ))),
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > self.max_nesting {
            return Err(FormulaError::NestingTooDeep(self.max_nesting));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Expressions ===

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        match self.mode {
            ArithmeticMode::Compatible => self.parse_fold(),
            ArithmeticMode::Precedence => self.parse_logical(),
        }
    }

    /// Compatible mode: every binary operator has the same precedence and the
    /// chain is folded left to right. The first comparison ends the fold; any
    /// operators after the compared operand are parsed and dropped.
    fn parse_fold(&mut self) -> FormulaResult<FormulaExpr> {
        let mut acc = self.parse_unary()?;

        while let Some(op) = self.peek_binary_operator() {
            self.pos += 1;
            let operand = self.parse_unary()?;
            acc = FormulaExpr::binary(op, acc, operand);

            if op.is_comparison() {
                while self.peek_binary_operator().is_some() {
                    self.pos += 1;
                    self.parse_unary()?;
                }
                break;
            }
        }

        Ok(acc)
    }

    // Precedence mode, lowest to highest:
    // 1. Logical: &&, ||
    // 2. Comparison: =, ==, <>, !=, <, <=, >, >=
    // 3. Concatenation: &
    // 4. Addition/Subtraction: +, -
    // 5. Multiplication/Division/Modulo: *, /, %
    // 6. Exponentiation: ^ (right associative)
    // 7. Unary: -, +
    // 8. Primary: literals, references, function calls, parentheses

    fn parse_logical(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_level(1, Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_level(2, Self::parse_concatenation)
    }

    fn parse_concatenation(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_level(3, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_level(4, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_level(5, Self::parse_exponent)
    }

    /// One left-associative precedence level
    fn parse_level(
        &mut self,
        precedence: u8,
        next: fn(&mut Self) -> FormulaResult<FormulaExpr>,
    ) -> FormulaResult<FormulaExpr> {
        let mut left = next(self)?;

        while let Some(op) = self.peek_binary_operator() {
            if op.precedence() != precedence {
                break;
            }
            self.pos += 1;
            let right = next(self)?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_unary()?;

        if self.peek_binary_operator() == Some(BinaryOperator::Power) {
            self.pos += 1;
            self.enter()?;
            let right = self.parse_exponent()?; // Right associative
            self.leave();
            return Ok(FormulaExpr::binary(BinaryOperator::Power, left, right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let mut negate = false;
        while let Some(op) = self.peek_operator() {
            match op {
                "-" => negate = !negate,
                "+" => {}
                _ => break,
            }
            self.pos += 1;
        }

        let expr = self.parse_primary()?;
        Ok(match (negate, expr) {
            (false, expr) => expr,
            (true, FormulaExpr::Number(n)) => FormulaExpr::Number(-n),
            (true, expr) => FormulaExpr::Negate(Box::new(expr)),
        })
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        let token = self
            .advance()
            .ok_or_else(|| FormulaError::Parse("Unexpected end of formula".into()))?;

        match token.kind {
            TokenKind::Text => Ok(FormulaExpr::Text(token.unquoted().to_string())),
            TokenKind::Word => self.parse_word(&token.text),
            TokenKind::Operator if token.text == "(" => {
                self.enter()?;
                let expr = self.parse_expression()?;
                self.expect_operator(")")?;
                self.leave();
                Ok(expr)
            }
            TokenKind::Operator => Err(FormulaError::Parse(format!(
                "Unexpected '{}'",
                token.text
            ))),
        }
    }

    fn parse_word(&mut self, word: &str) -> FormulaResult<FormulaExpr> {
        // A word directly followed by '(' is a call, even if it looks like a
        // cell reference (LOG10 is a function, not a cell)
        if self.peek_operator() == Some("(") {
            self.pos += 1;
            self.enter()?;
            let args = self.parse_arguments()?;
            self.leave();
            return Ok(FormulaExpr::Function {
                name: word.to_uppercase(),
                args,
            });
        }

        if is_reference(word) {
            let start = cell_reference(word)?;
            if self.peek_operator() != Some(":") {
                return Ok(FormulaExpr::CellRef(start));
            }
            self.pos += 1;
            let end = match self.advance() {
                Some(t) if t.kind == TokenKind::Word && is_reference(&t.text) => {
                    cell_reference(&t.text)?
                }
                _ => {
                    return Err(FormulaError::InvalidReference(format!(
                        "incomplete range starting at {}",
                        word
                    )))
                }
            };
            return Ok(FormulaExpr::RangeRef(CellRange::new(start, end)));
        }

        if word.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            if let Some(n) = word.parse::<f64>().ok().filter(|n| n.is_finite()) {
                return Ok(FormulaExpr::Number(n));
            }
        }

        if word.eq_ignore_ascii_case("TRUE") {
            return Ok(FormulaExpr::Number(1.0));
        }
        if word.eq_ignore_ascii_case("FALSE") {
            return Ok(FormulaExpr::Number(0.0));
        }

        Ok(FormulaExpr::Bare(word.to_string()))
    }

    /// Arguments after the opening parenthesis, split on top-level commas.
    /// Empty slots (`SUM(1,,2)`) contribute nothing.
    fn parse_arguments(&mut self) -> FormulaResult<Vec<FormulaExpr>> {
        let mut args = Vec::new();

        loop {
            match self.peek_operator() {
                Some(")") => {
                    self.pos += 1;
                    return Ok(args);
                }
                Some(",") => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            if self.peek().is_none() {
                return Err(FormulaError::Parse("Missing ')' after arguments".into()));
            }

            args.push(self.parse_expression()?);

            match self.peek_operator() {
                Some(",") | Some(")") => {}
                _ => {
                    return Err(FormulaError::Parse(match self.peek() {
                        Some(t) => format!("Expected ',' or ')', got '{}'", t),
                        None => "Missing ')' after arguments".into(),
                    }))
                }
            }
        }
    }
}

/// Letters followed by digits, whether or not it lands inside the grid
fn is_reference(word: &str) -> bool {
    regex_is_match!(r"^[A-Za-z]+[0-9]+$", word)
}

/// A reference-shaped word past column XFD, past the last row or at row 0
/// is an error rather than a bare word
fn cell_reference(word: &str) -> FormulaResult<CellCoordinate> {
    CellCoordinate::parse(word)
        .map_err(|e| FormulaError::InvalidReference(format!("{}: {}", word, e)))
}
