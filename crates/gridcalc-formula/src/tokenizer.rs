//! Formula tokenizer
//!
//! Splits formula text (leading '=' already stripped) into operators, quoted
//! string literals and bare words. Bare words are classified later by the
//! parser: function names, cell references, numbers or plain text.

use std::fmt;

/// Characters that always end a bare word and form an operator token
const OPERATOR_CHARS: &str = "+-*/^%(),:<>=!&|";

/// Two-character operators, matched greedily before single characters
const COMPOUND_OPERATORS: [&str; 7] = [">=", "<=", "<>", "==", "!=", "&&", "||"];

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Operator or punctuation, including the two-character compounds
    Operator,
    /// Quoted string literal; the delimiters are kept in the token text
    Text,
    /// Anything else: function name, cell or range corner, number, word
    Word,
}

/// A single lexical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Token text as written
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True if this is the given operator
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    /// Contents of a string literal without its delimiters
    ///
    /// An unterminated literal keeps everything after the opening quote.
    pub fn unquoted(&self) -> &str {
        let mut chars = self.text.chars();
        let Some(quote) = chars.next() else {
            return "";
        };
        let inner = chars.as_str();
        inner.strip_suffix(quote).unwrap_or(inner)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split formula text into tokens
///
/// Whitespace separates words and is never emitted. String literals run
/// from a `"` or `'` to the next occurrence of the same character; there are
/// no escape sequences, and an unterminated literal runs to the end.
///
/// # Example
/// ```rust
/// use gridcalc_formula::tokenize;
///
/// let tokens: Vec<String> = tokenize("SUM(A1:B2) >= 10")
///     .into_iter()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(tokens, ["SUM", "(", "A1", ":", "B2", ")", ">=", "10"]);
/// ```
pub fn tokenize(formula: &str) -> Vec<Token> {
    let chars: Vec<char> = formula.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '"' || c == '\'' {
            flush_word(&mut word, &mut tokens);
            let mut literal = String::from(c);
            i += 1;
            while i < chars.len() {
                literal.push(chars[i]);
                i += 1;
                if chars[i - 1] == c {
                    break;
                }
            }
            tokens.push(Token::new(TokenKind::Text, literal));
            continue;
        }

        if OPERATOR_CHARS.contains(c) {
            flush_word(&mut word, &mut tokens);
            if let Some(&next) = chars.get(i + 1) {
                let pair: String = [c, next].iter().collect();
                if COMPOUND_OPERATORS.contains(&pair.as_str()) {
                    tokens.push(Token::new(TokenKind::Operator, pair));
                    i += 2;
                    continue;
                }
            }
            tokens.push(Token::new(TokenKind::Operator, c));
        } else if c.is_whitespace() {
            flush_word(&mut word, &mut tokens);
        } else {
            word.push(c);
        }

        i += 1;
    }

    flush_word(&mut word, &mut tokens);
    tracing::trace!(formula, count = tokens.len(), "tokenized formula");
    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if !word.is_empty() {
        tokens.push(Token::new(TokenKind::Word, std::mem::take(word)));
    }
}
