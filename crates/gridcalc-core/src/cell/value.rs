//! Cell value types

use std::fmt;

/// A resolved scalar: what a cell holds or what a formula produces
///
/// `Blank` stands for "no value at that cell". Formula results are never
/// `Blank`; the evaluator turns an empty result into `Text("")`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Empty cell
    #[default]
    Blank,
    /// Numeric value
    Number(f64),
    /// Text value (also carries the reserved `#...` error markers)
    Text(String),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Interpret raw user input the way the grid does when a plain value is committed
    ///
    /// Empty input is blank, numeric input becomes a number, anything else is text.
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Blank;
        }
        match parse_number(trimmed) {
            Some(n) => Value::Number(n),
            None => Value::Text(raw.to_string()),
        }
    }

    /// Check if the cell is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Blank)
    }

    /// Check if this is a number
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Check if this is text
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Check if this is raw formula text (a string starting with '=')
    pub fn is_formula(&self) -> bool {
        matches!(self, Value::Text(s) if s.starts_with('='))
    }

    /// Try to get the value as a number without lossy fallbacks
    ///
    /// Numeric text counts; blank and non-numeric text do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_number(s.trim()),
            Value::Blank => None,
        }
    }

    /// Numeric coercion: anything that is not a number degrades to `0`
    pub fn to_number(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Text coercion: blank degrades to `""`
    pub fn to_text(&self) -> String {
        match self {
            Value::Blank => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    /// Truthiness: non-zero numbers and non-empty text are true
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Blank => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Blank => "blank",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
        }
    }
}

/// Render a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a finite decimal number; words like `inf` or `NaN` are not numbers here
fn parse_number(s: &str) -> Option<f64> {
    let first = s.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '.' | '-' | '+')) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Blank => Ok(()),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Blank, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::Number(2.5).to_number(), 2.5);
        assert_eq!(Value::text(" 12 ").to_number(), 12.0);
        assert_eq!(Value::text("-3.5").to_number(), -3.5);
        assert_eq!(Value::text("abc").to_number(), 0.0);
        assert_eq!(Value::text("inf").to_number(), 0.0);
        assert_eq!(Value::text("NaN").to_number(), 0.0);
        assert_eq!(Value::Blank.to_number(), 0.0);
        assert_eq!(Value::Blank.as_number(), None);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(Value::Number(3.0).to_text(), "3");
        assert_eq!(Value::Number(3.25).to_text(), "3.25");
        assert_eq!(Value::Number(-0.5).to_text(), "-0.5");
        assert_eq!(Value::Blank.to_text(), "");
        assert_eq!(Value::text("x").to_string(), "x");
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(1.0).is_truthy());
        assert!(Value::Number(-2.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::text("0").is_truthy());
        assert!(!Value::text("").is_truthy());
        assert!(!Value::Blank.is_truthy());
    }

    #[test]
    fn test_from_input() {
        assert_eq!(Value::from_input(""), Value::Blank);
        assert_eq!(Value::from_input("   "), Value::Blank);
        assert_eq!(Value::from_input("42"), Value::Number(42.0));
        assert_eq!(Value::from_input("-1.5"), Value::Number(-1.5));
        assert_eq!(Value::from_input("hello"), Value::text("hello"));
        assert_eq!(Value::from_input("Infinity"), Value::text("Infinity"));
    }

    #[test]
    fn test_is_formula() {
        assert!(Value::text("=SUM(A1:A3)").is_formula());
        assert!(!Value::text("SUM(A1:A3)").is_formula());
        assert!(!Value::Number(1.0).is_formula());
        assert!(!Value::Blank.is_formula());
    }
}
