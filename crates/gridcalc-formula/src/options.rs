//! Evaluator options

/// How arithmetic and comparison chains are reduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArithmeticMode {
    /// Single left-to-right fold with no operator precedence: `2+3*4` is `20`.
    /// The first comparison ends the chain and compares the running result
    /// with the operand after it.
    ///
    /// Not every quirk of a flat fold is reproduced: parentheses still group,
    /// and non-numeric operands compare as case-insensitive text instead of
    /// both coercing to `0` (`"yes"="no"` is `0`, not `1`).
    #[default]
    Compatible,
    /// Conventional precedence: unary minus, then `^`, then `* / %`, then
    /// `+ -`, then `&`, then comparisons, then `&& ||`. `2+3*4` is `14` and
    /// `-2^2` is `4`.
    Precedence,
}

/// Options for formula evaluation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluatorOptions {
    /// Arithmetic reduction mode (default: compatible)
    pub arithmetic: ArithmeticMode,
    /// Longest chain of formula cells evaluated through references (default: 128)
    pub max_depth: usize,
    /// Deepest parenthesis / call nesting inside one formula (default: 64)
    pub max_nesting: usize,
    /// Largest range a single reference may expand to (default: 1,000,000 cells)
    pub max_range_cells: usize,
    /// Total nesting allowed across one evaluation, counting every operator,
    /// function call and formula cell entered along the way (default: 512).
    /// Exceeding it reports `#CYCLE!` like an over-long cell chain.
    pub max_recursion: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            arithmetic: ArithmeticMode::Compatible,
            max_depth: 128,
            max_nesting: 64,
            max_range_cells: 1_000_000,
            max_recursion: 512,
        }
    }
}

impl EvaluatorOptions {
    /// Options using conventional operator precedence
    pub fn with_precedence() -> Self {
        Self {
            arithmetic: ArithmeticMode::Precedence,
            ..Default::default()
        }
    }
}
