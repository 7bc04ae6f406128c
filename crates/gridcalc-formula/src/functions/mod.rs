//! Built-in functions
//!
//! Every function is total: it takes already resolved argument values and
//! always returns a value. Uncoercible input degrades to `0` or `""`.

pub mod criteria;
pub mod date;
pub mod financial;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use ahash::AHashMap;
use chrono::{DateTime, Utc};
use gridcalc_core::Value;
use std::fmt;
use std::sync::OnceLock;

/// Function implementation signature
pub type FunctionImpl = fn(&[Value], &FunctionContext) -> Value;

/// Ambient state a function may consult
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionContext {
    /// Clock reading used by `TODAY` and `NOW`, taken once per evaluation
    pub now: DateTime<Utc>,
}

impl FunctionContext {
    /// Context reading the system clock
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    /// Context with a fixed clock
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for FunctionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Function category, used for grouping in listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionCategory {
    Math,
    Logical,
    Text,
    Lookup,
    Statistical,
    Financial,
    Date,
    Conditional,
}

impl FunctionCategory {
    /// All categories in display order
    pub const ALL: [FunctionCategory; 8] = [
        FunctionCategory::Math,
        FunctionCategory::Logical,
        FunctionCategory::Text,
        FunctionCategory::Lookup,
        FunctionCategory::Statistical,
        FunctionCategory::Financial,
        FunctionCategory::Date,
        FunctionCategory::Conditional,
    ];

    /// Human readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionCategory::Math => "Math",
            FunctionCategory::Logical => "Logical",
            FunctionCategory::Text => "Text",
            FunctionCategory::Lookup => "Lookup",
            FunctionCategory::Statistical => "Statistical",
            FunctionCategory::Financial => "Financial",
            FunctionCategory::Date => "Date",
            FunctionCategory::Conditional => "Conditional aggregation",
        }
    }
}

impl fmt::Display for FunctionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Category
    pub category: FunctionCategory,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (result changes between evaluations with the same input)
    pub volatile: bool,
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("volatile", &self.volatile)
            .finish()
    }
}

/// Function registry
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_lookup_functions();
        registry.register_statistical_functions();
        registry.register_financial_functions();
        registry.register_date_functions();
        registry.register_conditional_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_uppercase().as_str())
    }

    /// Check whether a name is registered (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registered names in one category, sorted
    pub fn names_in(&self, category: FunctionCategory) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .functions
            .values()
            .filter(|def| def.category == category)
            .map(|def| def.name)
            .collect();
        names.sort_unstable();
        names
    }

    fn register_all(&mut self, category: FunctionCategory, defs: &[(&'static str, FunctionImpl)]) {
        for &(name, implementation) in defs {
            self.register(FunctionDef {
                name,
                category,
                implementation,
                volatile: false,
            });
        }
    }

    fn register_volatile(
        &mut self,
        category: FunctionCategory,
        name: &'static str,
        implementation: FunctionImpl,
    ) {
        self.register(FunctionDef {
            name,
            category,
            implementation,
            volatile: true,
        });
    }

    fn register_math_functions(&mut self) {
        self.register_all(
            FunctionCategory::Math,
            &[
                ("SUM", math::fn_sum),
                ("AVERAGE", math::fn_average),
                ("COUNT", math::fn_count),
                ("COUNTA", math::fn_counta),
                ("MIN", math::fn_min),
                ("MAX", math::fn_max),
                ("ABS", math::fn_abs),
                ("ROUND", math::fn_round),
                ("ROUNDUP", math::fn_roundup),
                ("ROUNDDOWN", math::fn_rounddown),
                ("FLOOR", math::fn_floor),
                ("CEILING", math::fn_ceiling),
                ("SQRT", math::fn_sqrt),
                ("POWER", math::fn_power),
                ("MOD", math::fn_mod),
                ("LOG", math::fn_log),
                ("LN", math::fn_ln),
                ("EXP", math::fn_exp),
                ("PI", math::fn_pi),
            ],
        );
        self.register_volatile(FunctionCategory::Math, "RAND", math::fn_rand);
    }

    fn register_logical_functions(&mut self) {
        self.register_all(
            FunctionCategory::Logical,
            &[
                ("IF", logical::fn_if),
                ("AND", logical::fn_and),
                ("OR", logical::fn_or),
                ("NOT", logical::fn_not),
                ("TRUE", logical::fn_true),
                ("FALSE", logical::fn_false),
                ("ISNUMBER", logical::fn_isnumber),
                ("ISTEXT", logical::fn_istext),
                ("ISBLANK", logical::fn_isblank),
            ],
        );
    }

    fn register_text_functions(&mut self) {
        self.register_all(
            FunctionCategory::Text,
            &[
                ("CONCAT", text::fn_concat),
                ("CONCATENATE", text::fn_concat),
                ("LEFT", text::fn_left),
                ("RIGHT", text::fn_right),
                ("MID", text::fn_mid),
                ("LEN", text::fn_len),
                ("UPPER", text::fn_upper),
                ("LOWER", text::fn_lower),
                ("PROPER", text::fn_proper),
                ("TRIM", text::fn_trim),
                ("TEXT", text::fn_text),
                ("SUBSTITUTE", text::fn_substitute),
                ("REPT", text::fn_rept),
            ],
        );
    }

    fn register_lookup_functions(&mut self) {
        self.register_all(FunctionCategory::Lookup, &[("VLOOKUP", lookup::fn_vlookup)]);
    }

    fn register_statistical_functions(&mut self) {
        self.register_all(
            FunctionCategory::Statistical,
            &[
                ("STDEV", statistical::fn_stdev),
                ("VAR", statistical::fn_var),
                ("MEDIAN", statistical::fn_median),
            ],
        );
    }

    fn register_financial_functions(&mut self) {
        self.register_all(FunctionCategory::Financial, &[("PMT", financial::fn_pmt)]);
    }

    fn register_date_functions(&mut self) {
        self.register_volatile(FunctionCategory::Date, "TODAY", date::fn_today);
        self.register_volatile(FunctionCategory::Date, "NOW", date::fn_now);
        self.register_all(
            FunctionCategory::Date,
            &[
                ("YEAR", date::fn_year),
                ("MONTH", date::fn_month),
                ("DAY", date::fn_day),
                ("HOUR", date::fn_hour),
                ("MINUTE", date::fn_minute),
                ("SECOND", date::fn_second),
            ],
        );
    }

    fn register_conditional_functions(&mut self) {
        self.register_all(
            FunctionCategory::Conditional,
            &[
                ("COUNTIF", criteria::fn_countif),
                ("SUMIF", criteria::fn_sumif),
                ("AVERAGEIF", criteria::fn_averageif),
            ],
        );
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global function registry (lazily initialized, never mutated)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The process-wide function registry
pub fn registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Sorted names of every registered function
pub fn supported_functions() -> Vec<&'static str> {
    registry().names()
}

// === Argument helpers ===

static BLANK: Value = Value::Blank;

/// Argument at `index`, blank when missing
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&BLANK)
}

/// Numeric argument, or `default` when missing, blank or not numeric
pub(crate) fn number_or(args: &[Value], index: usize, default: f64) -> f64 {
    arg(args, index).as_number().unwrap_or(default)
}

/// Text argument, `""` when missing or blank
pub(crate) fn text_arg(args: &[Value], index: usize) -> String {
    arg(args, index).to_text()
}

/// Only the arguments that are numbers; numeric text does not count
pub(crate) fn numbers(args: &[Value]) -> impl Iterator<Item = f64> + '_ {
    args.iter().filter_map(|v| match v {
        Value::Number(n) => Some(*n),
        _ => None,
    })
}

/// Wrap a numeric result; NaN and infinities degrade to `0`
pub(crate) fn num_result(n: f64) -> Value {
    Value::Number(if n.is_finite() { n } else { 0.0 })
}
