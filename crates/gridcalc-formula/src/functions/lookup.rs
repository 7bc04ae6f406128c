//! Lookup functions

use super::{arg, FunctionContext};
use gridcalc_core::Value;

/// VLOOKUP function
///
/// Placeholder implementation: returns the lookup key unchanged (empty text
/// when the key is blank). The table and column arguments are evaluated but
/// not consulted.
pub fn fn_vlookup(args: &[Value], _ctx: &FunctionContext) -> Value {
    match arg(args, 0) {
        Value::Blank => Value::text(""),
        key => key.clone(),
    }
}
