//! Logical and type-test functions
//!
//! Booleans are numbers: true is `1`, false is `0`.

use super::{arg, FunctionContext};
use gridcalc_core::Value;

/// IF function: a missing branch yields empty text
pub fn fn_if(args: &[Value], _ctx: &FunctionContext) -> Value {
    let branch = if arg(args, 0).is_truthy() {
        arg(args, 1)
    } else {
        arg(args, 2)
    };
    match branch {
        Value::Blank => Value::text(""),
        v => v.clone(),
    }
}

/// AND function: true when every argument is truthy (and for no arguments)
pub fn fn_and(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(args.iter().all(Value::is_truthy))
}

/// OR function: true when any argument is truthy
pub fn fn_or(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(args.iter().any(Value::is_truthy))
}

/// NOT function
pub fn fn_not(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(!arg(args, 0).is_truthy())
}

/// TRUE function
pub fn fn_true(_args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(true)
}

/// FALSE function
pub fn fn_false(_args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(false)
}

/// ISNUMBER function
pub fn fn_isnumber(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(arg(args, 0).is_number())
}

/// ISTEXT function (empty text counts as text)
pub fn fn_istext(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::from(arg(args, 0).is_text())
}

/// ISBLANK function: blank cells and empty text
pub fn fn_isblank(args: &[Value], _ctx: &FunctionContext) -> Value {
    let blank = match arg(args, 0) {
        Value::Blank => true,
        Value::Text(s) => s.is_empty(),
        Value::Number(_) => false,
    };
    Value::from(blank)
}
