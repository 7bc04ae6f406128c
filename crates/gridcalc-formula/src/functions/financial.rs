//! Financial functions

use super::{num_result, number_or, FunctionContext};
use gridcalc_core::Value;

/// PMT function: periodic payment for a loan of `pv` over `nper` periods
///
/// `rate * pv * (1 + rate)^nper / ((1 + rate)^nper - 1)`, with the sign of
/// `pv`. A zero rate gives `-pv / nper`. A zero or missing `nper` counts as one
/// period.
pub fn fn_pmt(args: &[Value], _ctx: &FunctionContext) -> Value {
    let rate = number_or(args, 0, 0.0);
    let nper = match number_or(args, 1, 1.0) {
        n if n == 0.0 => 1.0,
        n => n,
    };
    let pv = number_or(args, 2, 0.0);

    if rate == 0.0 {
        return num_result(-pv / nper);
    }

    let growth = (1.0 + rate).powf(nper);
    num_result(rate * pv * growth / (growth - 1.0))
}
