//! Math functions

use super::{num_result, number_or, numbers, FunctionContext};
use gridcalc_core::Value;
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Digits argument accepted by the ROUND family
const MAX_ROUND_DIGITS: i64 = 15;

/// SUM function: adds the number arguments, ignoring text and blanks
pub fn fn_sum(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(numbers(args).sum())
}

/// AVERAGE function; `0` when there are no numbers
pub fn fn_average(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(mean(args).unwrap_or(0.0))
}

pub(crate) fn mean(args: &[Value]) -> Option<f64> {
    let (sum, count) = numbers(args).fold((0.0, 0usize), |(s, c), n| (s + n, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// COUNT function: number arguments only
pub fn fn_count(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Number(numbers(args).count() as f64)
}

/// COUNTA function: everything except blanks and empty text
pub fn fn_counta(args: &[Value], _ctx: &FunctionContext) -> Value {
    let count = args
        .iter()
        .filter(|v| match v {
            Value::Blank => false,
            Value::Text(s) => !s.is_empty(),
            Value::Number(_) => true,
        })
        .count();
    Value::Number(count as f64)
}

/// MIN function; `0` when there are no numbers
pub fn fn_min(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(numbers(args).reduce(f64::min).unwrap_or(0.0))
}

/// MAX function; `0` when there are no numbers
pub fn fn_max(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(numbers(args).reduce(f64::max).unwrap_or(0.0))
}

/// ABS function
pub fn fn_abs(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).abs())
}

/// ROUND function: halves round towards positive infinity
pub fn fn_round(args: &[Value], _ctx: &FunctionContext) -> Value {
    let n = number_or(args, 0, 0.0);
    let strategy = if n < 0.0 {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    round_with(n, round_digits(args), strategy)
}

/// ROUNDUP function: towards positive infinity at the given digit
pub fn fn_roundup(args: &[Value], _ctx: &FunctionContext) -> Value {
    let n = number_or(args, 0, 0.0);
    round_with(n, round_digits(args), RoundingStrategy::ToPositiveInfinity)
}

/// ROUNDDOWN function: towards negative infinity at the given digit
pub fn fn_rounddown(args: &[Value], _ctx: &FunctionContext) -> Value {
    let n = number_or(args, 0, 0.0);
    round_with(n, round_digits(args), RoundingStrategy::ToNegativeInfinity)
}

fn round_digits(args: &[Value]) -> i64 {
    let digits = number_or(args, 1, 0.0).trunc();
    (digits as i64).clamp(-MAX_ROUND_DIGITS, MAX_ROUND_DIGITS)
}

/// Round in decimal so that `3.145` is treated as written, not as its binary neighbour
fn round_with(n: f64, digits: i64, strategy: RoundingStrategy) -> Value {
    let rounded = Decimal::from_f64(n).and_then(|d| {
        if digits >= 0 {
            Some(d.round_dp_with_strategy(digits as u32, strategy))
        } else {
            let scale = Decimal::from(10u64.pow(digits.unsigned_abs() as u32));
            d.checked_div(scale)
                .map(|q| q.round_dp_with_strategy(0, strategy))
                .and_then(|q| q.checked_mul(scale))
        }
    });

    match rounded.and_then(|d| d.to_f64()) {
        Some(r) => num_result(r),
        // Outside the decimal range: already far beyond any representable fraction
        None => num_result(n),
    }
}

/// FLOOR function: round down to an integer
pub fn fn_floor(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).floor())
}

/// CEILING function: round up to an integer
pub fn fn_ceiling(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).ceil())
}

/// SQRT function; negative input gives `0`
pub fn fn_sqrt(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).sqrt())
}

/// POWER function; a missing exponent means `1`
pub fn fn_power(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).powf(number_or(args, 1, 1.0)))
}

/// MOD function: remainder with the sign of the dividend; a missing divisor means `1`
pub fn fn_mod(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0) % number_or(args, 1, 1.0))
}

/// LOG function: base-10 logarithm; a missing argument means `1`
pub fn fn_log(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 1.0).log10())
}

/// LN function: natural logarithm; a missing argument means `1`
pub fn fn_ln(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 1.0).ln())
}

/// EXP function
pub fn fn_exp(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(number_or(args, 0, 0.0).exp())
}

/// PI function
pub fn fn_pi(_args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Number(std::f64::consts::PI)
}

/// RAND function: uniform in `[0, 1)`
pub fn fn_rand(_args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Number(rand::thread_rng().gen::<f64>())
}
