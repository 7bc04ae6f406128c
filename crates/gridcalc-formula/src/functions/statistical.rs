//! Statistical functions
//!
//! Only number arguments take part; text and blanks are skipped.

use super::{num_result, numbers, FunctionContext};
use gridcalc_core::Value;

/// Sample variance (divisor `n - 1`); `None` for fewer than two numbers
fn sample_variance(args: &[Value]) -> Option<f64> {
    let nums: Vec<f64> = numbers(args).collect();
    if nums.len() < 2 {
        return None;
    }
    let n = nums.len() as f64;
    let mean = nums.iter().sum::<f64>() / n;
    let squares: f64 = nums.iter().map(|x| (x - mean).powi(2)).sum();
    Some(squares / (n - 1.0))
}

/// STDEV function: sample standard deviation, `0` for fewer than two numbers
pub fn fn_stdev(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(sample_variance(args).map_or(0.0, f64::sqrt))
}

/// VAR function: sample variance, `0` for fewer than two numbers
pub fn fn_var(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(sample_variance(args).unwrap_or(0.0))
}

/// MEDIAN function; `0` when there are no numbers
pub fn fn_median(args: &[Value], _ctx: &FunctionContext) -> Value {
    let mut nums: Vec<f64> = numbers(args).collect();
    if nums.is_empty() {
        return Value::Number(0.0);
    }
    nums.sort_by(|a, b| a.total_cmp(b));

    let mid = nums.len() / 2;
    let median = if nums.len() % 2 == 1 {
        nums[mid]
    } else {
        (nums[mid - 1] + nums[mid]) / 2.0
    };
    num_result(median)
}
