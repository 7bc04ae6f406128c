//! Conditional aggregation functions
//!
//! These are deliberately simple: `COUNTIF` compares each value for exact
//! equality with the last argument, while `SUMIF` and `AVERAGEIF` do not
//! look at a criteria argument at all and aggregate every number they are
//! given (including a numeric criteria).

use super::math::mean;
use super::{num_result, numbers, FunctionContext};
use gridcalc_core::Value;

/// COUNTIF function: count of preceding arguments equal to the last one
///
/// Equality is strict: the number `1` does not match the text `"1"`.
pub fn fn_countif(args: &[Value], _ctx: &FunctionContext) -> Value {
    let Some((criteria, values)) = args.split_last() else {
        return Value::Number(0.0);
    };
    let count = values.iter().filter(|v| *v == criteria).count();
    Value::Number(count as f64)
}

/// SUMIF function: sum of every number argument
pub fn fn_sumif(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(numbers(args).sum())
}

/// AVERAGEIF function: mean of every number argument, `0` when there are none
pub fn fn_averageif(args: &[Value], _ctx: &FunctionContext) -> Value {
    num_result(mean(args).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> FunctionContext {
        FunctionContext::new()
    }

    #[test]
    fn test_countif_strict_equality() {
        let args = vec![
            Value::text("a"),
            Value::text("b"),
            Value::text("a"),
            Value::text("A"),
            Value::text("a"),
        ];
        assert_eq!(fn_countif(&args, &ctx()), Value::Number(2.0));

        let args = vec![Value::Number(1.0), Value::text("1"), Value::Number(1.0)];
        assert_eq!(fn_countif(&args, &ctx()), Value::Number(1.0));

        assert_eq!(fn_countif(&[], &ctx()), Value::Number(0.0));
        assert_eq!(fn_countif(&[Value::Number(1.0)], &ctx()), Value::Number(0.0));
    }

    #[test]
    fn test_sumif_ignores_criteria() {
        let args = vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
            Value::text(">1"),
        ];
        assert_eq!(fn_sumif(&args, &ctx()), Value::Number(6.0));

        // A numeric criteria is summed too
        let args = vec![Value::Number(1.0), Value::Number(2.0), Value::Number(10.0)];
        assert_eq!(fn_sumif(&args, &ctx()), Value::Number(13.0));
    }

    #[test]
    fn test_averageif_ignores_criteria() {
        let args = vec![Value::Number(2.0), Value::Number(4.0), Value::text(">3")];
        assert_eq!(fn_averageif(&args, &ctx()), Value::Number(3.0));
        assert_eq!(fn_averageif(&[Value::text("x")], &ctx()), Value::Number(0.0));
    }
}
