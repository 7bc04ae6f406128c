//! Text functions
//!
//! Positions and lengths count characters, not bytes.

use super::{number_or, text_arg, FunctionContext};
use gridcalc_core::{format_number, Value};
use lazy_regex::regex_replace_all;

/// Longest text REPT will build
const MAX_TEXT_LENGTH: usize = 32_767;

/// Character count argument: truncated, negative counts clamp to zero
fn count_arg(args: &[Value], index: usize, default: f64) -> usize {
    number_or(args, index, default).trunc().max(0.0) as usize
}

/// CONCAT / CONCATENATE function
pub fn fn_concat(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Text(args.iter().map(Value::to_text).collect())
}

/// LEFT function: first `n` characters (default 1)
pub fn fn_left(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let n = count_arg(args, 1, 1.0);
    Value::Text(text.chars().take(n).collect())
}

/// RIGHT function: last `n` characters (default 1)
pub fn fn_right(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let n = count_arg(args, 1, 1.0);
    let skip = text.chars().count().saturating_sub(n);
    Value::Text(text.chars().skip(skip).collect())
}

/// MID function: `len` characters (default 1) from 1-based `start` (default 1)
pub fn fn_mid(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let start = count_arg(args, 1, 1.0).saturating_sub(1);
    let len = count_arg(args, 2, 1.0);
    Value::Text(text.chars().skip(start).take(len).collect())
}

/// LEN function
pub fn fn_len(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Number(text_arg(args, 0).chars().count() as f64)
}

/// UPPER function
pub fn fn_upper(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Text(text_arg(args, 0).to_uppercase())
}

/// LOWER function
pub fn fn_lower(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::Text(text_arg(args, 0).to_lowercase())
}

/// PROPER function: capitalize each run that starts with a word character
pub fn fn_proper(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let proper = regex_replace_all!(r"[0-9A-Za-z_]\S*", &text, |word: &str| {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.as_str().to_lowercase().chars())
                .collect::<String>(),
            None => String::new(),
        }
    });
    Value::Text(proper.into_owned())
}

/// TRIM function: strip leading and trailing whitespace
pub fn fn_trim(args: &[Value], _ctx: &FunctionContext) -> Value {
    Value::text(text_arg(args, 0).trim())
}

/// TEXT function
///
/// Recognizes two formats: any format containing `#,##` groups digits in
/// lakh/crore style with up to three decimals, and any format containing `%`
/// renders a percentage with two decimals. Everything else prints the plain
/// number.
pub fn fn_text(args: &[Value], _ctx: &FunctionContext) -> Value {
    let value = number_or(args, 0, 0.0);
    let format = text_arg(args, 1);

    let rendered = if format.contains("#,##") {
        group_lakh(value)
    } else if format.contains('%') {
        format!("{:.2}%", value * 100.0)
    } else {
        format_number(value)
    };
    Value::Text(rendered)
}

/// `1234567.5` -> `12,34,567.5`
fn group_lakh(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut groups = Vec::new();
    let mut end = digits.len();
    let mut width = 3;
    while end > 0 {
        let start = end.saturating_sub(width);
        groups.push(digits[start..end].iter().collect::<String>());
        end = start;
        width = 2;
    }
    groups.reverse();

    let mut out = String::new();
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&groups.join(","));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// SUBSTITUTE function: replace every occurrence
///
/// An empty search string inserts the replacement between characters.
pub fn fn_substitute(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let old = text_arg(args, 1);
    let new = text_arg(args, 2);

    if old.is_empty() {
        let chars: Vec<String> = text.chars().map(String::from).collect();
        return Value::Text(chars.join(&new));
    }
    Value::Text(text.replace(&old, &new))
}

/// REPT function: repeat text `n` times (default 1)
pub fn fn_rept(args: &[Value], _ctx: &FunctionContext) -> Value {
    let text = text_arg(args, 0);
    let times = count_arg(args, 1, 1.0);

    match text.chars().count().checked_mul(times) {
        Some(len) if len <= MAX_TEXT_LENGTH => Value::Text(text.repeat(times)),
        _ => Value::text(""),
    }
}
