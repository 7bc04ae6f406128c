//! Date and time functions
//!
//! Dates travel as text. `TODAY` and `NOW` read the clock captured in the
//! [`FunctionContext`]; the component functions parse their argument and
//! return `0` when it is not a recognizable date.

use super::{arg, FunctionContext};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use gridcalc_core::Value;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse date text; offsets are normalized to UTC, naive values are taken as UTC
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn component(args: &[Value], part: fn(&NaiveDateTime) -> u32) -> Value {
    let value = match arg(args, 0) {
        Value::Text(s) => parse_datetime(s).map_or(0.0, |dt| part(&dt) as f64),
        _ => 0.0,
    };
    Value::Number(value)
}

/// TODAY function: `YYYY-MM-DD`
pub fn fn_today(_args: &[Value], ctx: &FunctionContext) -> Value {
    Value::Text(ctx.now.format("%Y-%m-%d").to_string())
}

/// NOW function: ISO-8601 UTC timestamp with milliseconds
pub fn fn_now(_args: &[Value], ctx: &FunctionContext) -> Value {
    Value::Text(ctx.now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// YEAR function
pub fn fn_year(args: &[Value], _ctx: &FunctionContext) -> Value {
    match arg(args, 0) {
        Value::Text(s) => Value::Number(parse_datetime(s).map_or(0.0, |dt| dt.year() as f64)),
        _ => Value::Number(0.0),
    }
}

/// MONTH function (1-12)
pub fn fn_month(args: &[Value], _ctx: &FunctionContext) -> Value {
    component(args, |dt| dt.month())
}

/// DAY function (1-31)
pub fn fn_day(args: &[Value], _ctx: &FunctionContext) -> Value {
    component(args, |dt| dt.day())
}

/// HOUR function (0-23)
pub fn fn_hour(args: &[Value], _ctx: &FunctionContext) -> Value {
    component(args, |dt| dt.hour())
}

/// MINUTE function (0-59)
pub fn fn_minute(args: &[Value], _ctx: &FunctionContext) -> Value {
    component(args, |dt| dt.minute())
}

/// SECOND function (0-59)
pub fn fn_second(args: &[Value], _ctx: &FunctionContext) -> Value {
    component(args, |dt| dt.second())
}
