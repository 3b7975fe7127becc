//! Value comparison: the single source of ordering truth.
//!
//! `compare` first tries the direct path (same kind, or a pair the engine
//! converts natively). When that fails, an ordered list of fallback rules
//! runs; the first rule that applies decides the ordering. Exhaustion is a
//! hard [`EvalError::IncomparableKinds`] failure — guessing would corrupt
//! the oracle's correctness signal.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::value::{Value, parse_full_numeric};

/// Compares two values, reproducing the engine's coercion rules.
///
/// NULL orders below every non-NULL value; the logical and relational
/// operators propagate NULL before calling this, so the NULL arms only
/// matter for callers ordering raw result sets.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    if let Some(ord) = compare_direct(a, b) {
        return Ok(ord);
    }
    for rule in FALLBACK_RULES {
        if let Some(ord) = rule(a, b) {
            debug!(left = %a.kind(), right = %b.kind(), "comparison took a fallback rule");
            return Ok(ord);
        }
    }
    Err(EvalError::IncomparableKinds {
        left: a.kind(),
        right: b.kind(),
    })
}

// ============================================================================
// Direct path
// ============================================================================

/// Comparisons the engine performs without special-casing: same kind, the
/// numeric lattice, datetime against datetime, and strings whose entire
/// content converts to a number.
fn compare_direct(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),

        (Value::Text(x), Value::Text(y)) => Some(x.as_bytes().cmp(y.as_bytes())),

        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Date(y)) => Some(x.cmp(&midnight(*y))),
        (Value::Date(x), Value::Timestamp(y)) => Some(midnight(*x).cmp(y)),

        (Value::Text(s), other) if other.is_numeric() => {
            text_to_numeric(s).and_then(|n| numeric_cmp(&n, other))
        }
        (other, Value::Text(s)) if other.is_numeric() => {
            text_to_numeric(s).and_then(|n| numeric_cmp(other, &n))
        }

        _ if a.is_numeric() && b.is_numeric() => numeric_cmp(a, b),

        _ => None,
    }
}

/// Converts a fully-numeric string to a value for comparison, preferring
/// the exact decimal form over the float form.
fn text_to_numeric(s: &str) -> Option<Value> {
    let t = s.trim();
    if let Ok(d) = Decimal::from_str(t) {
        return Some(Value::Decimal(d));
    }
    parse_full_numeric(s).map(Value::Float64)
}

/// Numeric lattice comparison.
///
/// Pairs within {Int, UInt, Decimal} compare exactly through `Decimal`
/// (this is what keeps an unsigned 0 greater than a signed -1); any pair
/// involving a float compares as f64 with IEEE semantics, so +0.0 equals
/// -0.0 the way the engine reports it.
fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (exact_decimal(a), exact_decimal(b)) {
        return Some(x.cmp(&y));
    }
    Some(f64_cmp(numeric_f64(a)?, numeric_f64(b)?))
}

fn exact_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::UInt(u) => Some(Decimal::from(*u)),
        Value::Decimal(d) => Some(*d),
        _ => None,
    }
}

fn numeric_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::UInt(u) => Some(*u as f64),
        Value::Float32(f) => Some(f64::from(*f)),
        Value::Float64(f) => Some(*f),
        Value::Decimal(d) => d.to_f64(),
        _ => None,
    }
}

/// IEEE comparison with NaN ordered above every number (the engine never
/// materializes NaN, so the arm exists only to keep the fold total).
fn f64_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

fn midnight(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}

// ============================================================================
// Fallback rules
// ============================================================================

type FallbackRule = fn(&Value, &Value) -> Option<Ordering>;

/// Ordered fallback rules for kind pairs the direct path cannot handle.
/// Evaluated in sequence; the first rule returning an ordering wins.
const FALLBACK_RULES: [FallbackRule; 4] = [
    numeric_vs_text,
    datetime_vs_text,
    text_vs_numeric,
    text_vs_datetime,
];

/// Rule 1: (Int|UInt|Float32|Float64, Text) where the text did not convert
/// to a number — the engine degrades to comparing the numeric operand
/// against zero. Decimal is deliberately absent from the numeric set here:
/// a decimal against unconvertible text has no defined ordering and must
/// surface as a hard failure.
fn numeric_vs_text(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (
            Value::Int(_) | Value::UInt(_) | Value::Float32(_) | Value::Float64(_),
            Value::Text(_),
        ) => numeric_cmp(a, &Value::Int(0)),
        _ => None,
    }
}

/// Rule 2: (Timestamp|Date, Text) — convert the string to a timestamp,
/// then a date, then a double, in that order, and compare against the
/// first successful conversion.
fn datetime_vs_text(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Timestamp(_) | Value::Date(_), Value::Text(s)) => {
            Some(datetime_against_text(a, s))
        }
        _ => None,
    }
}

/// Rule 3: rule 1 with the operands swapped and the sign negated.
fn text_vs_numeric(a: &Value, b: &Value) -> Option<Ordering> {
    numeric_vs_text(b, a).map(Ordering::reverse)
}

/// Rule 4: rule 2 with the operands swapped and the sign negated.
fn text_vs_datetime(a: &Value, b: &Value) -> Option<Ordering> {
    datetime_vs_text(b, a).map(Ordering::reverse)
}

fn datetime_against_text(dt: &Value, s: &str) -> Ordering {
    let t = s.trim();
    if let Some(ts) = parse_text_timestamp(t) {
        return datetime_value(dt).cmp(&ts);
    }
    if let Some(d) = parse_text_date(t) {
        return datetime_value(dt).cmp(&midnight(d));
    }
    if let Some(f) = parse_full_numeric(t) {
        return f64_cmp(datetime_numeric_form(dt), f);
    }
    // All three conversions failed. Compatibility with recorded trials
    // requires "equal" here even though it is not a defensible ordering.
    // TODO: switch this arm to EvalError::IncomparableKinds once the
    // recorded pivot scenarios that depend on it are regenerated.
    warn!(operand = %dt.kind(), text = %s, "datetime/string conversion exhausted, reporting equal");
    Ordering::Equal
}

fn datetime_value(v: &Value) -> NaiveDateTime {
    match v {
        Value::Timestamp(ts) => *ts,
        Value::Date(d) => midnight(*d),
        // Callers guard on is_datetime before reaching this.
        _ => unreachable!("datetime_value on {v}"),
    }
}

/// The engine's numeric rendering of a datetime: `YYYYMMDDHHMMSS` (dates
/// render as `YYYYMMDD`), fractional seconds appended after the point.
fn datetime_numeric_form(v: &Value) -> f64 {
    match v {
        Value::Date(d) => {
            f64::from(d.year()) * 10_000.0 + f64::from(d.month()) * 100.0 + f64::from(d.day())
        }
        Value::Timestamp(ts) => {
            let date_part = f64::from(ts.year()) * 10_000.0
                + f64::from(ts.month()) * 100.0
                + f64::from(ts.day());
            let time_part = f64::from(ts.hour()) * 10_000.0
                + f64::from(ts.minute()) * 100.0
                + f64::from(ts.second());
            let frac = f64::from(ts.nanosecond()) / 1e9;
            date_part * 1_000_000.0 + time_part + frac
        }
        _ => unreachable!("datetime_numeric_form on {v}"),
    }
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y%m%d%H%M%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Parses a string in the engine's timestamp formats.
pub(crate) fn parse_text_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses a string in the engine's date formats.
pub(crate) fn parse_text_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

// ============================================================================
// Tests
// ============================================================================
