//! Typed SQL runtime values and truthiness.

use std::fmt::{self, Display};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Value
// ============================================================================

/// A typed SQL runtime value, as materialized by the engine under test.
///
/// One `Value` is what a column holds in the hypothesized pivot row, what a
/// literal denotes, and what every operator produces. Values are immutable:
/// operators always build a new `Value` rather than mutating an input.
///
/// Boolean results have no kind of their own — the engine materializes
/// booleans as `Int(0 | 1)`, and so does the evaluator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit unsigned integer (UNSIGNED column values, large literals).
    UInt(u64),
    /// 32-bit floating point (FLOAT column values).
    Float32(f32),
    /// 64-bit floating point (DOUBLE column values, exponent literals).
    Float64(f64),
    /// UTF-8 (or engine-charset) string.
    Text(String),
    /// Fixed-point decimal (DECIMAL/NUMERIC column values, dotted literals).
    Decimal(Decimal),
    /// Date and time of day (DATETIME/TIMESTAMP column values).
    Timestamp(NaiveDateTime),
    /// Calendar date without a time component.
    Date(NaiveDate),
}

/// The kind tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// SQL NULL.
    Null,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    UInt,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// String.
    Text,
    /// Fixed-point decimal.
    Decimal,
    /// Date and time.
    Timestamp,
    /// Date only.
    Date,
}

impl Kind {
    /// Number of kinds, for kind-indexed tables.
    pub const COUNT: usize = 9;

    /// All kinds, in tag order.
    pub const ALL: [Kind; Kind::COUNT] = [
        Kind::Null,
        Kind::Int,
        Kind::UInt,
        Kind::Float32,
        Kind::Float64,
        Kind::Text,
        Kind::Decimal,
        Kind::Timestamp,
        Kind::Date,
    ];

    /// Stable index of this kind, for kind-indexed tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "NULL",
            Kind::Int => "BIGINT",
            Kind::UInt => "BIGINT UNSIGNED",
            Kind::Float32 => "FLOAT",
            Kind::Float64 => "DOUBLE",
            Kind::Text => "VARCHAR",
            Kind::Decimal => "DECIMAL",
            Kind::Timestamp => "DATETIME",
            Kind::Date => "DATE",
        };
        write!(f, "{name}")
    }
}

impl Value {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Int(_) => Kind::Int,
            Value::UInt(_) => Kind::UInt,
            Value::Float32(_) => Kind::Float32,
            Value::Float64(_) => Kind::Float64,
            Value::Text(_) => Kind::Text,
            Value::Decimal(_) => Kind::Decimal,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Date(_) => Kind::Date,
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for the numeric kinds (Int, UInt, Float32, Float64,
    /// Decimal).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_)
                | Value::UInt(_)
                | Value::Float32(_)
                | Value::Float64(_)
                | Value::Decimal(_)
        )
    }

    /// Returns true for the datetime kinds (Timestamp, Date).
    pub fn is_datetime(&self) -> bool {
        matches!(self, Value::Timestamp(_) | Value::Date(_))
    }

    /// Materializes a boolean the way the engine does: `Int(1)` / `Int(0)`.
    pub fn from_bool(b: bool) -> Value {
        Value::Int(i64::from(b))
    }

    /// Two-valued truthiness, as applied by the engine in boolean contexts.
    ///
    /// These rules replicate the engine's coercion behavior and are not
    /// generic boolean logic:
    ///
    /// - `Null` → false (callers wanting ternary semantics check
    ///   [`Value::is_null`] first);
    /// - `Int`/`UInt` → nonzero;
    /// - `Float32`/`Float64` → absolute value ≥ 1, not merely nonzero;
    /// - `Text` → optional leading minus, then a digit run containing a
    ///   nonzero digit; trailing non-digit content is ignored;
    /// - `Decimal` → not exactly zero.
    ///
    /// # Panics
    ///
    /// Panics on `Timestamp`/`Date`: a datetime reaching a boolean context
    /// is a caller bug, not recoverable data.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(v) => *v != 0,
            Value::UInt(v) => *v != 0,
            Value::Float32(v) => f64::from(*v).abs() >= 1.0,
            Value::Float64(v) => v.abs() >= 1.0,
            Value::Text(s) => integer_prefix_is_nonzero(s),
            Value::Decimal(d) => !d.is_zero(),
            Value::Timestamp(_) | Value::Date(_) => {
                unreachable!("datetime value {self} reached a boolean context")
            }
        }
    }
}

// Float payloads compare by bit pattern so that a value equals itself even
// when the payload is NaN; ordering semantics live in `compare`, not here.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a.to_bits() == b.to_bits(),
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Timestamp(ts) => write!(f, "'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

// ============================================================================
// String -> number coercion helpers
// ============================================================================

/// Truthiness rule for strings: optional leading `-`, then one or more
/// digits containing a nonzero digit. Anything after the digit run is
/// ignored, mirroring the engine's leading-prefix string→number coercion.
fn integer_prefix_is_nonzero(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let digits: &str = &unsigned[..unsigned
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()];
    !digits.is_empty() && digits.bytes().any(|b| b != b'0')
}

/// Parses an entire (trimmed) string as a finite number.
///
/// This is the conversion the engine applies before comparing a string to a
/// numeric operand; trailing garbage makes it fail, which is what sends
/// comparison down the fallback rules.
pub(crate) fn parse_full_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    let leading_ok = t
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-' || c == '.');
    if !leading_ok {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the longest numeric prefix of a string, returning 0.0 when there
/// is none. Mirrors the engine's lenient string→double cast (`-'12ab'`
/// is -12, `-'ab'` is -0).
pub(crate) fn numeric_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    let b = t.as_bytes();
    let mut end = 0;

    if matches!(b.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while b.get(end).is_some_and(|c| c.is_ascii_digit()) {
        end += 1;
    }
    let mut mantissa_digits = end > int_start;
    if b.get(end) == Some(&b'.') {
        let mut frac = end + 1;
        while b.get(frac).is_some_and(|c| c.is_ascii_digit()) {
            frac += 1;
        }
        if frac > end + 1 || mantissa_digits {
            mantissa_digits = mantissa_digits || frac > end + 1;
            end = frac;
        }
    }
    if mantissa_digits && matches!(b.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(b.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_start = exp;
        while b.get(exp).is_some_and(|c| c.is_ascii_digit()) {
            exp += 1;
        }
        if exp > exp_start {
            end = exp;
        }
    }

    if !mantissa_digits {
        return 0.0;
    }
    t[..end].parse::<f64>().unwrap_or(0.0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Value::Null, false; "null is false")]
    #[test_case(Value::Int(0), false; "int zero")]
    #[test_case(Value::Int(-3), true; "negative int")]
    #[test_case(Value::UInt(7), true; "nonzero uint")]
    #[test_case(Value::Float64(0.9), false; "double below threshold")]
    #[test_case(Value::Float64(1.0), true; "double at threshold")]
    #[test_case(Value::Float64(-1.5), true; "negative double beyond threshold")]
    #[test_case(Value::Float32(0.99), false; "float below threshold")]
    #[test_case(Value::Text("0".into()), false; "string zero")]
    #[test_case(Value::Text("1".into()), true; "string one")]
    #[test_case(Value::Text("a".into()), false; "non-numeric string")]
    #[test_case(Value::Text("-01".into()), true; "signed padded string")]
    #[test_case(Value::Text("12xyz".into()), true; "numeric prefix with garbage")]
    #[test_case(Value::Text("0.9".into()), false; "dotted string stops at dot")]
    fn truthiness(value: Value, expected: bool) {
        assert_eq!(value.to_bool(), expected);
    }

    #[test]
    fn decimal_truthiness_is_exact_zero_test() {
        assert!(!Value::Decimal(Decimal::ZERO).to_bool());
        assert!(Value::Decimal(Decimal::new(4, 1)).to_bool()); // 0.4
    }

    #[test]
    #[should_panic(expected = "boolean context")]
    fn datetime_truthiness_is_a_caller_bug() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let _ = Value::Date(d).to_bool();
    }

    #[test]
    fn full_numeric_parse_rejects_garbage_and_words() {
        assert_eq!(parse_full_numeric(" 1.5 "), Some(1.5));
        assert_eq!(parse_full_numeric("0e+00"), Some(0.0));
        assert_eq!(parse_full_numeric("12ab"), None);
        assert_eq!(parse_full_numeric("inf"), None);
        assert_eq!(parse_full_numeric("-inf"), None);
        assert_eq!(parse_full_numeric(""), None);
    }

    #[test]
    fn numeric_prefix_is_lenient() {
        assert_eq!(numeric_prefix("12ab"), 12.0);
        assert_eq!(numeric_prefix("ab"), 0.0);
        assert_eq!(numeric_prefix("-3.5e2x"), -350.0);
        assert_eq!(numeric_prefix(".5rest"), 0.5);
        assert_eq!(numeric_prefix("-"), 0.0);
    }

    #[test]
    fn float_payloads_equal_by_bits() {
        assert_eq!(Value::Float64(f64::NAN), Value::Float64(f64::NAN));
        assert_ne!(Value::Float64(0.0), Value::Float64(-0.0));
    }
}
