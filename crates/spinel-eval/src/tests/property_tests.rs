//! Property-based tests using proptest.
//!
//! Invariants that must hold for all inputs: NULL propagation through
//! every operator, truthiness thresholds, and comparison antisymmetry
//! under the string fallback rules.

use std::cmp::Ordering;

use proptest::prelude::*;

use crate::compare::compare;
use crate::operator::Registry;
use crate::value::Value;

/// Non-null scalar values drawn across the numeric and string kinds.
fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        prop::num::f64::NORMAL.prop_map(Value::Float64),
        "[a-z0-9]{0,8}".prop_map(Value::Text),
    ]
}

/// Strings with no digit in them: these never convert to a number, so a
/// comparison against a numeric operand must take the fallback rules.
fn non_numeric_text() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

proptest! {
    // ========================================================================
    // NULL propagation
    // ========================================================================

    /// op(NULL, x) and op(x, NULL) are NULL for every registered operator.
    #[test]
    fn null_propagates_through_every_operator(x in scalar_value()) {
        let registry = Registry::standard();
        for op in registry.iter() {
            let left = op.eval(&[Value::Null, x.clone()]).unwrap();
            let right = op.eval(&[x.clone(), Value::Null]).unwrap();
            prop_assert!(left.is_null(), "{}(NULL, x)", op.name());
            prop_assert!(right.is_null(), "{}(x, NULL)", op.name());
        }
    }

    // ========================================================================
    // Truthiness
    // ========================================================================

    /// Doubles are truthy exactly at |v| >= 1, independent of sign.
    #[test]
    fn double_truthiness_threshold(v in prop::num::f64::NORMAL) {
        prop_assert_eq!(Value::Float64(v).to_bool(), v.abs() >= 1.0);
    }

    /// Integers are truthy exactly when nonzero.
    #[test]
    fn int_truthiness_is_nonzero(v in any::<i64>()) {
        prop_assert_eq!(Value::Int(v).to_bool(), v != 0);
    }

    /// A string of a nonzero integer is truthy, with or without trailing
    /// garbage; the garbage never changes the verdict.
    #[test]
    fn string_truthiness_ignores_trailing_garbage(n in 1i64..1_000_000, tail in "[a-z]{0,4}") {
        let plain = Value::Text(n.to_string());
        let suffixed = Value::Text(format!("{n}{tail}"));
        prop_assert!(plain.to_bool());
        prop_assert_eq!(plain.to_bool(), suffixed.to_bool());
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// compare(n, s) == -compare(s, n) when a numeric operand meets a
    /// non-numeric string and both sides take the zero-comparison
    /// fallback.
    #[test]
    fn fallback_comparison_is_antisymmetric(n in any::<i64>(), s in non_numeric_text()) {
        let num = Value::Int(n);
        let text = Value::Text(s);
        let fwd = compare(&num, &text).unwrap();
        let rev = compare(&text, &num).unwrap();
        prop_assert_eq!(fwd, rev.reverse());
    }

    /// The zero-comparison fallback reduces to the sign of the numeric
    /// operand.
    #[test]
    fn fallback_comparison_is_sign_of_numeric(n in any::<i64>(), s in non_numeric_text()) {
        let ord = compare(&Value::Int(n), &Value::Text(s)).unwrap();
        prop_assert_eq!(ord, n.cmp(&0));
    }

    /// Comparison of any two same-kind integers agrees with native order.
    #[test]
    fn int_comparison_matches_native(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(compare(&Value::Int(a), &Value::Int(b)).unwrap(), a.cmp(&b));
    }

    /// Unsigned vs signed comparison never wraps: any unsigned value is
    /// greater than any negative signed value.
    #[test]
    fn unsigned_never_wraps_against_negative(u in any::<u64>(), i in i64::MIN..0i64) {
        prop_assert_eq!(
            compare(&Value::UInt(u), &Value::Int(i)).unwrap(),
            Ordering::Greater
        );
    }

    /// Fully numeric strings compare like their numeric value on both
    /// sides (direct conversion, no fallback).
    #[test]
    fn numeric_string_comparison_matches_value(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let text = Value::Text(a.to_string());
        let num = Value::Int(b);
        prop_assert_eq!(compare(&text, &num).unwrap(), a.cmp(&b));
    }
}
