//! Constant folding for builtin functions appearing in predicates.
//!
//! Synthesized predicates occasionally carry side-effect-free builtin
//! calls over constant arguments. The external parsing library hands us
//! the call node unevaluated, so the fold rules live here; a function
//! without a rule is an unsupported node and the trial is skipped.

use rust_decimal::prelude::ToPrimitive;

use crate::error::{EvalError, Result};
use crate::value::{Value, numeric_prefix};

/// Folds a builtin function call over already-evaluated arguments.
pub fn fold_builtin(name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "CHAR" => fold_char(args),
        other => Err(EvalError::UnsupportedNode(format!("function {other}"))),
    }
}

/// CHAR(N, ...): each argument is interpreted as an integer and appended
/// as its big-endian byte expansion; values over 255 produce multiple
/// bytes, NULL arguments are skipped.
fn fold_char(args: &[Value]) -> Result<Value> {
    let mut bytes = Vec::with_capacity(args.len());
    for arg in args {
        if arg.is_null() {
            continue;
        }
        let code = char_code(arg)?;
        bytes.extend_from_slice(&expand_code(code));
    }
    Ok(Value::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

fn char_code(v: &Value) -> Result<u32> {
    let n = match v {
        Value::Int(i) => *i as f64,
        Value::UInt(u) => *u as f64,
        Value::Float32(f) => f64::from(*f).round(),
        Value::Float64(f) => f.round(),
        Value::Decimal(d) => d.to_f64().unwrap_or(0.0).round(),
        Value::Text(s) => numeric_prefix(s).round(),
        Value::Null | Value::Timestamp(_) | Value::Date(_) => {
            return Err(EvalError::UnsupportedNode(format!(
                "CHAR argument of kind {}",
                v.kind()
            )));
        }
    };
    // Arguments wrap to 32 bits before byte expansion.
    Ok(n as i64 as u32)
}

fn expand_code(code: u32) -> Vec<u8> {
    let raw = code.to_be_bytes();
    let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len() - 1);
    raw[first..].to_vec()
}
