//! Operator registry: logical connectives and relational comparisons.
//!
//! The registry is built once by [`Registry::standard`] and never mutated
//! afterwards; the evaluator owns an instance and dispatches binary nodes
//! through it. Each operator carries per-position accepted-kind tables used
//! by the external query generator when shaping predicates.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::compare::compare;
use crate::error::{EvalError, Result};
use crate::value::{Kind, Value};

// ============================================================================
// Kind sets and accept tables
// ============================================================================

/// A set of [`Kind`]s, packed into a bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSet(u16);

impl KindSet {
    /// The empty set.
    pub const EMPTY: KindSet = KindSet(0);

    /// Every kind.
    pub const ALL: KindSet = KindSet((1 << Kind::COUNT as u16) - 1);

    /// Returns this set with `kind` added.
    pub const fn with(self, kind: Kind) -> KindSet {
        KindSet(self.0 | (1 << kind.index() as u16))
    }

    /// Returns this set with `kind` removed.
    pub const fn without(self, kind: Kind) -> KindSet {
        KindSet(self.0 & !(1 << kind.index() as u16))
    }

    /// Returns true if `kind` is in the set.
    pub const fn contains(self, kind: Kind) -> bool {
        (self.0 & (1 << kind.index() as u16)) != 0
    }
}

/// Per-position acceptance: for an argument of a given kind, the set of
/// kinds admissible in the other argument position.
///
/// Most operators accept anything next to anything. Comparisons encode the
/// set-exclusion rule "a datetime is accepted here only while the peer slot
/// is not a string, and vice versa" — those pairs must go through the
/// string-conversion fallback instead of a direct library comparison.
#[derive(Debug, Clone, Copy)]
pub struct AcceptTable {
    peers: [KindSet; Kind::COUNT],
}

impl AcceptTable {
    /// A table accepting every peer kind for every own kind.
    pub const fn any() -> AcceptTable {
        AcceptTable {
            peers: [KindSet::ALL; Kind::COUNT],
        }
    }

    /// The comparison-operator table: datetime kinds exclude `Text` peers
    /// and `Text` excludes datetime peers.
    pub const fn comparison() -> AcceptTable {
        let mut table = AcceptTable::any();
        table.peers[Kind::Timestamp.index()] = KindSet::ALL.without(Kind::Text);
        table.peers[Kind::Date.index()] = KindSet::ALL.without(Kind::Text);
        table.peers[Kind::Text.index()] = KindSet::ALL
            .without(Kind::Timestamp)
            .without(Kind::Date);
        table
    }

    /// The peer kinds admissible next to an argument of kind `own`.
    pub const fn peer_mask(&self, own: Kind) -> KindSet {
        self.peers[own.index()]
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Evaluation function: takes exactly the operator's arity in values.
pub type OperatorFn = fn(&[Value]) -> Result<Value>;

/// A named operator with arity bounds, per-position accept tables, and an
/// evaluation function.
#[derive(Debug, Clone)]
pub struct Operator {
    name: &'static str,
    min_args: usize,
    max_args: usize,
    accept: [AcceptTable; 2],
    eval: OperatorFn,
}

impl Operator {
    fn binary(name: &'static str, accept: AcceptTable, eval: OperatorFn) -> Operator {
        Operator {
            name,
            min_args: 2,
            max_args: 2,
            accept: [accept; 2],
            eval,
        }
    }

    /// Operator name as dispatched ("AND", "EQ", ...).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Minimum arity.
    pub fn min_args(&self) -> usize {
        self.min_args
    }

    /// Maximum arity.
    pub fn max_args(&self) -> usize {
        self.max_args
    }

    /// Whether an argument of kind `own` at `position` is acceptable while
    /// the other position holds `peer`.
    pub fn accepts(&self, position: usize, own: Kind, peer: Kind) -> bool {
        self.accept[position].peer_mask(own).contains(peer)
    }

    /// Applies the operator to `args`.
    pub fn eval(&self, args: &[Value]) -> Result<Value> {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(EvalError::Internal(format!(
                "operator {} applied to {} arguments",
                self.name,
                args.len()
            )));
        }
        (self.eval)(args)
    }
}

/// Immutable operator registry, keyed by operator name.
#[derive(Debug, Clone)]
pub struct Registry {
    ops: HashMap<&'static str, Operator>,
}

impl Registry {
    /// Builds the standard registry: three-valued logical connectives and
    /// the six relational comparisons.
    pub fn standard() -> Registry {
        let mut ops = HashMap::new();
        let logical = [
            Operator::binary("AND", AcceptTable::any(), eval_and),
            Operator::binary("OR", AcceptTable::any(), eval_or),
            Operator::binary("XOR", AcceptTable::any(), eval_xor),
        ];
        let relational = [
            Operator::binary("GT", AcceptTable::comparison(), eval_gt),
            Operator::binary("LT", AcceptTable::comparison(), eval_lt),
            Operator::binary("GE", AcceptTable::comparison(), eval_ge),
            Operator::binary("LE", AcceptTable::comparison(), eval_le),
            Operator::binary("EQ", AcceptTable::comparison(), eval_eq),
            Operator::binary("NE", AcceptTable::comparison(), eval_ne),
        ];
        for op in logical.into_iter().chain(relational) {
            ops.insert(op.name, op);
        }
        Registry { ops }
    }

    /// Looks up an operator by name.
    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.ops.get(name)
    }

    /// Iterates over the registered operators (for generator-side use).
    pub fn iter(&self) -> impl Iterator<Item = &Operator> {
        self.ops.values()
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if no operators are registered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::standard()
    }
}

// ============================================================================
// Logical connectives
// ============================================================================

// NULL propagation here is deliberately simpler than full SQL three-valued
// logic: either operand NULL makes the result NULL, so `TRUE OR NULL` is
// NULL rather than TRUE. Recorded pivot scenarios depend on this exact
// behavior; it is the evaluator's defined semantics, not a bug.

fn binary_args(args: &[Value]) -> (&Value, &Value) {
    (&args[0], &args[1])
}

fn eval_and(args: &[Value]) -> Result<Value> {
    let (a, b) = binary_args(args);
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::from_bool(a.to_bool() && b.to_bool()))
}

fn eval_or(args: &[Value]) -> Result<Value> {
    let (a, b) = binary_args(args);
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::from_bool(a.to_bool() || b.to_bool()))
}

fn eval_xor(args: &[Value]) -> Result<Value> {
    let (a, b) = binary_args(args);
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::from_bool(a.to_bool() != b.to_bool()))
}

// ============================================================================
// Relational comparisons
// ============================================================================

fn relational(args: &[Value], pred: fn(Ordering) -> bool) -> Result<Value> {
    let (a, b) = binary_args(args);
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::from_bool(pred(compare(a, b)?)))
}

fn eval_gt(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_gt)
}

fn eval_lt(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_lt)
}

fn eval_ge(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_ge)
}

fn eval_le(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_le)
}

fn eval_eq(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_eq)
}

fn eval_ne(args: &[Value]) -> Result<Value> {
    relational(args, Ordering::is_ne)
}

// ============================================================================
// Tests
// ============================================================================
