//! Error types for predicate evaluation.

use crate::value::Kind;

/// Result alias used throughout the evaluator.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors surfaced by the row evaluator.
///
/// Evaluation is pure, so a given `(predicate, tables, binding)` triple
/// always fails the same way; callers decide whether to skip the trial or
/// treat the failure as an upstream synthesis bug. Nothing is retried
/// internally.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The predicate contains a construct the evaluator does not model
    /// (subquery, window function, builtin without a fold rule).
    ///
    /// Trials hitting this are skipped, not reported as engine bugs.
    #[error("unsupported node: {0}")]
    UnsupportedNode(String),

    /// A column reference matched no table in scope, or the row binding
    /// has no entry for it.
    ///
    /// Indicates a bug in row/query synthesis upstream, not in the engine
    /// under test.
    #[error("unresolved column reference {table}.{column}")]
    UnresolvedColumn {
        /// Table name as referenced (possibly inferred from scope).
        table: String,
        /// Column name as referenced.
        column: String,
    },

    /// The comparison algorithm exhausted every fallback rule without a
    /// definable ordering between the two operand kinds.
    ///
    /// Surfaced as a hard failure: silently defaulting to "equal" would
    /// corrupt the correctness signal the oracle exists to produce.
    #[error("no ordering defined between {left} and {right} operands")]
    IncomparableKinds {
        /// Kind of the left operand.
        left: Kind,
        /// Kind of the right operand.
        right: Kind,
    },

    /// Programming-error class: a value reached a code path that cannot
    /// handle its kind, or an operator was dispatched with bad arity.
    #[error("internal evaluator error: {0}")]
    Internal(String),
}
