//! # spinel-oracle: trial verdicts for pivoted query synthesis
//!
//! This crate is the boundary between the independent evaluator
//! (`spinel-eval`) and whatever drives a real database engine. One PQS
//! trial works like this:
//!
//! 1. The orchestrator synthesizes a schema, a pivot row, and a SELECT
//!    whose WHERE predicate should hold for that row.
//! 2. An [`EngineRunner`] implementation executes the SELECT against the
//!    engine under test and returns its result set.
//! 3. [`run_trial`] independently evaluates the predicate against the
//!    pivot row and compares the verdicts: a predicate that holds while
//!    the row is absent (or vice versa) is a confirmed engine bug,
//!    reported as a [`PivotMismatch`].
//!
//! Nothing in this crate talks to a database: `EngineRunner`
//! implementations live with the orchestrator, next to its connection and
//! timeout handling.

use serde::Serialize;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::{debug, warn};

use spinel_eval::{EvalError, RowBinding, RowEvaluator, TableDef, Value, where_clause};

// ============================================================================
// Engine runner boundary
// ============================================================================

/// Executes SQL against a database engine on behalf of the oracle.
///
/// Implementations are expected to be deterministic for a fixed database
/// state and to map driver-level failures into [`OracleError`]; retries,
/// timeouts, and connection handling belong to the implementor.
pub trait EngineRunner {
    /// Executes a SQL statement and returns the result set.
    fn execute(&mut self, sql: &str) -> Result<EngineResult, OracleError>;

    /// Resets the engine to a clean state between trials.
    fn reset(&mut self) -> Result<(), OracleError>;

    /// Engine name, for logs and reports.
    fn name(&self) -> &'static str;
}

/// A result set as returned by the engine under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineResult {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<Vec<Value>>,
}

impl EngineResult {
    /// Creates an empty result with the given columns.
    pub fn empty(columns: Vec<String>) -> EngineResult {
        EngineResult {
            columns,
            rows: vec![],
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if any row equals the projected pivot row.
    pub fn contains_row(&self, row: &[Value]) -> bool {
        self.rows.iter().any(|r| r == row)
    }
}

/// Errors surfaced while running a trial.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The synthesized SQL did not parse.
    #[error("SQL syntax error: {0}")]
    Syntax(String),

    /// The engine failed executing the statement.
    #[error("engine runtime error: {0}")]
    Runtime(String),

    /// The engine did not answer in time.
    #[error("engine timeout after {0}ms")]
    Timeout(u64),

    /// The engine rejected a feature the query relies on.
    #[error("unsupported by engine: {0}")]
    Unsupported(String),

    /// Independent evaluation failed in a way that is not a skip
    /// (unresolved column, incomparable kinds, internal error).
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// A bug in the oracle plumbing itself.
    #[error("internal oracle error: {0}")]
    Internal(String),
}

// ============================================================================
// Verdicts
// ============================================================================

/// Decides whether a predicate result selects the pivot row: NULL and
/// false both leave the row out of the result set.
pub fn predicate_selects_row(value: &Value) -> bool {
    !value.is_null() && value.to_bool()
}

/// A confirmed disagreement between the engine and independent
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PivotMismatch {
    /// The predicate holds for the pivot row, but the engine's result set
    /// does not contain it.
    MissingPivotRow {
        /// What the predicate independently evaluated to.
        predicate_value: Value,
    },

    /// The predicate does not hold for the pivot row, but the engine
    /// returned it anyway.
    SpuriousPivotRow {
        /// What the predicate independently evaluated to.
        predicate_value: Value,
    },
}

impl std::fmt::Display for PivotMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PivotMismatch::MissingPivotRow { predicate_value } => write!(
                f,
                "pivot row missing from result set although the predicate evaluated to {predicate_value}"
            ),
            PivotMismatch::SpuriousPivotRow { predicate_value } => write!(
                f,
                "pivot row present in result set although the predicate evaluated to {predicate_value}"
            ),
        }
    }
}

impl std::error::Error for PivotMismatch {}

/// Outcome of one pivot trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TrialOutcome {
    /// Engine and independent evaluation agree.
    Passed,
    /// The predicate uses a construct the evaluator does not model; the
    /// trial carries no signal either way.
    Skipped(String),
    /// Engine and independent evaluation disagree: an engine bug.
    Bug(PivotMismatch),
}

/// Compares the independent verdict with the engine's, standalone form
/// for orchestrators that already hold both sides.
pub fn check_trial(expected: &Value, pivot_row_present: bool) -> Result<(), PivotMismatch> {
    let should_be_present = predicate_selects_row(expected);
    match (should_be_present, pivot_row_present) {
        (true, false) => Err(PivotMismatch::MissingPivotRow {
            predicate_value: expected.clone(),
        }),
        (false, true) => Err(PivotMismatch::SpuriousPivotRow {
            predicate_value: expected.clone(),
        }),
        _ => Ok(()),
    }
}

// ============================================================================
// Trial loop kernel
// ============================================================================

/// Runs one pivot trial end to end: execute the SELECT on the engine,
/// evaluate its WHERE clause independently, compare verdicts.
///
/// `pivot_row` is the projection of the pivot row in the SELECT's column
/// order, used to test membership in the engine's result set.
///
/// Evaluation failures split per their meaning: an unsupported construct
/// skips the trial, anything else (unresolved column, incomparable kinds)
/// propagates as an error because it indicates an upstream synthesis bug
/// rather than engine behavior.
pub fn run_trial<R: EngineRunner>(
    runner: &mut R,
    sql: &str,
    tables: &[TableDef],
    binding: &RowBinding,
    pivot_row: &[Value],
    evaluator: &RowEvaluator,
) -> Result<TrialOutcome, OracleError> {
    let statements =
        Parser::parse_sql(&MySqlDialect {}, sql).map_err(|e| OracleError::Syntax(e.to_string()))?;
    let statement = statements
        .first()
        .ok_or_else(|| OracleError::Syntax(format!("no statement in {sql:?}")))?;

    let expected = match where_clause(statement)
        .and_then(|predicate| evaluator.evaluate_where(predicate, tables, binding))
    {
        Ok(value) => value,
        Err(EvalError::UnsupportedNode(node)) => {
            debug!(engine = runner.name(), node = %node, "trial skipped");
            return Ok(TrialOutcome::Skipped(node));
        }
        Err(other) => return Err(other.into()),
    };

    let result = runner.execute(sql)?;
    let present = result.contains_row(pivot_row);

    match check_trial(&expected, present) {
        Ok(()) => Ok(TrialOutcome::Passed),
        Err(mismatch) => {
            warn!(engine = runner.name(), %mismatch, sql, "engine disagrees with independent evaluation");
            Ok(TrialOutcome::Bug(mismatch))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_false_both_leave_the_row_out() {
        assert!(!predicate_selects_row(&Value::Null));
        assert!(!predicate_selects_row(&Value::Int(0)));
        assert!(predicate_selects_row(&Value::Int(1)));
        assert!(!predicate_selects_row(&Value::Float64(0.5)));
    }

    #[test]
    fn check_trial_flags_both_directions() {
        assert!(check_trial(&Value::Int(1), true).is_ok());
        assert!(check_trial(&Value::Int(0), false).is_ok());
        assert!(check_trial(&Value::Null, false).is_ok());

        let missing = check_trial(&Value::Int(1), false).unwrap_err();
        assert!(matches!(missing, PivotMismatch::MissingPivotRow { .. }));

        let spurious = check_trial(&Value::Null, true).unwrap_err();
        assert!(matches!(spurious, PivotMismatch::SpuriousPivotRow { .. }));
    }

    #[test]
    fn mismatch_reports_serialize_to_json() {
        let mismatch = PivotMismatch::MissingPivotRow {
            predicate_value: Value::Int(1),
        };
        let json = serde_json::to_string(&mismatch).unwrap();
        assert!(json.contains("MissingPivotRow"));
        assert!(json.contains("predicate_value"));
    }

    #[test]
    fn result_membership_uses_value_equality() {
        let result = EngineResult {
            columns: vec!["c0".into()],
            rows: vec![vec![Value::Int(1)], vec![Value::Null]],
        };
        assert!(result.contains_row(&[Value::Int(1)]));
        assert!(result.contains_row(&[Value::Null]));
        assert!(!result.contains_row(&[Value::Int(2)]));
        assert_eq!(result.len(), 2);
        assert!(!EngineResult::empty(vec!["c0".into()]).contains_row(&[Value::Int(1)]));
    }
}
