//! End-to-end trial tests against a scripted mock engine.

#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::Result;

use spinel_eval::{ColumnDef, RowBinding, RowEvaluator, TableDef, Value};
use spinel_oracle::{
    EngineResult, EngineRunner, OracleError, PivotMismatch, TrialOutcome, run_trial,
};

// ============================================================================
// Mock engine
// ============================================================================

/// A mock engine that answers every query with one canned result set.
struct MockEngine {
    result: EngineResult,
    executed: usize,
}

impl MockEngine {
    fn returning(rows: Vec<Vec<Value>>) -> MockEngine {
        MockEngine {
            result: EngineResult {
                columns: vec!["c0".into()],
                rows,
            },
            executed: 0,
        }
    }
}

impl EngineRunner for MockEngine {
    fn execute(&mut self, _sql: &str) -> Result<EngineResult, OracleError> {
        self.executed += 1;
        Ok(self.result.clone())
    }

    fn reset(&mut self) -> Result<(), OracleError> {
        self.result.rows.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

fn schema() -> Vec<TableDef> {
    vec![TableDef::new(
        "t0",
        vec![ColumnDef::new("c0", "int"), ColumnDef::new("c1", "int")],
    )]
}

// ============================================================================
// Trials
// ============================================================================

#[test]
fn agreeing_trial_passes() -> Result<()> {
    // Predicate holds for the pivot row and the engine returned it.
    let mut engine = MockEngine::returning(vec![vec![Value::Int(1)]]);
    let binding = RowBinding::new()
        .bind("t0", "c0", Value::Int(1))
        .bind("t0", "c1", Value::Int(0));
    let outcome = run_trial(
        &mut engine,
        "SELECT t0.c0 FROM t0 WHERE t0.c1 OR t0.c0",
        &schema(),
        &binding,
        &[Value::Int(1)],
        &RowEvaluator::new(),
    )?;
    assert_eq!(outcome, TrialOutcome::Passed);
    assert_eq!(engine.executed, 1);
    Ok(())
}

#[test]
fn engine_dropping_the_pivot_row_is_a_bug() -> Result<()> {
    // Predicate holds, engine answered with an empty result set.
    let mut engine = MockEngine::returning(vec![]);
    let binding = RowBinding::new()
        .bind("t0", "c0", Value::Int(1))
        .bind("t0", "c1", Value::Int(0));
    let outcome = run_trial(
        &mut engine,
        "SELECT t0.c0 FROM t0 WHERE t0.c1 OR t0.c0",
        &schema(),
        &binding,
        &[Value::Int(1)],
        &RowEvaluator::new(),
    )?;
    assert!(matches!(
        outcome,
        TrialOutcome::Bug(PivotMismatch::MissingPivotRow { .. })
    ));
    Ok(())
}

#[test]
fn engine_returning_a_null_filtered_row_is_a_bug() -> Result<()> {
    // NOT(0 OR c0) with c0 NULL evaluates to NULL: the row must be
    // absent, yet the engine returned it.
    let mut engine = MockEngine::returning(vec![vec![Value::Null]]);
    let binding = RowBinding::new()
        .bind("t0", "c0", Value::Null)
        .bind("t0", "c1", Value::Int(0));
    let outcome = run_trial(
        &mut engine,
        "SELECT t0.c0 FROM t0 WHERE NOT(0 OR t0.c0)",
        &schema(),
        &binding,
        &[Value::Null],
        &RowEvaluator::new(),
    )?;
    assert!(matches!(
        outcome,
        TrialOutcome::Bug(PivotMismatch::SpuriousPivotRow { .. })
    ));
    Ok(())
}

#[test]
fn unsupported_construct_skips_without_executing_judgment() -> Result<()> {
    let mut engine = MockEngine::returning(vec![vec![Value::Int(1)]]);
    let binding = RowBinding::new().bind("t0", "c0", Value::Int(1));
    let outcome = run_trial(
        &mut engine,
        "SELECT t0.c0 FROM t0 WHERE RAND() > 0.5",
        &schema(),
        &binding,
        &[Value::Int(1)],
        &RowEvaluator::new(),
    )?;
    assert!(matches!(outcome, TrialOutcome::Skipped(_)));
    // Skips bail out before touching the engine.
    assert_eq!(engine.executed, 0);
    Ok(())
}

#[test]
fn unresolved_column_surfaces_as_an_error() {
    let mut engine = MockEngine::returning(vec![]);
    let binding = RowBinding::new().bind("t0", "c0", Value::Int(1));
    let err = run_trial(
        &mut engine,
        "SELECT t0.c0 FROM t0 WHERE t0.c1",
        &schema(),
        &binding,
        &[Value::Int(1)],
        &RowEvaluator::new(),
    )
    .unwrap_err();
    assert!(matches!(err, OracleError::Eval(_)));
}

#[test]
fn malformed_sql_surfaces_as_syntax_error() {
    let mut engine = MockEngine::returning(vec![]);
    let err = run_trial(
        &mut engine,
        "SELECT * FROM WHERE t0",
        &schema(),
        &RowBinding::new(),
        &[],
        &RowEvaluator::new(),
    )
    .unwrap_err();
    assert!(matches!(err, OracleError::Syntax(_)));
}
