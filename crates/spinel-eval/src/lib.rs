//! # spinel-eval: independent SQL predicate evaluation for PQS
//!
//! This crate is the core of a pivoted-query-synthesis (PQS) oracle: given
//! one concrete row known to exist (the *pivot row*) and a parsed WHERE
//! predicate, it recomputes the predicate's ternary result independently of
//! the engine under test. A disagreement between this evaluation and the
//! row's presence in the engine's result set is a correctness bug in the
//! engine.
//!
//! The crate models:
//! - [`Value`] — tagged ternary-logic scalars with the engine's truthiness
//!   rules ([`Value::to_bool`])
//! - [`compare`] — the engine's comparison semantics, including the
//!   string/number and string/datetime coercion fallbacks
//! - [`Registry`] — logical and relational operators with per-position
//!   accepted-kind tables
//! - [`TableDef`] / [`RowBinding`] — schema metadata and the pivot row
//! - [`RowEvaluator`] — the recursive fold over the parsed predicate
//!
//! ## What this crate does not do
//!
//! It never connects to a database, never generates SQL text, and never
//! parses SQL itself — parsing belongs to `sqlparser`, and the trial loop
//! (schema creation, row insertion, result comparison) belongs to the
//! orchestrator.
//!
//! ## Usage
//!
//! ```
//! use spinel_eval::{ColumnDef, RowBinding, RowEvaluator, TableDef, Value, where_clause};
//! use sqlparser::dialect::MySqlDialect;
//! use sqlparser::parser::Parser;
//!
//! let stmts = Parser::parse_sql(&MySqlDialect {}, "SELECT * FROM t0 WHERE t0.c1 OR t0.c0")?;
//! let tables = vec![TableDef::new(
//!     "t0",
//!     vec![ColumnDef::new("c0", "int"), ColumnDef::new("c1", "int")],
//! )];
//! let row = RowBinding::new()
//!     .bind("t0", "c0", Value::Int(1))
//!     .bind("t0", "c1", Value::Int(0));
//!
//! let evaluator = RowEvaluator::new();
//! let result = evaluator.evaluate_where(where_clause(&stmts[0])?, &tables, &row)?;
//! assert_eq!(result, Value::Int(1)); // the pivot row must come back
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod binding;
mod builtin;
mod compare;
mod error;
mod eval;
mod operator;
mod schema;
mod value;


pub use binding::RowBinding;
pub use builtin::fold_builtin;
pub use compare::compare;
pub use error::{EvalError, Result};
pub use eval::{RowEvaluator, where_clause};
pub use operator::{AcceptTable, KindSet, Operator, OperatorFn, Registry};
pub use schema::{ColumnDef, ColumnName, DeclaredFamily, IndexDef, TableColumn, TableDef, TableName};
pub use value::{Kind, Value};
