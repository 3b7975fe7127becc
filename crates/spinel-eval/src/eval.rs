//! Tree evaluator: folds a parsed predicate into one ternary [`Value`]
//! against a fixed pivot row.
//!
//! Evaluation is a pure recursive fold over an immutable AST; there is no
//! persistent state, so a [`RowEvaluator`] can be shared across threads
//! and invoked once per trial.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlparser::ast::{
    BinaryOperator, Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, SetExpr,
    Statement, UnaryOperator, Value as SqlValue,
};
use tracing::trace;

use crate::binding::RowBinding;
use crate::builtin::fold_builtin;
use crate::compare::{parse_text_date, parse_text_timestamp};
use crate::error::{EvalError, Result};
use crate::operator::Registry;
use crate::schema::{ColumnName, DeclaredFamily, TableColumn, TableDef};
use crate::value::{Value, numeric_prefix};

// ============================================================================
// RowEvaluator
// ============================================================================

/// Evaluates predicates against a pivot row.
///
/// Owns the operator [`Registry`], built once at construction and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct RowEvaluator {
    registry: Registry,
}

impl RowEvaluator {
    /// Creates an evaluator with the standard operator registry.
    pub fn new() -> RowEvaluator {
        RowEvaluator {
            registry: Registry::standard(),
        }
    }

    /// The operator registry (for generator-side accept-mask queries).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Evaluates a WHERE clause against the pivot row.
    ///
    /// An absent predicate selects every row, so `None` evaluates to
    /// `Int(1)`.
    pub fn evaluate_where(
        &self,
        predicate: Option<&Expr>,
        tables: &[TableDef],
        row: &RowBinding,
    ) -> Result<Value> {
        match predicate {
            Some(expr) => self.evaluate(expr, tables, row),
            None => Ok(Value::Int(1)),
        }
    }

    /// Evaluates one expression node against the pivot row.
    pub fn evaluate(&self, expr: &Expr, tables: &[TableDef], row: &RowBinding) -> Result<Value> {
        match expr {
            Expr::Value(v) => literal_value(&v.value),
            Expr::Identifier(ident) => self.column_value(None, ident, tables, row),
            Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [table, column] => self.column_value(Some(table), column, tables, row),
                _ => Err(EvalError::UnsupportedNode(format!(
                    "column path {expr}"
                ))),
            },
            Expr::Nested(inner) => self.evaluate(inner, tables, row),
            Expr::UnaryOp { op, expr: operand } => {
                let value = self.evaluate(operand, tables, row)?;
                unary(*op, &value)
            }
            Expr::BinaryOp { left, op, right } => {
                let lhs = self.evaluate(left, tables, row)?;
                let rhs = self.evaluate(right, tables, row)?;
                self.binary(op, lhs, rhs)
            }
            Expr::Function(func) => {
                let name = func.name.to_string().to_uppercase();
                let args = self.function_args(&func.args, tables, row)?;
                fold_builtin(&name, &args)
            }
            other => Err(EvalError::UnsupportedNode(format!("expression {other}"))),
        }
    }

    fn binary(&self, op: &BinaryOperator, lhs: Value, rhs: Value) -> Result<Value> {
        let name = match op {
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Xor => "XOR",
            BinaryOperator::Gt => "GT",
            BinaryOperator::Lt => "LT",
            BinaryOperator::GtEq => "GE",
            BinaryOperator::LtEq => "LE",
            BinaryOperator::Eq => "EQ",
            BinaryOperator::NotEq => "NE",
            other => {
                return Err(EvalError::UnsupportedNode(format!("operator {other}")));
            }
        };
        let operator = self
            .registry
            .get(name)
            .ok_or_else(|| EvalError::Internal(format!("operator {name} not registered")))?;
        operator.eval(&[lhs, rhs])
    }

    /// Resolves a column reference to its bound value.
    ///
    /// An unqualified reference defaults its table by scanning the table
    /// list in order for the first one declaring the column. The declared
    /// type is consulted for every reference, not just ambiguous ones —
    /// re-tagging is a no-op when the runtime kind already agrees.
    fn column_value(
        &self,
        table: Option<&Ident>,
        column: &Ident,
        tables: &[TableDef],
        row: &RowBinding,
    ) -> Result<Value> {
        let column_name = ColumnName::new(&column.value);
        let table_def = match table {
            Some(t) => {
                let name = crate::schema::TableName::new(&t.value);
                tables.iter().find(|td| *td.name() == name).ok_or_else(|| {
                    EvalError::UnresolvedColumn {
                        table: t.value.clone(),
                        column: column.value.clone(),
                    }
                })?
            }
            None => tables
                .iter()
                .find(|td| td.has_column(&column_name))
                .ok_or_else(|| EvalError::UnresolvedColumn {
                    table: String::from("?"),
                    column: column.value.clone(),
                })?,
        };

        let key = TableColumn {
            table: table_def.name().clone(),
            column: column_name.clone(),
        };
        let bound = row.get(&key).ok_or_else(|| EvalError::UnresolvedColumn {
            table: table_def.name().to_string(),
            column: column_name.to_string(),
        })?;
        if bound.is_null() {
            return Ok(Value::Null);
        }

        // The schema may lag the predicate (generated columns), in which
        // case the runtime kind stands as-is.
        match table_def.column(&column_name) {
            Some(def) => Ok(apply_declared_type(bound, def.family())),
            None => Ok(bound.clone()),
        }
    }

    fn function_args(
        &self,
        args: &FunctionArguments,
        tables: &[TableDef],
        row: &RowBinding,
    ) -> Result<Vec<Value>> {
        match args {
            FunctionArguments::None => Ok(vec![]),
            FunctionArguments::Subquery(_) => {
                Err(EvalError::UnsupportedNode("subquery argument".into()))
            }
            FunctionArguments::List(list) => list
                .args
                .iter()
                .map(|arg| match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => {
                        self.evaluate(e, tables, row)
                    }
                    other => Err(EvalError::UnsupportedNode(format!(
                        "function argument {other}"
                    ))),
                })
                .collect(),
        }
    }
}

impl Default for RowEvaluator {
    fn default() -> Self {
        RowEvaluator::new()
    }
}

// ============================================================================
// Statement helpers
// ============================================================================

/// Extracts the WHERE clause from a parsed SELECT statement, the shape the
/// orchestrator hands over after parsing the synthesized query.
pub fn where_clause(stmt: &Statement) -> Result<Option<&Expr>> {
    let Statement::Query(query) = stmt else {
        return Err(EvalError::UnsupportedNode(format!("statement {stmt}")));
    };
    match query.body.as_ref() {
        SetExpr::Select(select) => Ok(select.selection.as_ref()),
        other => Err(EvalError::UnsupportedNode(format!("query body {other}"))),
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Maps an AST literal to a runtime value with the engine's literal
/// typing: bare integers are Int (UInt past i64::MAX), dotted numerics are
/// exact decimals, exponent notation is a double, TRUE/FALSE are Int.
fn literal_value(v: &SqlValue) -> Result<Value> {
    match v {
        SqlValue::Number(n, _) => number_literal(n),
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
            Ok(Value::Text(s.clone()))
        }
        SqlValue::Boolean(b) => Ok(Value::from_bool(*b)),
        SqlValue::Null => Ok(Value::Null),
        other => Err(EvalError::UnsupportedNode(format!("literal {other}"))),
    }
}

fn number_literal(n: &str) -> Result<Value> {
    let unparseable =
        || EvalError::Internal(format!("numeric literal {n} survived parsing but not typing"));
    if n.contains(['e', 'E']) {
        return n.parse::<f64>().map(Value::Float64).map_err(|_| unparseable());
    }
    if n.contains('.') {
        if let Ok(d) = Decimal::from_str_exact(n) {
            return Ok(Value::Decimal(d));
        }
        return n.parse::<f64>().map(Value::Float64).map_err(|_| unparseable());
    }
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Value::UInt(u));
    }
    if let Ok(d) = Decimal::from_str_exact(n) {
        return Ok(Value::Decimal(d));
    }
    n.parse::<f64>().map(Value::Float64).map_err(|_| unparseable())
}

// ============================================================================
// Unary operators
// ============================================================================

fn unary(op: UnaryOperator, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match op {
        UnaryOperator::Not => Ok(Value::from_bool(!value.to_bool())),
        UnaryOperator::Minus => negate(value),
        UnaryOperator::Plus => Ok(value.clone()),
        other => Err(EvalError::UnsupportedNode(format!("unary operator {other}"))),
    }
}

/// Negates a numeric value preserving its kind where the domain allows;
/// values that cannot stay in-kind widen to decimal, text negates through
/// its lenient numeric prefix.
fn negate(value: &Value) -> Result<Value> {
    match value {
        Value::Int(i) => Ok(i
            .checked_neg()
            .map(Value::Int)
            .unwrap_or_else(|| Value::Decimal(-Decimal::from(*i)))),
        Value::UInt(u) => {
            if let Ok(i) = i64::try_from(*u) {
                Ok(Value::Int(-i))
            } else {
                Ok(Value::Decimal(-Decimal::from(*u)))
            }
        }
        Value::Float32(f) => Ok(Value::Float32(-f)),
        Value::Float64(f) => Ok(Value::Float64(-f)),
        Value::Decimal(d) => Ok(Value::Decimal(-d)),
        Value::Text(s) => Ok(Value::Float64(-numeric_prefix(s))),
        Value::Timestamp(_) | Value::Date(_) => Err(EvalError::UnsupportedNode(format!(
            "unary minus over {} operand",
            value.kind()
        ))),
        Value::Null => Ok(Value::Null),
    }
}

// ============================================================================
// Declared-type re-tagging
// ============================================================================

/// Re-tags a bound value per the column's declared type family when the
/// runtime kind underdetermines it.
fn apply_declared_type(value: &Value, family: DeclaredFamily) -> Value {
    let retagged = match (family, value) {
        (DeclaredFamily::Float, Value::Int(i)) => Some(Value::Float64(*i as f64)),
        (DeclaredFamily::Float, Value::UInt(u)) => Some(Value::Float64(*u as f64)),
        (DeclaredFamily::Float, Value::Decimal(d)) => d.to_f64().map(Value::Float64),

        (DeclaredFamily::Decimal, Value::Int(i)) => Some(Value::Decimal(Decimal::from(*i))),
        (DeclaredFamily::Decimal, Value::UInt(u)) => Some(Value::Decimal(Decimal::from(*u))),
        (DeclaredFamily::Decimal, Value::Float32(f)) => {
            Decimal::from_f32(*f).map(Value::Decimal)
        }
        (DeclaredFamily::Decimal, Value::Float64(f)) => {
            Decimal::from_f64(*f).map(Value::Decimal)
        }

        (DeclaredFamily::UnsignedInt, Value::Int(i)) => {
            u64::try_from(*i).ok().map(Value::UInt)
        }

        (DeclaredFamily::Datetime, Value::Text(s)) => parse_text_timestamp(s.trim())
            .map(Value::Timestamp)
            .or_else(|| parse_text_date(s.trim()).map(Value::Date)),

        _ => None,
    };
    if let Some(v) = retagged {
        trace!(from = %value.kind(), to = %v.kind(), "re-tagged bound value per declared type");
        v
    } else {
        value.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
