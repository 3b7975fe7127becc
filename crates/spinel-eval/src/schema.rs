//! Table and column metadata for resolving references in a predicate.
//!
//! The schema here is descriptive, not authoritative: it mirrors whatever
//! the orchestrator created in the engine under test, and the evaluator
//! consults it to resolve unqualified column references and to re-tag
//! bound values whose runtime kind underdetermines the declared type.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifier newtypes
// ============================================================================

/// A table name, normalized to the engine's case-insensitive identifier
/// rules at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    /// Creates a table name, lowercasing it.
    pub fn new(name: impl AsRef<str>) -> TableName {
        TableName(name.as_ref().to_lowercase())
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        TableName::new(s)
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column name, normalized like [`TableName`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a column name, lowercasing it.
    pub fn new(name: impl AsRef<str>) -> ColumnName {
        ColumnName(name.as_ref().to_lowercase())
    }

    /// The normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> Self {
        ColumnName::new(s)
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key `(table, column)` uniquely identifying a column across a
/// multi-table FROM clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableColumn {
    /// Owning table.
    pub table: TableName,
    /// Column within the table.
    pub column: ColumnName,
}

impl TableColumn {
    /// Creates a composite column key.
    pub fn new(table: impl Into<TableName>, column: impl Into<ColumnName>) -> TableColumn {
        TableColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

// ============================================================================
// Declared types
// ============================================================================

/// Coarse family of a declared SQL type name, used to re-tag bound values
/// whose runtime kind alone is ambiguous (a bare numeric literal bound to
/// a FLOAT column must evaluate as a double, not an integer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredFamily {
    /// FLOAT / DOUBLE / REAL.
    Float,
    /// DECIMAL / NUMERIC / FIXED.
    Decimal,
    /// DATE / TIME / DATETIME / TIMESTAMP / YEAR.
    Datetime,
    /// Any UNSIGNED integer flavor.
    UnsignedInt,
    /// Signed integer flavors and BOOL.
    Int,
    /// CHAR / VARCHAR / TEXT / BLOB / BINARY / ENUM / SET.
    Char,
    /// Anything unrecognized; no re-tagging applies.
    Other,
}

fn declared_family(declared: &str) -> DeclaredFamily {
    let t = declared.to_lowercase();
    let has = |needle: &str| t.contains(needle);
    if has("float") || has("double") || has("real") {
        DeclaredFamily::Float
    } else if has("decimal") || has("numeric") || has("fixed") {
        DeclaredFamily::Decimal
    } else if has("date") || has("time") || has("year") {
        DeclaredFamily::Datetime
    } else if has("unsigned") {
        DeclaredFamily::UnsignedInt
    } else if has("int") || has("bool") {
        DeclaredFamily::Int
    } else if has("char") || has("text") || has("blob") || has("binary") || has("enum") || has("set")
    {
        DeclaredFamily::Char
    } else {
        DeclaredFamily::Other
    }
}

// ============================================================================
// Column, index, and table definitions
// ============================================================================

/// A column definition: name, declared SQL type name, nullability.
///
/// The declared type stays a raw string ("double unsigned", "TEXT(10)")
/// because only its family matters here and the orchestrator reads it back
/// verbatim when regenerating DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    name: ColumnName,
    declared_type: String,
    nullable: bool,
}

impl ColumnDef {
    /// Creates a nullable column with the given declared type name.
    pub fn new(name: impl Into<ColumnName>, declared_type: impl Into<String>) -> ColumnDef {
        ColumnDef {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable: true,
        }
    }

    /// Marks the column NOT NULL.
    pub fn not_null(mut self) -> ColumnDef {
        self.nullable = false;
        self
    }

    /// Column name.
    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    /// Declared SQL type name, verbatim.
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// Whether the column admits NULL.
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Family of the declared type, for value re-tagging.
    pub fn family(&self) -> DeclaredFamily {
        declared_family(&self.declared_type)
    }
}

/// An index definition. Metadata only: the evaluator never consults
/// indexes, the orchestrator uses them to shape queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Index name.
    pub name: String,
    /// Indexed columns, in key order.
    pub columns: Vec<ColumnName>,
}

/// A table definition: name, ordered columns, indexes.
///
/// Constructed once per trial from the schema the orchestrator created and
/// immutable for the duration of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    name: TableName,
    columns: Vec<ColumnDef>,
    indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Creates a table definition without indexes.
    pub fn new(name: impl Into<TableName>, columns: Vec<ColumnDef>) -> TableDef {
        TableDef {
            name: name.into(),
            columns,
            indexes: vec![],
        }
    }

    /// Attaches index metadata.
    pub fn with_indexes(mut self, indexes: Vec<IndexDef>) -> TableDef {
        self.indexes = indexes;
        self
    }

    /// Table name.
    pub fn name(&self) -> &TableName {
        &self.name
    }

    /// Ordered column definitions.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Index metadata.
    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &ColumnName) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns true if the table declares a column with this name.
    pub fn has_column(&self, name: &ColumnName) -> bool {
        self.column(name).is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("float", DeclaredFamily::Float)]
    #[test_case("double unsigned", DeclaredFamily::Float; "unsigned double stays float")]
    #[test_case("NUMERIC", DeclaredFamily::Decimal)]
    #[test_case("decimal(10,2)", DeclaredFamily::Decimal)]
    #[test_case("bigint unsigned", DeclaredFamily::UnsignedInt)]
    #[test_case("INT", DeclaredFamily::Int)]
    #[test_case("tinyint(1)", DeclaredFamily::Int)]
    #[test_case("bool", DeclaredFamily::Int)]
    #[test_case("TEXT(10)", DeclaredFamily::Char)]
    #[test_case("varchar(255)", DeclaredFamily::Char)]
    #[test_case("CHAR", DeclaredFamily::Char)]
    #[test_case("datetime", DeclaredFamily::Datetime)]
    #[test_case("TIMESTAMP(6)", DeclaredFamily::Datetime)]
    #[test_case("geometry", DeclaredFamily::Other)]
    fn declared_type_families(declared: &str, expected: DeclaredFamily) {
        assert_eq!(ColumnDef::new("c0", declared).family(), expected);
    }

    #[test]
    fn identifiers_are_case_insensitive() {
        assert_eq!(TableName::new("T0"), TableName::new("t0"));
        let table = TableDef::new(
            "T0",
            vec![ColumnDef::new("C0", "int"), ColumnDef::new("c1", "text")],
        );
        assert!(table.has_column(&ColumnName::new("c0")));
        assert!(table.has_column(&ColumnName::new("C1")));
        assert!(!table.has_column(&ColumnName::new("c2")));
    }

    #[test]
    fn table_column_key_displays_qualified() {
        let tc = TableColumn {
            table: TableName::new("t0"),
            column: ColumnName::new("c0"),
        };
        assert_eq!(tc.to_string(), "t0.c0");
    }
}
