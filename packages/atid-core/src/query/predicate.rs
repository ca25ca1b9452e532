use std::fmt;

use crate::driver::SqlValue;

/// Table-qualified column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Shorthand for [`ColumnRef::new`].
pub fn col(table: &str, column: &str) -> ColumnRef {
    ColumnRef::new(table, column)
}

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
        })
    }
}

/// `WHERE` clause predicate. Values are always bound, never inlined.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> value`
    Compare {
        column: ColumnRef,
        op: Operator,
        value: SqlValue,
    },
    /// `column BETWEEN low AND high`
    Between {
        column: ColumnRef,
        low: SqlValue,
        high: SqlValue,
    },
    /// `column IS NULL`
    IsNull(ColumnRef),
    /// every member holds
    All(Vec<Predicate>),
    /// at least one member holds
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: ColumnRef, op: Operator, value: impl Into<SqlValue>) -> Self {
        Self::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: ColumnRef, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn between(column: ColumnRef, low: impl Into<SqlValue>, high: impl Into<SqlValue>) -> Self {
        Self::Between {
            column,
            low: low.into(),
            high: high.into(),
        }
    }

    /// Columns referenced anywhere in the predicate.
    pub(crate) fn columns(&self) -> Vec<&ColumnRef> {
        match self {
            Self::Compare { column, .. } | Self::Between { column, .. } | Self::IsNull(column) => {
                vec![column]
            }
            Self::All(members) | Self::Any(members) => {
                members.iter().flat_map(Predicate::columns).collect()
            }
        }
    }
}
