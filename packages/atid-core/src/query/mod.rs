//! Parameterized `SELECT` construction over a registered schema vocabulary.
//!
//! Tables and columns are declared once per catalog. Statements may only
//! name registered identifiers, and every value ends up as a bound parameter
//! in the engine's placeholder style.

mod dialect;
mod predicate;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use dialect::{Dialect, Placeholder};
pub use predicate::{col, ColumnRef, Operator, Predicate};

use crate::driver::{Engine, SqlValue};
use crate::error::QueryError;

/// Built statement text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Statement {
    /// Statement without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[derive(Debug, Clone)]
struct Join {
    table: String,
    left: ColumnRef,
    right: ColumnRef,
}

/// Reusable `SELECT` builder.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    vocabulary: BTreeMap<String, BTreeSet<String>>,
    columns: Vec<ColumnRef>,
    from: Option<String>,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    order_by: Vec<ColumnRef>,
}

impl QueryBuilder {
    /// Creates a builder producing SQL for the given engine.
    pub fn new(engine: Engine) -> Self {
        Self {
            dialect: Dialect::for_engine(engine),
            vocabulary: BTreeMap::new(),
            columns: Vec::new(),
            from: None,
            joins: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Declares a table.
    pub fn register_table(&mut self, name: &str) -> &mut Self {
        self.vocabulary.entry(name.to_string()).or_default();
        self
    }

    /// Declares a column of a table, declaring the table if needed.
    pub fn register_column(&mut self, table: &str, name: &str) -> &mut Self {
        self.vocabulary
            .entry(table.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// Adds result columns.
    pub fn select<I>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = ColumnRef>,
    {
        self.columns.extend(columns);
        self
    }

    /// Sets the `FROM` table.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from = Some(table.to_string());
        self
    }

    /// Adds `INNER JOIN table ON left = right`.
    pub fn join(&mut self, table: &str, left: ColumnRef, right: ColumnRef) -> &mut Self {
        self.joins.push(Join {
            table: table.to_string(),
            left,
            right,
        });
        self
    }

    /// Adds a predicate. Multiple predicates are combined with `AND`.
    pub fn where_(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an ascending sort key.
    pub fn order_by(&mut self, column: ColumnRef) -> &mut Self {
        self.order_by.push(column);
        self
    }

    /// Clears the statement, keeping the registered vocabulary.
    pub fn reset_query(&mut self) -> &mut Self {
        self.columns.clear();
        self.from = None;
        self.joins.clear();
        self.predicates.clear();
        self.order_by.clear();
        self
    }

    /// Renders the statement.
    pub fn build(&self) -> Result<Statement, QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::NoColumns);
        }
        let from = self.from.as_deref().ok_or(QueryError::NoTable)?;
        self.check_table(from)?;
        for join in &self.joins {
            self.check_table(&join.table)?;
        }
        for column in self
            .columns
            .iter()
            .chain(self.order_by.iter())
            .chain(self.joins.iter().flat_map(|j| [&j.left, &j.right]))
            .chain(self.predicates.iter().flat_map(Predicate::columns))
        {
            self.check_column(column)?;
        }

        let mut sql = String::from("SELECT ");
        sql.push_str(&self.render_list(&self.columns));
        sql.push_str(" FROM ");
        sql.push_str(&self.dialect.quote_identifier(from));
        for join in &self.joins {
            sql.push_str(&format!(
                " INNER JOIN {} ON {} = {}",
                self.dialect.quote_identifier(&join.table),
                self.render_column(&join.left),
                self.render_column(&join.right)
            ));
        }

        let mut params = Vec::new();
        if !self.predicates.is_empty() {
            let mut clauses = Vec::with_capacity(self.predicates.len());
            for predicate in &self.predicates {
                clauses.push(self.render_predicate(predicate, &mut params)?);
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.render_list(&self.order_by));
        }

        Ok(Statement { sql, params })
    }

    fn check_table(&self, table: &str) -> Result<(), QueryError> {
        if self.vocabulary.contains_key(table) {
            Ok(())
        } else {
            Err(QueryError::UnknownTable(table.to_string()))
        }
    }

    fn check_column(&self, column: &ColumnRef) -> Result<(), QueryError> {
        let columns = self
            .vocabulary
            .get(&column.table)
            .ok_or_else(|| QueryError::UnknownTable(column.table.clone()))?;
        if columns.contains(&column.column) {
            Ok(())
        } else {
            Err(QueryError::UnknownColumn {
                table: column.table.clone(),
                column: column.column.clone(),
            })
        }
    }

    fn render_column(&self, column: &ColumnRef) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_identifier(&column.table),
            self.dialect.quote_identifier(&column.column)
        )
    }

    fn render_list(&self, columns: &[ColumnRef]) -> String {
        columns
            .iter()
            .map(|c| self.render_column(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bind(&self, value: &SqlValue, params: &mut Vec<SqlValue>) -> String {
        params.push(value.clone());
        self.dialect.placeholder(params.len())
    }

    fn render_predicate(
        &self,
        predicate: &Predicate,
        params: &mut Vec<SqlValue>,
    ) -> Result<String, QueryError> {
        Ok(match predicate {
            Predicate::Compare { column, op, value } => {
                let column = self.render_column(column);
                format!("{} {} {}", column, op, self.bind(value, params))
            }
            Predicate::Between { column, low, high } => {
                let column = self.render_column(column);
                let low = self.bind(low, params);
                let high = self.bind(high, params);
                format!("{column} BETWEEN {low} AND {high}")
            }
            Predicate::IsNull(column) => format!("{} IS NULL", self.render_column(column)),
            Predicate::All(members) => self.render_group(members, " AND ", params)?,
            Predicate::Any(members) => self.render_group(members, " OR ", params)?,
        })
    }

    fn render_group(
        &self,
        members: &[Predicate],
        separator: &str,
        params: &mut Vec<SqlValue>,
    ) -> Result<String, QueryError> {
        if members.is_empty() {
            return Err(QueryError::EmptyGroup);
        }
        let mut parts = Vec::with_capacity(members.len());
        for member in members {
            parts.push(self.render_predicate(member, params)?);
        }
        Ok(format!("({})", parts.join(separator)))
    }
}
