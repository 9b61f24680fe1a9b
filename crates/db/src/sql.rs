//! SQL fragment builders for partial updates and filtered listings.
//!
//! Nothing here touches the database. Builders return SQL text plus the
//! ordered positional parameters that go with it; repositories bind those
//! parameters onto sqlx queries with [`bind_values`].

use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::Postgres;

use crate::DbError;

// ---------------------------------------------------------------------------
// Parameter values
// ---------------------------------------------------------------------------

/// A positional parameter value.
///
/// Nulls keep their type so Postgres sees the column's parameter type
/// (`int4`, `text`, `numeric`) even when the value is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(Option<i32>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(Some(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(Some(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(Some(v.to_string()))
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(Some(v))
    }
}

/// Bind `values` onto `query` in order, so that `values[i]` fills `$i+1`.
pub(crate) fn bind_values<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for value in values {
        query = match value {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
            SqlValue::Decimal(v) => query.bind(v),
        };
    }
    query
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// Lookup table from external field names to storage column names.
///
/// Fields missing from the table use their own name as the column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap(pub &'static [(&'static str, &'static str)]);

impl ColumnMap {
    pub const IDENTITY: ColumnMap = ColumnMap(&[]);

    pub fn column_for<'a>(&self, field: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// Output of [`sql_for_partial_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// `"<column>"=$n` assignments, `n` running from 1 in input order.
    pub columns: Vec<String>,
    /// Parameter values, parallel to `columns`.
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Assignments joined for a `SET` clause.
    pub fn set_clause(&self) -> String {
        self.columns.join(", ")
    }

    /// Placeholder number the caller should use for its key (`WHERE ... = $n`).
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the `SET` assignments for a partial update.
///
/// `data` lists only the fields being changed, in the order they should
/// appear. Fails with a validation error when `data` is empty.
pub fn sql_for_partial_update(
    data: Vec<(&str, SqlValue)>,
    column_map: ColumnMap,
) -> Result<PartialUpdate, DbError> {
    if data.is_empty() {
        return Err(DbError::validation("No data"));
    }

    let mut columns = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (idx, (field, value)) in data.into_iter().enumerate() {
        columns.push(format!("\"{}\"=${}", column_map.column_for(field), idx + 1));
        values.push(value);
    }

    Ok(PartialUpdate { columns, values })
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A boolean predicate assembled from optional filters, plus its parameters.
///
/// Placeholders are numbered from the count of parameters pushed so far, so
/// numbering stays dense whichever filters are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterClause {
    predicates: Vec<String>,
    values: Vec<SqlValue>,
}

impl FilterClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate whose single `$` is replaced by the next placeholder.
    pub fn push_param(&mut self, template: &str, value: SqlValue) -> &mut Self {
        let placeholder = format!("${}", self.values.len() + 1);
        self.predicates.push(template.replacen('$', &placeholder, 1));
        self.values.push(value);
        self
    }

    /// Append a predicate that takes no parameter.
    pub fn push_raw(&mut self, predicate: &str) -> &mut Self {
        self.predicates.push(predicate.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Predicates joined with `AND`; empty when no filter applied.
    pub fn predicate(&self) -> String {
        self.predicates.join(" AND ")
    }

    /// `" WHERE <predicate>"`, or an empty string when no filter applied.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicate())
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}
