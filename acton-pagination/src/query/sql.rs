//! PostgreSQL-flavoured query rendering
//!
//! [`SqlQuery`] implements [`Query`] by accumulating predicates and sort keys,
//! then renders a parameterised statement with `$n` placeholders. Executors
//! backed by a real driver bind [`SqlStatement::params`] in order.
//!
//! # Example
//!
//! ```rust
//! use acton_pagination::query::{FilterCondition, OrderDirection, Query, SqlQuery};
//!
//! let statement = SqlQuery::select("users")
//!     .filter(FilterCondition::gte("age", 18_i64).into())
//!     .order_by("created_at", OrderDirection::Descending)
//!     .limit(10)
//!     .to_sql();
//!
//! assert_eq!(
//!     statement.sql,
//!     r#"SELECT * FROM users WHERE "age" >= $1 ORDER BY "created_at" DESC LIMIT $2"#
//! );
//! assert_eq!(statement.params.len(), 2);
//! ```


use super::executor::Query;
use super::predicate::{FilterCondition, FilterOperator, FilterValue, OrderBy, OrderDirection, Predicate};
use crate::model::FieldValue;

/// What a [`SqlQuery`] selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Explicit column list, `*` when empty
    Columns(Vec<String>),
    /// `COUNT(*)`
    Count,
}

/// A rendered statement with its bind parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    /// SQL text with `$1..$n` placeholders
    pub sql: String,
    /// Values to bind, in placeholder order
    pub params: Vec<FieldValue>,
}

/// Composable SELECT statement
///
/// The `from` clause is trusted SQL supplied by the caller, so it may carry
/// joins (`users u JOIN teams t ON t.id = u.team_id`). Field names passed to
/// [`Query::filter`] and [`Query::order_by`] are quoted as identifiers; a
/// dotted name quotes each segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    from: String,
    projection: Projection,
    predicates: Vec<Predicate>,
    ordering: Vec<OrderBy>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl SqlQuery {
    /// `SELECT * FROM <from>`
    pub fn select(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            projection: Projection::Columns(Vec::new()),
            predicates: Vec::new(),
            ordering: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    /// `SELECT COUNT(*) FROM <from>`
    pub fn count(from: impl Into<String>) -> Self {
        Self {
            projection: Projection::Count,
            ..Self::select(from)
        }
    }

    /// Select explicit columns instead of `*`
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// The projection of this query
    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Render the statement
    ///
    /// Count queries never render ORDER BY, LIMIT or OFFSET.
    #[must_use]
    pub fn to_sql(&self) -> SqlStatement {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        match &self.projection {
            Projection::Count => sql.push_str("COUNT(*)"),
            Projection::Columns(columns) if columns.is_empty() => sql.push('*'),
            Projection::Columns(columns) => {
                let rendered: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                sql.push_str(&rendered.join(", "));
            }
        }
        sql.push_str(&format!(" FROM {}", self.from));

        if !self.predicates.is_empty() {
            let clauses: Vec<String> = self
                .predicates
                .iter()
                .map(|p| render_predicate(p, &mut params))
                .collect();
            sql.push_str(&format!(" WHERE {}", clauses.join(" AND ")));
        }

        if self.projection == Projection::Count {
            return SqlStatement { sql, params };
        }

        if !self.ordering.is_empty() {
            let keys: Vec<String> = self
                .ordering
                .iter()
                .map(|o| format!("{} {}", quote_ident(&o.field), o.direction.as_sql()))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", keys.join(", ")));
        }
        if let Some(limit) = self.limit {
            params.push(FieldValue::Integer(to_i64(limit)));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = self.offset {
            params.push(FieldValue::Integer(to_i64(offset)));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }

        SqlStatement { sql, params }
    }
}

impl Query for SqlQuery {
    fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn order_by(mut self, field: &str, direction: OrderDirection) -> Self {
        self.ordering.push(OrderBy::new(field, direction));
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

fn render_predicate(predicate: &Predicate, params: &mut Vec<FieldValue>) -> String {
    match predicate {
        Predicate::Condition(condition) => render_condition(condition, params),
        Predicate::Any(predicates) if predicates.is_empty() => "FALSE".to_string(),
        Predicate::All(predicates) if predicates.is_empty() => "TRUE".to_string(),
        Predicate::Any(predicates) => render_group(predicates, " OR ", params),
        Predicate::All(predicates) => render_group(predicates, " AND ", params),
    }
}

fn render_group(predicates: &[Predicate], joiner: &str, params: &mut Vec<FieldValue>) -> String {
    let parts: Vec<String> = predicates
        .iter()
        .map(|p| render_predicate(p, params))
        .collect();
    format!("({})", parts.join(joiner))
}

fn render_condition(condition: &FilterCondition, params: &mut Vec<FieldValue>) -> String {
    let field = quote_ident(&condition.field);
    match (&condition.operator, &condition.value) {
        (FilterOperator::IsNull | FilterOperator::IsNotNull, _) => {
            format!("{field} {}", condition.operator)
        }
        (FilterOperator::In, FilterValue::List(values)) if values.is_empty() => "FALSE".to_string(),
        (FilterOperator::In, FilterValue::List(values)) => {
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| {
                    params.push(v.clone());
                    format!("${}", params.len())
                })
                .collect();
            format!("{field} IN ({})", placeholders.join(", "))
        }
        (FilterOperator::In, FilterValue::Value(value)) => {
            params.push(value.clone());
            format!("{field} IN (${})", params.len())
        }
        (FilterOperator::NotEqual, FilterValue::Value(value)) => {
            params.push(value.clone());
            format!("{field} <> ${}", params.len())
        }
        (operator, FilterValue::Value(value)) => {
            params.push(value.clone());
            format!("{field} {operator} ${}", params.len())
        }
        // list on a scalar operator compares against the first element
        (operator, FilterValue::List(values)) => match values.first() {
            Some(value) => {
                params.push(value.clone());
                format!("{field} {operator} ${}", params.len())
            }
            None => "FALSE".to_string(),
        },
    }
}
