//! In-memory query executor
//!
//! [`MemoryStore`] evaluates [`MemoryQuery`] values against a vector of rows
//! using the entity's [`Schema`](crate::model::Schema) accessors. It serves
//! small static datasets and is the store used throughout the crate's tests.

use std::cmp::Ordering;
use std::sync::Arc;

use regex::RegexBuilder;

use super::error::QueryResult;
use super::executor::{Query, QueryExecutor};
use super::predicate::{FilterCondition, FilterOperator, FilterValue, OrderBy, OrderDirection, Predicate};
use crate::model::{FieldValue, Model, Schema};

/// Query description evaluated by [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    predicates: Vec<Predicate>,
    ordering: Vec<OrderBy>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl MemoryQuery {
    /// Predicates applied so far, all of which must hold
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Sort keys applied so far
    #[must_use]
    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    /// Row offset, if set
    #[must_use]
    pub const fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Row limit, if set
    #[must_use]
    pub const fn limit_value(&self) -> Option<u64> {
        self.limit
    }
}

impl Query for MemoryQuery {
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

/// Executor over an immutable, shared vector of rows
///
/// # Example
///
/// ```rust
/// # use acton_pagination::model::{FieldKind, Model, Schema};
/// # use once_cell::sync::Lazy;
/// # #[derive(Clone)]
/// # struct Tag { id: i64 }
/// # static TAG: Lazy<Schema<Tag>> = Lazy::new(|| {
/// #     Schema::<Tag>::builder("tags").field("id", FieldKind::Integer, |t| t.id.into()).build()
/// # });
/// # impl Model for Tag { fn schema() -> &'static Schema<Self> { &TAG } }
/// use acton_pagination::query::{FilterCondition, MemoryStore, Query, QueryExecutor};
///
/// let store = MemoryStore::new(vec![Tag { id: 1 }, Tag { id: 2 }, Tag { id: 3 }]);
/// let query = store.select_all().filter(FilterCondition::gt("id", 1_i64).into());
/// let rows = futures::executor::block_on(store.execute(query)).unwrap();
/// assert_eq!(rows.len(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryStore<M> {
    rows: Arc<Vec<M>>,
}

impl<M> Clone for MemoryStore<M> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<M: Model + Clone> MemoryStore<M> {
    /// Create a store over the given rows
    #[must_use]
    pub fn new(rows: Vec<M>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// Number of rows held by the store
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn matching(&self, query: &MemoryQuery) -> Vec<&M> {
        let schema = M::schema();
        self.rows
            .iter()
            .filter(|row| query.predicates.iter().all(|p| evaluate(schema, row, p)))
            .collect()
    }
}

impl<M: Model + Clone> QueryExecutor for MemoryStore<M> {
    type Query = MemoryQuery;
    type Row = M;

    fn select_all(&self) -> MemoryQuery {
        MemoryQuery::default()
    }

    fn count_all(&self) -> MemoryQuery {
        MemoryQuery::default()
    }

    async fn execute(&self, query: MemoryQuery) -> QueryResult<Vec<M>> {
        let schema = M::schema();
        let mut rows = self.matching(&query);
        rows.sort_by(|a, b| compare_rows(schema, a, b, &query.ordering));

        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        let page: Vec<M> = rows.into_iter().skip(offset).take(limit).cloned().collect();
        tracing::trace!(
            entity = schema.entity(),
            rows = page.len(),
            "memory store fetch"
        );
        Ok(page)
    }

    async fn scalar(&self, query: MemoryQuery) -> QueryResult<Option<u64>> {
        Ok(Some(self.matching(&query).len() as u64))
    }
}

fn compare_rows<M>(schema: &Schema<M>, a: &M, b: &M, ordering: &[OrderBy]) -> Ordering {
    for order in ordering {
        let left = schema.value_of(a, &order.field).unwrap_or(FieldValue::Null);
        let right = schema.value_of(b, &order.field).unwrap_or(FieldValue::Null);
        let ordering = sort_order(&left, &right);
        let ordering = match order.direction {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// NULL sorts after every value ascending, before every value descending.
fn sort_order(left: &FieldValue, right: &FieldValue) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
    }
}

fn evaluate<M>(schema: &Schema<M>, row: &M, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Condition(condition) => matches_condition(schema, row, condition),
        Predicate::Any(predicates) => predicates.iter().any(|p| evaluate(schema, row, p)),
        Predicate::All(predicates) => predicates.iter().all(|p| evaluate(schema, row, p)),
    }
}

fn matches_condition<M>(schema: &Schema<M>, row: &M, condition: &FilterCondition) -> bool {
    let actual = schema
        .value_of(row, &condition.field)
        .unwrap_or(FieldValue::Null);

    match condition.operator {
        FilterOperator::IsNull => return actual.is_null(),
        FilterOperator::IsNotNull => return !actual.is_null(),
        _ => {}
    }
    if actual.is_null() {
        return false;
    }

    match (&condition.operator, &condition.value) {
        (FilterOperator::In, FilterValue::List(values)) => values
            .iter()
            .any(|v| actual.compare(v) == Some(Ordering::Equal)),
        (FilterOperator::Like, FilterValue::Value(FieldValue::String(pattern))) => {
            like(&actual.to_string(), pattern, false)
        }
        (FilterOperator::ILike, FilterValue::Value(FieldValue::String(pattern))) => {
            like(&actual.to_string(), pattern, true)
        }
        (operator, FilterValue::Value(expected)) => {
            let Some(ordering) = actual.compare(expected) else {
                return false;
            };
            match operator {
                FilterOperator::Equal => ordering == Ordering::Equal,
                FilterOperator::NotEqual => ordering != Ordering::Equal,
                FilterOperator::GreaterThan => ordering == Ordering::Greater,
                FilterOperator::GreaterThanOrEqual => ordering != Ordering::Less,
                FilterOperator::LessThan => ordering == Ordering::Less,
                FilterOperator::LessThanOrEqual => ordering != Ordering::Greater,
                _ => false,
            }
        }
        _ => false,
    }
}

/// SQL LIKE: `%` matches any run, `_` any single character
fn like(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '%' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');

    RegexBuilder::new(&expr)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .is_ok_and(|re| re.is_match(text))
}
