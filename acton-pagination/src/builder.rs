//! Applying extracted request parameters to a query
//!
//! [`QueryBuilder`] is bound to one entity's schema. Every operation is pure:
//! it consumes a [`Query`] and returns the narrowed query. References to
//! fields the entity does not declare are skipped silently.

use std::fmt;
use std::marker::PhantomData;

use crate::model::{Model, Schema};
use crate::params::{FilterMap, OrderingDirective};
use crate::query::{FilterCondition, FilterOperator, FilterValue, Predicate, Query};

/// Applies filters, search and ordering for entity `M`
///
/// # Example
///
/// ```rust,ignore
/// let builder = QueryBuilder::<User>::new();
/// let query = builder.apply_filters(store.select_all(), &filters);
/// let query = builder.apply_search(query, Some("john"), &["name".into(), "email".into()]);
/// let query = builder.apply_ordering(query, &[OrderingDirective::desc("created_at")]);
/// ```
pub struct QueryBuilder<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> QueryBuilder<M> {
    /// Builder for the entity's registered schema
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }

    fn schema(&self) -> &'static Schema<M> {
        M::schema()
    }

    /// Add one predicate per filter entry
    ///
    /// Bare keys become equality; `field__op` keys use the named operator.
    /// Unknown fields and unknown operators are skipped.
    pub fn apply_filters<Q: Query>(&self, query: Q, filters: &FilterMap) -> Q {
        let schema = self.schema();
        filters.iter().fold(query, |query, (key, value)| {
            let (field, operator) = match key.split_once("__") {
                Some((field, op)) => match parse_operator(op) {
                    Some(operator) => (field, operator),
                    None => return query,
                },
                None => (key.as_str(), FilterOperator::Equal),
            };
            if !schema.contains(field) {
                tracing::debug!(entity = schema.entity(), field, "skipping filter on unknown field");
                return query;
            }
            let value = match (operator, value) {
                (FilterOperator::In, FilterValue::Value(v)) => FilterValue::List(vec![v.clone()]),
                (FilterOperator::In, list @ FilterValue::List(_)) => list.clone(),
                (_, single @ FilterValue::Value(_)) => single.clone(),
                (_, FilterValue::List(_)) => return query,
            };
            query.filter(FilterCondition::new(field, operator, value).into())
        })
    }

    /// Add a single OR predicate of `ILIKE %text%` over the known search fields
    ///
    /// No-op when the text is absent or empty, or no search field is known.
    pub fn apply_search<Q: Query>(&self, query: Q, search: Option<&str>, fields: &[String]) -> Q {
        let Some(text) = search.filter(|s| !s.is_empty()) else {
            return query;
        };
        let schema = self.schema();
        let pattern = format!("%{text}%");
        let conditions: Vec<Predicate> = fields
            .iter()
            .filter(|f| schema.contains(f))
            .map(|f| FilterCondition::ilike(f.as_str(), pattern.clone()).into())
            .collect();

        if conditions.is_empty() {
            return query;
        }
        query.filter(Predicate::any(conditions))
    }

    /// Append one sort key per directive on a known field, in order
    pub fn apply_ordering<Q: Query>(&self, query: Q, ordering: &[OrderingDirective]) -> Q {
        let schema = self.schema();
        ordering
            .iter()
            .filter(|d| schema.contains(d.field()))
            .fold(query, |query, d| query.order_by(d.field(), d.direction()))
    }
}

impl<M: Model> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder").finish()
    }
}

fn parse_operator(op: &str) -> Option<FilterOperator> {
    match op {
        "gt" => Some(FilterOperator::GreaterThan),
        "gte" => Some(FilterOperator::GreaterThanOrEqual),
        "lt" => Some(FilterOperator::LessThan),
        "lte" => Some(FilterOperator::LessThanOrEqual),
        "ne" => Some(FilterOperator::NotEqual),
        "in" => Some(FilterOperator::In),
        "like" => Some(FilterOperator::Like),
        "ilike" => Some(FilterOperator::ILike),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldKind, FieldValue};
    use crate::params::{extract_filters, extract_ordering, FilterField, QueryParams};
    use crate::query::{MemoryStore, OrderBy, OrderDirection, QueryExecutor};
    use crate::testing::{people, Person};

    fn builder() -> QueryBuilder<Person> {
        QueryBuilder::new()
    }

    fn ids(rows: &[Person]) -> Vec<i64> {
        rows.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_filters_narrow_rows() {
        let store = MemoryStore::new(people());
        let params = QueryParams::parse("is_active=true&age__gte=18");
        let fields = vec![
            FilterField::new("is_active", FieldKind::Boolean),
            FilterField::new("age", FieldKind::Integer),
        ];
        let filters = extract_filters(&params, &fields).unwrap();

        let query = builder().apply_filters(store.select_all(), &filters);
        let rows = store.execute(query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].age, 20);
    }

    #[tokio::test]
    async fn test_in_filter() {
        let store = MemoryStore::new(people());
        let mut filters = FilterMap::new();
        filters.insert(
            "id__in".to_string(),
            FilterValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(3)]),
        );
        let query = builder().apply_filters(store.select_all(), &filters);
        assert_eq!(ids(&store.execute(query).await.unwrap()), vec![1, 3]);
    }

    #[test]
    fn test_unknown_filter_field_is_noop() {
        let mut filters = FilterMap::new();
        filters.insert("nickname".to_string(), FieldValue::from("jd").into());
        filters.insert("nickname__ne".to_string(), FieldValue::from("x").into());

        let query = builder().apply_filters(crate::query::MemoryQuery::default(), &filters);
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn test_unknown_operator_is_noop() {
        let mut filters = FilterMap::new();
        filters.insert("age__between".to_string(), FieldValue::Integer(3).into());
        let query = builder().apply_filters(crate::query::MemoryQuery::default(), &filters);
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn test_operator_mapping() {
        let mut filters = FilterMap::new();
        filters.insert("age__lt".to_string(), FieldValue::Integer(30).into());
        let query = builder().apply_filters(crate::query::MemoryQuery::default(), &filters);
        assert_eq!(
            query.predicates().to_vec(),
            vec![Predicate::from(FilterCondition::lt("age", 30_i64))]
        );
    }

    #[tokio::test]
    async fn test_search_matches_any_field() {
        let store = MemoryStore::new(people());
        let fields = vec!["name".to_string(), "email".to_string()];
        let query = builder().apply_search(store.select_all(), Some("john"), &fields);
        let rows = store.execute(query).await.unwrap();
        assert_eq!(ids(&rows), vec![1]);
    }

    #[test]
    fn test_search_noops() {
        let fields = vec!["name".to_string()];
        let b = builder();
        let base = crate::query::MemoryQuery::default();

        assert!(b.apply_search(base.clone(), None, &fields).predicates().is_empty());
        assert!(b.apply_search(base.clone(), Some(""), &fields).predicates().is_empty());
        assert!(b.apply_search(base.clone(), Some("x"), &[]).predicates().is_empty());
        assert!(b
            .apply_search(base, Some("x"), &["nickname".to_string()])
            .predicates()
            .is_empty());
    }

    #[test]
    fn test_ordering_skips_unknown_fields() {
        let params = QueryParams::parse("ordering=-created_at,foo");
        let allowed = vec!["created_at".to_string(), "foo".to_string()];
        let ordering = extract_ordering(&params, &allowed, None);
        assert_eq!(ordering.len(), 2);

        let query = builder().apply_ordering(crate::query::MemoryQuery::default(), &ordering);
        assert_eq!(
            query.ordering(),
            &[OrderBy::new("created_at", OrderDirection::Descending)]
        );
    }

    #[tokio::test]
    async fn test_ordering_applies_in_precedence() {
        let store = MemoryStore::new(people());
        let ordering = vec![OrderingDirective::asc("is_active"), OrderingDirective::desc("age")];
        let query = builder().apply_ordering(store.select_all(), &ordering);
        assert_eq!(ids(&store.execute(query).await.unwrap()), vec![3, 2, 1]);
    }
}
