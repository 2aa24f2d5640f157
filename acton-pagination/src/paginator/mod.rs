//! Paginators
//!
//! Both paginators wrap a [`BasePaginator`], which owns the executor, the
//! request and the endpoint's [`ListOptions`], and turns them into data and
//! count queries:
//!
//! 1. base query (or [`QueryExecutor::select_all`])
//! 2. mandatory predicates
//! 3. filters from the query string
//! 4. search
//! 5. ordering from the query string (data query only)
//!
//! [`LimitOffsetPaginator`] windows the ordered data query and reports a
//! total count. [`CursorPaginator`] orders by a fixed key and resumes from an
//! opaque token, never counting.

mod codec;
mod cursor;
mod limit_offset;

use std::fmt;

use crate::builder::QueryBuilder;
use crate::error::Result;
use crate::params::{
    extract_filters, extract_ordering, extract_search, FilterField, OrderingDirective,
};
use crate::query::{Predicate, Query, QueryExecutor};
use crate::request::PageRequest;

pub use codec::{Cursor, CursorCodec};
pub use cursor::{CursorPage, CursorPaginator};
pub use limit_offset::LimitOffsetPaginator;

/// What an endpoint lets clients filter, search and sort on
///
/// # Example
///
/// ```rust
/// use acton_pagination::model::FieldKind;
/// use acton_pagination::paginator::ListOptions;
/// use acton_pagination::params::FilterField;
/// use acton_pagination::query::{FilterCondition, MemoryQuery};
///
/// let options = ListOptions::<MemoryQuery>::new()
///     .with_filter_fields(vec![FilterField::new("is_active", FieldKind::Boolean)])
///     .with_search_fields(["name", "email"])
///     .with_ordering_fields(["created_at", "name"])
///     .with_default_ordering("-created_at")
///     .with_additional_filter(FilterCondition::is_null("deleted_at"));
///
/// assert_eq!(options.search_fields, vec!["name", "email"]);
/// ```
#[derive(Clone)]
pub struct ListOptions<Q> {
    /// Fields accepted as `?field=` / `?field__op=` filters
    pub filter_fields: Vec<FilterField>,
    /// Fields matched by `?search=` / `?q=`
    pub search_fields: Vec<String>,
    /// Fields accepted in `?ordering=`
    pub ordering_fields: Vec<String>,
    /// Ordering used when the request gives none that is allowed
    pub default_ordering: Option<OrderingDirective>,
    /// Data query to start from instead of `select_all`
    pub base_query: Option<Q>,
    /// Predicates applied to every data and count query
    pub additional_filters: Vec<Predicate>,
    /// Count query to start from instead of `count_all`
    pub count_query: Option<Q>,
    /// Search text overriding `?search=` / `?q=` when non-empty
    pub search_query: Option<String>,
}

impl<Q> ListOptions<Q> {
    /// Options with nothing filterable, searchable or sortable
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter_fields: Vec::new(),
            search_fields: Vec::new(),
            ordering_fields: Vec::new(),
            default_ordering: None,
            base_query: None,
            additional_filters: Vec::new(),
            count_query: None,
            search_query: None,
        }
    }

    #[must_use]
    pub fn with_filter_fields(mut self, fields: Vec<FilterField>) -> Self {
        self.filter_fields = fields;
        self
    }

    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_ordering_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ordering_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Default ordering in query-string form, e.g. `-created_at`
    #[must_use]
    pub fn with_default_ordering(mut self, ordering: impl Into<OrderingDirective>) -> Self {
        self.default_ordering = Some(ordering.into());
        self
    }

    #[must_use]
    pub fn with_base_query(mut self, query: Q) -> Self {
        self.base_query = Some(query);
        self
    }

    /// Add a predicate every query must satisfy
    #[must_use]
    pub fn with_additional_filter(mut self, predicate: impl Into<Predicate>) -> Self {
        self.additional_filters.push(predicate.into());
        self
    }

    #[must_use]
    pub fn with_count_query(mut self, query: Q) -> Self {
        self.count_query = Some(query);
        self
    }

    #[must_use]
    pub fn with_search_query(mut self, search: impl Into<String>) -> Self {
        self.search_query = Some(search.into());
        self
    }
}

impl<Q> Default for ListOptions<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for ListOptions<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOptions")
            .field("filter_fields", &self.filter_fields)
            .field("search_fields", &self.search_fields)
            .field("ordering_fields", &self.ordering_fields)
            .field("default_ordering", &self.default_ordering)
            .field("has_base_query", &self.base_query.is_some())
            .field("additional_filters", &self.additional_filters)
            .field("has_count_query", &self.count_query.is_some())
            .field("search_query", &self.search_query)
            .finish()
    }
}

/// Query construction shared by both paginators
pub struct BasePaginator<E: QueryExecutor> {
    executor: E,
    request: PageRequest,
    options: ListOptions<E::Query>,
    builder: QueryBuilder<E::Row>,
}

impl<E: QueryExecutor> BasePaginator<E> {
    pub fn new(executor: E, request: PageRequest, options: ListOptions<E::Query>) -> Self {
        Self {
            executor,
            request,
            options,
            builder: QueryBuilder::new(),
        }
    }

    pub const fn executor(&self) -> &E {
        &self.executor
    }

    pub const fn request(&self) -> &PageRequest {
        &self.request
    }

    pub const fn options(&self) -> &ListOptions<E::Query> {
        &self.options
    }

    /// Search text in effect: the explicit override, else `search`, else `q`
    pub fn search_text(&self) -> Option<String> {
        self.options
            .search_query
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| extract_search(self.request.params()))
    }

    /// Mandatory predicates, filters and search applied to `query`
    fn narrow(&self, query: E::Query) -> Result<E::Query> {
        let query = self
            .options
            .additional_filters
            .iter()
            .cloned()
            .fold(query, |query, predicate| query.filter(predicate));

        let filters = extract_filters(self.request.params(), &self.options.filter_fields)?;
        let query = self.builder.apply_filters(query, &filters);

        let search = self.search_text();
        Ok(self
            .builder
            .apply_search(query, search.as_deref(), &self.options.search_fields))
    }

    /// Data query without ordering
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::TypeCoercion`](crate::PaginationError::TypeCoercion)
    /// when a filter value cannot be coerced to its field's kind.
    pub fn build_filtered_query(&self) -> Result<E::Query> {
        let base = self
            .options
            .base_query
            .clone()
            .unwrap_or_else(|| self.executor.select_all());
        self.narrow(base)
    }

    /// Data query with the requested (or default) ordering applied
    ///
    /// # Errors
    ///
    /// Same as [`build_filtered_query`](Self::build_filtered_query).
    pub fn build_data_query(&self) -> Result<E::Query> {
        let query = self.build_filtered_query()?;
        let ordering = extract_ordering(
            self.request.params(),
            &self.options.ordering_fields,
            self.options.default_ordering.as_ref(),
        );
        tracing::debug!(
            ordering = ?ordering.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "built data query"
        );
        Ok(self.builder.apply_ordering(query, &ordering))
    }

    /// Number of rows matching the predicates, filters and search
    ///
    /// A store returning no value counts as zero.
    ///
    /// # Errors
    ///
    /// Coercion failures as for [`build_filtered_query`](Self::build_filtered_query),
    /// and [`PaginationError::Query`](crate::PaginationError::Query) when the
    /// count query fails.
    pub async fn get_total_count(&self) -> Result<u64> {
        let base = self
            .options
            .count_query
            .clone()
            .unwrap_or_else(|| self.executor.count_all());
        let query = self.narrow(base)?;
        let count = self.executor.scalar(query).await?.unwrap_or(0);
        tracing::debug!(count, "counted rows");
        Ok(count)
    }

    /// Current request URL with the given parameters replaced or removed
    ///
    /// See [`PageRequest::with_params`].
    pub fn build_url(&self, overrides: &[(&str, Option<String>)]) -> String {
        self.request.with_params(overrides)
    }
}

impl<E: QueryExecutor + fmt::Debug> fmt::Debug for BasePaginator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasePaginator")
            .field("executor", &self.executor)
            .field("request", &self.request)
            .field("options", &self.options)
            .finish()
    }
}
