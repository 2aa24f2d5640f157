//! Query composition and execution traits
//!
//! Paginators are generic over two seams:
//!
//! - [`Query`]: a value that can be narrowed, sorted and windowed. Composition
//!   never touches the database.
//! - [`QueryExecutor`]: runs a query and returns rows or a scalar count.
//!
//! Both use RPITIT (Return Position Impl Trait In Traits), available since
//! Rust 1.75, so no `async_trait` is required.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_pagination::query::{QueryExecutor, QueryResult, SqlQuery};
//!
//! struct UserExecutor {
//!     pool: PgPool,
//! }
//!
//! impl QueryExecutor for UserExecutor {
//!     type Query = SqlQuery;
//!     type Row = User;
//!
//!     fn select_all(&self) -> SqlQuery {
//!         SqlQuery::select("users")
//!     }
//!
//!     fn count_all(&self) -> SqlQuery {
//!         SqlQuery::count("users")
//!     }
//!
//!     async fn execute(&self, query: SqlQuery) -> QueryResult<Vec<User>> {
//!         let statement = query.to_sql();
//!         // bind statement.params and fetch
//!         todo!()
//!     }
//!
//!     async fn scalar(&self, query: SqlQuery) -> QueryResult<Option<u64>> {
//!         todo!()
//!     }
//! }
//! ```

use std::future::Future;

use super::error::QueryResult;
use super::predicate::{OrderDirection, Predicate};
use crate::model::Model;

/// A composable, not-yet-executed query
///
/// Every method consumes the query and returns the narrowed one. Calling
/// `order_by` several times appends sort keys with left-to-right precedence.
pub trait Query: Clone + Send + Sync {
    /// Restrict results to rows matching the predicate
    #[must_use]
    fn filter(self, predicate: Predicate) -> Self;

    /// Append a sort key
    #[must_use]
    fn order_by(self, field: &str, direction: OrderDirection) -> Self;

    /// Skip the first `offset` rows
    #[must_use]
    fn offset(self, offset: u64) -> Self;

    /// Return at most `limit` rows
    #[must_use]
    fn limit(self, limit: u64) -> Self;
}

/// Runs queries against a backing store
pub trait QueryExecutor: Send + Sync {
    /// Query type accepted by this executor
    type Query: Query;

    /// Row type produced by this executor
    type Row: Model;

    /// Default data query: every row of the entity
    fn select_all(&self) -> Self::Query;

    /// Default count query: the number of rows of the entity
    fn count_all(&self) -> Self::Query;

    /// Fetch the rows selected by the query, in query order
    fn execute(
        &self,
        query: Self::Query,
    ) -> impl Future<Output = QueryResult<Vec<Self::Row>>> + Send;

    /// Evaluate a count query, `None` when the store returns no value
    fn scalar(&self, query: Self::Query) -> impl Future<Output = QueryResult<Option<u64>>> + Send;
}

impl<T: QueryExecutor> QueryExecutor for &T {
    type Query = T::Query;
    type Row = T::Row;

    fn select_all(&self) -> Self::Query {
        (**self).select_all()
    }

    fn count_all(&self) -> Self::Query {
        (**self).count_all()
    }

    fn execute(
        &self,
        query: Self::Query,
    ) -> impl Future<Output = QueryResult<Vec<Self::Row>>> + Send {
        (**self).execute(query)
    }

    fn scalar(&self, query: Self::Query) -> impl Future<Output = QueryResult<Option<u64>>> + Send {
        (**self).scalar(query)
    }
}
