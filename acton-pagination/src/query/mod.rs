//! Abstract queries and their execution
//!
//! - [`predicate`]: filter conditions, boolean combinations, sort directions
//! - [`Query`] / [`QueryExecutor`]: the seams paginators are generic over
//! - [`MemoryStore`]: executor over in-memory rows
//! - [`SqlQuery`]: query rendering parameterised PostgreSQL

mod error;
mod executor;
mod memory;
pub mod predicate;
mod sql;

pub use error::{QueryError, QueryErrorKind, QueryOperation, QueryResult};
pub use executor::{Query, QueryExecutor};
pub use memory::{MemoryQuery, MemoryStore};
pub use predicate::{
    FilterCondition, FilterOperator, FilterValue, OrderBy, OrderDirection, Predicate,
};
pub use sql::{Projection, SqlQuery, SqlStatement};
