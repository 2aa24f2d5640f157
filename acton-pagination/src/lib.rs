//! # acton-pagination
//!
//! Model-agnostic pagination for list endpoints.
//!
//! ## Features
//!
//! - **Limit/offset**: `?limit=&offset=` windows with a total count and page metadata
//! - **Cursor**: opaque `?cursor=` tokens over a fixed ordering, no count query
//! - **Filtering**: `?field=`, `?filter[field]=`, `?field__gte=`, `?field__in=a,b`
//! - **Search**: `?search=` / `?q=` as a case-insensitive OR across fields
//! - **Ordering**: `?ordering=-created_at,name` restricted to allowed fields
//! - **Storage seam**: [`Query`](query::Query) and [`QueryExecutor`](query::QueryExecutor)
//!   traits, with an in-memory store and a parameterised SQL renderer
//! - **axum**: envelopes and errors implement `IntoResponse` (`http` feature)
//!
//! ## Example
//!
//! ```rust
//! use acton_pagination::prelude::*;
//! use once_cell::sync::Lazy;
//!
//! #[derive(Clone)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     is_active: bool,
//! }
//!
//! static USER_SCHEMA: Lazy<Schema<User>> = Lazy::new(|| {
//!     Schema::<User>::builder("users")
//!         .field("id", FieldKind::Integer, |u| u.id.into())
//!         .field("name", FieldKind::String, |u| u.name.clone().into())
//!         .field("is_active", FieldKind::Boolean, |u| u.is_active.into())
//!         .build()
//! });
//!
//! impl Model for User {
//!     fn schema() -> &'static Schema<Self> {
//!         &USER_SCHEMA
//!     }
//! }
//!
//! let users: Vec<User> = (1..=30)
//!     .map(|id| User { id, name: format!("user-{id}"), is_active: id % 3 != 0 })
//!     .collect();
//! let config = PaginationConfig::default();
//!
//! let request = PageRequest::parse("https://api.example.com/users?is_active=true&limit=5")?;
//! let options = ListOptions::new()
//!     .with_filter_fields(vec![FilterField::new("is_active", FieldKind::Boolean)])
//!     .with_search_fields(["name"])
//!     .with_ordering_fields(["id", "name"])
//!     .with_default_ordering("-id");
//!
//! let paginator = LimitOffsetPaginator::from_request(
//!     BasePaginator::new(MemoryStore::new(users), request, options),
//!     &config.limit_offset,
//! );
//! let response = futures::executor::block_on(
//!     paginator.get_paginated_response(|u| u.name, true, "users"),
//! )?;
//!
//! assert_eq!(response.count, 20);
//! assert_eq!(response.data[0], "user-29");
//! assert_eq!(
//!     response.next.as_deref(),
//!     Some("https://api.example.com/users?is_active=true&limit=5&offset=5")
//! );
//! # Ok::<(), acton_pagination::PaginationError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod paginator;
pub mod params;
pub mod query;
pub mod request;
pub mod response;

#[cfg(test)]
mod testing;

pub use error::{PaginationError, Result};
pub use request::PageRequest;

#[cfg(feature = "http")]
pub use error::ErrorResponse;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::QueryBuilder;
    pub use crate::config::{CursorConfig, LimitOffsetConfig, LoggingConfig, PaginationConfig};
    pub use crate::error::{PaginationError, Result};
    pub use crate::model::{FieldKind, FieldValue, Model, Schema};
    pub use crate::observability::init_tracing;
    pub use crate::paginator::{
        BasePaginator, Cursor, CursorPage, CursorPaginator, LimitOffsetPaginator, ListOptions,
    };
    pub use crate::params::{FilterField, OrderingDirective, QueryParams};
    pub use crate::query::{
        FilterCondition, MemoryStore, OrderDirection, Predicate, Query, QueryError,
        QueryExecutor, QueryResult, SqlQuery,
    };
    pub use crate::request::PageRequest;
    pub use crate::response::{
        CursorInfo, CursorPaginatedResponse, PaginatedResponse, PaginationMeta,
    };

    #[cfg(feature = "http")]
    pub use crate::error::ErrorResponse;
}
