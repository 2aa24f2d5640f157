//! `?limit=&offset=` pagination with a total count

use futures::TryFutureExt;

use crate::config::LimitOffsetConfig;
use crate::error::{PaginationError, Result};
use crate::query::{Query, QueryExecutor};
use crate::response::{PaginatedResponse, PaginationMeta};

use super::BasePaginator;

/// Offset-window paginator
///
/// # Example
///
/// ```rust
/// # use acton_pagination::model::{FieldKind, Model, Schema};
/// # use once_cell::sync::Lazy;
/// # #[derive(Clone)]
/// # struct Item { id: i64 }
/// # static SCHEMA: Lazy<Schema<Item>> = Lazy::new(|| {
/// #     Schema::<Item>::builder("items").field("id", FieldKind::Integer, |i| i.id.into()).build()
/// # });
/// # impl Model for Item { fn schema() -> &'static Schema<Self> { &SCHEMA } }
/// use acton_pagination::paginator::{BasePaginator, LimitOffsetPaginator, ListOptions};
/// use acton_pagination::query::MemoryStore;
/// use acton_pagination::PageRequest;
///
/// let store = MemoryStore::new((1..=25).map(|id| Item { id }).collect());
/// let request = PageRequest::parse("https://api.example.com/items?limit=10&offset=10").unwrap();
/// let base = BasePaginator::new(store, request, ListOptions::new().with_default_ordering("id"));
/// let paginator = LimitOffsetPaginator::new(base, 10, 10, 100);
///
/// let response = futures::executor::block_on(
///     paginator.get_paginated_response(|item| item.id, true, ""),
/// ).unwrap();
///
/// assert_eq!(response.count, 25);
/// assert_eq!(response.data.first(), Some(&11));
/// assert_eq!(
///     response.next.as_deref(),
///     Some("https://api.example.com/items?limit=10&offset=20")
/// );
/// assert_eq!(response.meta.unwrap().current_page, 2);
/// ```
pub struct LimitOffsetPaginator<E: QueryExecutor> {
    base: BasePaginator<E>,
    limit: u64,
    offset: u64,
}

impl<E: QueryExecutor> LimitOffsetPaginator<E> {
    /// Clamp `limit` to `[1, max_limit]` and `offset` to at least 0
    pub fn new(base: BasePaginator<E>, limit: i64, offset: i64, max_limit: u64) -> Self {
        let limit = u64::try_from(limit.max(1))
            .unwrap_or(1)
            .min(max_limit.max(1));
        let offset = u64::try_from(offset).unwrap_or(0);
        Self {
            base,
            limit,
            offset,
        }
    }

    /// Read `limit` and `offset` from the request
    ///
    /// A missing or unparsable `limit` uses the configured default; a missing
    /// or unparsable `offset` is 0.
    pub fn from_request(base: BasePaginator<E>, config: &LimitOffsetConfig) -> Self {
        let params = base.request().params();
        let default_limit = i64::try_from(config.default_limit).unwrap_or(i64::MAX);
        let limit = params
            .get("limit")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(default_limit);
        let offset = params
            .get("offset")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        Self::new(base, limit, offset, config.max_limit)
    }

    pub const fn base(&self) -> &BasePaginator<E> {
        &self.base
    }

    pub const fn limit(&self) -> u64 {
        self.limit
    }

    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Fetch the current window and the total count concurrently
    ///
    /// # Errors
    ///
    /// Filter coercion failures and query failures from either query.
    pub async fn paginate(&self) -> Result<(Vec<E::Row>, u64)> {
        let query = self
            .base
            .build_data_query()?
            .offset(self.offset)
            .limit(self.limit);

        let fetch = self
            .base
            .executor()
            .execute(query)
            .map_err(PaginationError::from);
        let (rows, total) = futures::try_join!(fetch, self.base.get_total_count())?;

        tracing::debug!(
            limit = self.limit,
            offset = self.offset,
            rows = rows.len(),
            total,
            "fetched limit/offset page"
        );
        Ok((rows, total))
    }

    /// Paginate and assemble the response envelope
    ///
    /// Rows pass through `projector` in order. Links are only produced when
    /// there is at least one matching row.
    ///
    /// # Errors
    ///
    /// Same as [`paginate`](Self::paginate).
    pub async fn get_paginated_response<T, F>(
        &self,
        projector: F,
        include_meta: bool,
        message: impl Into<String>,
    ) -> Result<PaginatedResponse<T>>
    where
        F: FnMut(E::Row) -> T,
    {
        let (rows, total) = self.paginate().await?;
        let meta = PaginationMeta::new(total, self.limit, self.offset);

        let (next, previous) = if total > 0 {
            let next = meta.has_next.then(|| self.link(self.offset + self.limit));
            let previous = (self.offset > 0)
                .then(|| self.link(self.offset.saturating_sub(self.limit)));
            (next, previous)
        } else {
            (None, None)
        };

        let data = rows.into_iter().map(projector).collect();
        let mut response = PaginatedResponse::new(data, total)
            .with_message(message)
            .with_links(next, previous);
        if include_meta {
            response = response.with_meta(meta);
        }
        Ok(response)
    }

    fn link(&self, offset: u64) -> String {
        self.base.build_url(&[
            ("limit", Some(self.limit.to_string())),
            ("offset", Some(offset.to_string())),
        ])
    }
}
