//! Cursor pagination over a fixed ordering
//!
//! The first ordering field is the position key. A page is fetched with one
//! extra peek row; the peek row's position is where the following page
//! resumes. Rows that share a position with the page boundary are skipped
//! with the cursor offset, so duplicate keys neither repeat nor vanish while
//! the data is unchanged.

use crate::config::CursorConfig;
use crate::error::{PaginationError, Result};
use crate::model::{FieldDef, FieldValue, Model};
use crate::params::OrderingDirective;
use crate::query::{FilterCondition, FilterOperator, Query, QueryExecutor};
use crate::request::query_param;
use crate::response::{CursorInfo, CursorPaginatedResponse};

use super::codec::{Cursor, CursorCodec};
use super::BasePaginator;

const DEFAULT_CURSOR_PARAM: &str = "cursor";
const DEFAULT_PAGE_SIZE: u64 = 10;
const DEFAULT_OFFSET_CUTOFF: u64 = 1000;
const DEFAULT_MAX_TOKEN_LEN: usize = 4096;

/// One fetched cursor page and the state needed to link its neighbours
#[derive(Debug, Clone)]
pub struct CursorPage<R> {
    rows: Vec<R>,
    positions: Vec<String>,
    cursor: Cursor,
    has_next: bool,
    has_previous: bool,
    next_position: Option<String>,
    previous_position: Option<String>,
}

impl<R> CursorPage<R> {
    /// Rows in display order
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Rendered position key of each row, aligned with [`rows`](Self::rows)
    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    /// Cursor the page was fetched with (the default cursor on a first page)
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub const fn has_next(&self) -> bool {
        self.has_next
    }

    pub const fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn next_position(&self) -> Option<&str> {
        self.next_position.as_deref()
    }

    pub fn previous_position(&self) -> Option<&str> {
        self.previous_position.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

/// Opaque-token paginator
///
/// # Example
///
/// ```rust
/// # use acton_pagination::model::{FieldKind, Model, Schema};
/// # use once_cell::sync::Lazy;
/// # #[derive(Clone)]
/// # struct Post { id: i64 }
/// # static SCHEMA: Lazy<Schema<Post>> = Lazy::new(|| {
/// #     Schema::<Post>::builder("posts").field("id", FieldKind::Integer, |p| p.id.into()).build()
/// # });
/// # impl Model for Post { fn schema() -> &'static Schema<Self> { &SCHEMA } }
/// use acton_pagination::paginator::{BasePaginator, CursorPaginator, ListOptions};
/// use acton_pagination::query::MemoryStore;
/// use acton_pagination::PageRequest;
///
/// let store = MemoryStore::new((1..=25).map(|id| Post { id }).collect());
/// let request = PageRequest::parse("https://api.example.com/posts").unwrap();
/// let paginator = CursorPaginator::new(BasePaginator::new(store, request, ListOptions::new()))
///     .with_page_size(10)
///     .with_ordering(["-id"]);
///
/// let response = futures::executor::block_on(
///     paginator.get_paginated_response(|post| post.id, ""),
/// ).unwrap();
///
/// assert_eq!(response.data.first(), Some(&25));
/// assert!(response.cursor_info.has_next);
/// assert!(response.next.unwrap().contains("cursor="));
/// assert_eq!(response.previous, None);
/// ```
pub struct CursorPaginator<E: QueryExecutor> {
    base: BasePaginator<E>,
    cursor_param: String,
    page_size: u64,
    ordering: Vec<OrderingDirective>,
    codec: CursorCodec,
}

impl<E: QueryExecutor> CursorPaginator<E> {
    /// Paginator over `-id`, 10 rows per page, read from `?cursor=`
    pub fn new(base: BasePaginator<E>) -> Self {
        Self {
            base,
            cursor_param: DEFAULT_CURSOR_PARAM.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            ordering: vec![OrderingDirective::desc("id")],
            codec: CursorCodec::new(DEFAULT_OFFSET_CUTOFF, DEFAULT_MAX_TOKEN_LEN),
        }
    }

    pub fn from_config(base: BasePaginator<E>, config: &CursorConfig) -> Self {
        Self::new(base)
            .with_cursor_param(config.query_param.clone())
            .with_page_size(config.page_size)
            .with_codec(CursorCodec::new(config.offset_cutoff, config.max_token_len))
    }

    #[must_use]
    pub fn with_cursor_param(mut self, param: impl Into<String>) -> Self {
        self.cursor_param = param.into();
        self
    }

    /// Rows per page, at least 1
    #[must_use]
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sort keys in query-string form; the first is the position key
    ///
    /// An empty list keeps the current ordering.
    #[must_use]
    pub fn with_ordering<I, S>(mut self, ordering: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OrderingDirective>,
    {
        let ordering: Vec<OrderingDirective> = ordering.into_iter().map(Into::into).collect();
        if !ordering.is_empty() {
            self.ordering = ordering;
        }
        self
    }

    #[must_use]
    pub fn with_offset_cutoff(mut self, offset_cutoff: u64) -> Self {
        self.codec = CursorCodec::new(offset_cutoff, self.codec.max_token_len());
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: CursorCodec) -> Self {
        self.codec = codec;
        self
    }

    pub const fn base(&self) -> &BasePaginator<E> {
        &self.base
    }

    pub fn cursor_param(&self) -> &str {
        &self.cursor_param
    }

    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn ordering(&self) -> &[OrderingDirective] {
        &self.ordering
    }

    /// Cursor carried by the request, `None` when absent or malformed
    pub fn decode_cursor(&self) -> Option<Cursor> {
        let token = self.base.request().params().get(&self.cursor_param)?;
        self.codec.decode(token)
    }

    /// Current request URL with the cursor parameter set to `cursor`'s token
    pub fn encode_cursor(&self, cursor: &Cursor) -> String {
        let token = self.codec.encode(cursor);
        self.base.build_url(&[(self.cursor_param.as_str(), Some(token))])
    }

    /// Position key definition, after checking every ordering field exists
    fn position_key(&self) -> Result<(&OrderingDirective, &'static FieldDef<E::Row>)> {
        let schema = <E::Row as Model>::schema();
        for directive in &self.ordering {
            if !schema.contains(directive.field()) {
                tracing::error!(
                    entity = schema.entity(),
                    field = directive.field(),
                    "cursor ordering field does not exist"
                );
                return Err(PaginationError::missing_ordering_field(directive.field()));
            }
        }
        let key = self
            .ordering
            .first()
            .ok_or_else(|| PaginationError::missing_ordering_field(""))?;
        let def = schema
            .field(key.field())
            .ok_or_else(|| PaginationError::missing_ordering_field(key.field()))?;
        Ok((key, def))
    }

    /// Fetch the page the request's cursor points at
    ///
    /// # Errors
    ///
    /// [`PaginationError::MissingOrderingField`] when an ordering field is not
    /// declared by the row's schema, filter coercion failures, and query
    /// failures.
    pub async fn paginate(&self) -> Result<CursorPage<E::Row>> {
        let (key, def) = self.position_key()?;
        let cursor = self.decode_cursor().unwrap_or_default();

        let mut query = self.base.build_filtered_query()?;
        for directive in &self.ordering {
            let directive = if cursor.reverse {
                directive.reversed()
            } else {
                directive.clone()
            };
            query = query.order_by(directive.field(), directive.direction());
        }

        if let Some(position) = &cursor.position {
            let value = def
                .kind()
                .coerce(position)
                .unwrap_or_else(|| FieldValue::String(position.clone()));
            let operator = if cursor.reverse != key.is_descending() {
                FilterOperator::LessThan
            } else {
                FilterOperator::GreaterThan
            };
            query = query.filter(FilterCondition::new(key.field(), operator, value.into()).into());
        }

        let query = query.offset(cursor.offset).limit(self.page_size.saturating_add(1));
        let mut rows = self.base.executor().execute(query).await?;

        let page_len = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        let following = if rows.len() > page_len {
            rows.last().map(|row| def.read(row).to_string())
        } else {
            None
        };
        rows.truncate(page_len);
        if cursor.reverse {
            rows.reverse();
        }
        let positions = rows.iter().map(|row| def.read(row).to_string()).collect();

        let current = cursor.position.clone();
        let resumed = current.is_some() || cursor.offset > 0;
        let (has_next, has_previous, next_position, previous_position) = if cursor.reverse {
            let next = if resumed { current } else { None };
            (resumed, following.is_some(), next, following)
        } else {
            let previous = if resumed { current } else { None };
            (following.is_some(), resumed, following, previous)
        };

        tracing::debug!(
            rows = rows.len(),
            offset = cursor.offset,
            reverse = cursor.reverse,
            has_next,
            has_previous,
            "fetched cursor page"
        );

        Ok(CursorPage {
            rows,
            positions,
            cursor,
            has_next,
            has_previous,
            next_position,
            previous_position,
        })
    }

    /// Link to the page after `page`, `None` on the last page
    pub fn get_next_link<R>(&self, page: &CursorPage<R>) -> Option<String> {
        if !page.has_next {
            return None;
        }
        let cursor = &page.cursor;
        let positions = &page.positions;

        let mut compare = if !positions.is_empty() && cursor.reverse && cursor.offset != 0 {
            positions.last().map(String::as_str)
        } else {
            page.next_position.as_deref()
        };

        let mut offset = 0;
        let mut boundary = None;
        for position in positions.iter().rev() {
            if compare != Some(position.as_str()) {
                boundary = Some(position.clone());
                break;
            }
            compare = Some(position);
            offset += 1;
        }

        let next = match boundary {
            Some(position) => Cursor::new(offset, false, Some(position)),
            None if positions.is_empty() => Cursor::new(0, false, page.next_position.clone()),
            // every row shares one position
            None if !page.has_previous => Cursor::new(self.page_size, false, None),
            None if cursor.reverse => Cursor::new(0, false, page.previous_position.clone()),
            None => Cursor::new(
                cursor.offset.saturating_add(self.page_size),
                false,
                page.previous_position.clone(),
            ),
        };
        Some(self.encode_cursor(&next))
    }

    /// Link to the page before `page`, `None` on the first page
    pub fn get_previous_link<R>(&self, page: &CursorPage<R>) -> Option<String> {
        if !page.has_previous {
            return None;
        }
        let cursor = &page.cursor;
        let positions = &page.positions;

        let mut compare = if !positions.is_empty() && !cursor.reverse && cursor.offset != 0 {
            positions.first().map(String::as_str)
        } else {
            page.previous_position.as_deref()
        };

        let mut offset = 0;
        let mut boundary = None;
        for position in positions {
            if compare != Some(position.as_str()) {
                boundary = Some(position.clone());
                break;
            }
            compare = Some(position);
            offset += 1;
        }

        let previous = match boundary {
            Some(position) => Cursor::new(offset, true, Some(position)),
            None if positions.is_empty() => {
                Cursor::new(0, true, page.previous_position.clone())
            }
            // every row shares one position
            None if !page.has_next => Cursor::new(self.page_size, true, None),
            None if cursor.reverse => Cursor::new(
                cursor.offset.saturating_add(self.page_size),
                true,
                page.next_position.clone(),
            ),
            None => Cursor::new(0, true, page.next_position.clone()),
        };
        Some(self.encode_cursor(&previous))
    }

    /// Paginate and assemble the response envelope
    ///
    /// No count query is issued. `cursor_info` carries the bare tokens of the
    /// two links.
    ///
    /// # Errors
    ///
    /// Same as [`paginate`](Self::paginate).
    pub async fn get_paginated_response<T, F>(
        &self,
        projector: F,
        message: impl Into<String>,
    ) -> Result<CursorPaginatedResponse<T>>
    where
        F: FnMut(E::Row) -> T,
    {
        let page = self.paginate().await?;
        let next = self.get_next_link(&page);
        let previous = self.get_previous_link(&page);

        let cursor_info = CursorInfo {
            has_next: page.has_next,
            has_previous: page.has_previous,
            next_cursor: next
                .as_deref()
                .and_then(|link| query_param(link, &self.cursor_param)),
            previous_cursor: previous
                .as_deref()
                .and_then(|link| query_param(link, &self.cursor_param)),
        };

        Ok(CursorPaginatedResponse {
            message: message.into(),
            next,
            previous,
            cursor_info,
            data: page.into_rows().into_iter().map(projector).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldKind;
    use crate::paginator::ListOptions;
    use crate::params::FilterField;
    use crate::query::MemoryStore;
    use crate::request::PageRequest;
    use crate::testing::{numbered, tied, Person};

    const ROOT: &str = "http://testserver/api/people";

    fn paginator(url: &str, rows: Vec<Person>) -> CursorPaginator<MemoryStore<Person>> {
        let options = ListOptions::new()
            .with_filter_fields(vec![FilterField::new("is_active", FieldKind::Boolean)]);
        let request = PageRequest::parse(url).unwrap();
        let base = BasePaginator::new(MemoryStore::new(rows), request, options);
        CursorPaginator::new(base).with_page_size(10)
    }

    async fn respond(url: &str, rows: Vec<Person>) -> CursorPaginatedResponse<i64> {
        paginator(url, rows)
            .get_paginated_response(|p| p.id, "")
            .await
            .unwrap()
    }

    fn decode(link: &str) -> Cursor {
        let token = query_param(link, "cursor").unwrap();
        CursorCodec::new(1000, 4096).decode(&token).unwrap()
    }

    #[tokio::test]
    async fn test_first_page() {
        let response = respond(ROOT, numbered(25)).await;
        assert_eq!(response.data, (16..=25).rev().collect::<Vec<_>>());
        assert!(response.cursor_info.has_next);
        assert!(!response.cursor_info.has_previous);
        assert_eq!(response.previous, None);
        assert_eq!(response.cursor_info.previous_cursor, None);

        let next = response.next.unwrap();
        assert_eq!(decode(&next), Cursor::new(0, false, Some("16".to_string())));
        assert_eq!(
            response.cursor_info.next_cursor,
            query_param(&next, "cursor")
        );
    }

    #[tokio::test]
    async fn test_traversal_forward_and_back() {
        let mut url = ROOT.to_string();
        let mut pages = Vec::new();
        let mut previous: Option<String>;
        loop {
            let response = respond(&url, numbered(25)).await;
            pages.push(response.data);
            previous = response.previous;
            match response.next {
                Some(next) => url = next,
                None => break,
            }
        }

        let forward: Vec<i64> = pages.iter().flatten().copied().collect();
        assert_eq!(forward, (1..=25).rev().collect::<Vec<_>>());
        assert_eq!(pages.len(), 3);

        let mut index = pages.len() - 1;
        while let Some(link) = previous {
            index -= 1;
            let response = respond(&link, numbered(25)).await;
            assert_eq!(response.data, pages[index]);
            previous = response.previous;
        }
        assert_eq!(index, 0);
    }

    #[tokio::test]
    async fn test_reverse_page_links_forward_again() {
        let second_link = respond(ROOT, numbered(25)).await.next.unwrap();
        let second = respond(&second_link, numbered(25)).await;
        let back = respond(&second.previous.unwrap(), numbered(25)).await;
        assert_eq!(back.data, (16..=25).rev().collect::<Vec<_>>());
        assert_eq!(back.previous, None);
        assert_eq!(decode(&back.next.unwrap()), decode(&second_link));
    }

    #[tokio::test]
    async fn test_tied_positions_fall_back_to_offset() {
        let first = paginator(ROOT, tied(15)).with_ordering(["-created_at"]);
        let page = first.paginate().await.unwrap();
        assert_eq!(page.len(), 10);
        assert!(page.has_next());

        let next = first.get_next_link(&page).unwrap();
        assert_eq!(decode(&next), Cursor::new(10, false, None));

        let rest = paginator(&next, tied(15))
            .with_ordering(["-created_at"])
            .paginate()
            .await
            .unwrap();
        assert_eq!(rest.len(), 5);
        assert!(!rest.has_next());
        assert!(rest.has_previous());
        let ids: Vec<i64> = rest.rows().iter().map(|p| p.id).collect();
        assert_eq!(ids, (11..=15).collect::<Vec<_>>());
    }

    /// Pages forward until there is no next link, then back along the
    /// previous links from the last page.
    async fn walk(
        rows: &[Person],
        ordering: &[&str],
        page_size: u64,
    ) -> (Vec<Vec<i64>>, Vec<Vec<i64>>) {
        let page_at = |url: &str| {
            paginator(url, rows.to_vec())
                .with_page_size(page_size)
                .with_ordering(ordering.iter().copied())
        };

        let mut forward = Vec::new();
        let mut url = ROOT.to_string();
        let mut previous;
        loop {
            let current = page_at(&url);
            let page = current.paginate().await.unwrap();
            forward.push(page.rows().iter().map(|p| p.id).collect());
            previous = current.get_previous_link(&page);
            match current.get_next_link(&page) {
                Some(next) => url = next,
                None => break,
            }
        }

        let mut backward = Vec::new();
        while let Some(link) = previous {
            let current = page_at(&link);
            let page = current.paginate().await.unwrap();
            backward.push(page.rows().iter().map(|p| p.id).collect());
            previous = current.get_previous_link(&page);
        }
        (forward, backward)
    }

    #[tokio::test]
    async fn test_ascending_key_walks_back() {
        let (forward, backward) = walk(&numbered(23), &["id"], 5).await;
        let expected: Vec<Vec<i64>> = (1..=23_i64)
            .collect::<Vec<_>>()
            .chunks(5)
            .map(<[i64]>::to_vec)
            .collect();
        assert_eq!(forward, expected);

        // every page but the last, newest first
        let mirrored: Vec<Vec<i64>> = expected[..expected.len() - 1]
            .iter()
            .rev()
            .cloned()
            .collect();
        assert_eq!(backward, mirrored);
    }

    #[tokio::test]
    async fn test_ties_across_page_boundaries() {
        // ages 0,0,0,1,1,1,... so each age spans a page boundary
        let rows: Vec<Person> = numbered(14)
            .into_iter()
            .map(|p| Person {
                age: (p.id - 1) / 3,
                ..p
            })
            .collect();
        let (forward, backward) = walk(&rows, &["age", "id"], 2).await;
        let expected: Vec<Vec<i64>> = (1..=14_i64)
            .collect::<Vec<_>>()
            .chunks(2)
            .map(<[i64]>::to_vec)
            .collect();
        assert_eq!(forward, expected);

        let mirrored: Vec<Vec<i64>> = expected[..expected.len() - 1]
            .iter()
            .rev()
            .cloned()
            .collect();
        assert_eq!(backward, mirrored);
    }

    #[tokio::test]
    async fn test_huge_page_size_does_not_overflow() {
        let current = paginator(ROOT, numbered(5)).with_page_size(u64::MAX);
        let page = current.paginate().await.unwrap();
        assert_eq!(page.len(), 5);
        assert!(!page.has_next());
        assert_eq!(current.get_next_link(&page), None);

        let tied_rows = paginator(ROOT, tied(4))
            .with_ordering(["-created_at"])
            .with_page_size(u64::MAX);
        let page = tied_rows.paginate().await.unwrap();
        assert_eq!(page.len(), 4);
        assert_eq!(tied_rows.get_previous_link(&page), None);
    }

    #[tokio::test]
    async fn test_datetime_position_resumes() {
        let first = paginator(ROOT, numbered(12)).with_ordering(["created_at"]);
        let page = first.paginate().await.unwrap();
        let next = first.get_next_link(&page).unwrap();
        assert_eq!(
            decode(&next).position.as_deref(),
            Some("2024-01-11T00:00:00+00:00")
        );

        let second = paginator(&next, numbered(12)).with_ordering(["created_at"]);
        let page = second.paginate().await.unwrap();
        let ids: Vec<i64> = page.rows().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_links_are_stable() {
        let first = paginator(ROOT, numbered(25));
        let page = first.paginate().await.unwrap();
        assert_eq!(first.get_next_link(&page), first.get_next_link(&page));

        let second_link = respond(ROOT, numbered(25)).await.next.unwrap();
        let second = paginator(&second_link, numbered(25));
        let page = second.paginate().await.unwrap();
        assert!(page.has_previous());
        assert_eq!(second.get_previous_link(&page), second.get_previous_link(&page));
    }

    #[tokio::test]
    async fn test_links_keep_other_params() {
        let response = respond(&format!("{ROOT}?is_active=true"), numbered(25)).await;
        // active rows are the even ids
        assert_eq!(response.data, vec![24, 22, 20, 18, 16, 14, 12, 10, 8, 6]);
        let next = response.next.unwrap();
        assert!(next.starts_with(&format!("{ROOT}?is_active=true&cursor=")));

        let rest = respond(&next, numbered(25)).await;
        assert_eq!(rest.data, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_missing_ordering_field() {
        let err = paginator(ROOT, numbered(3))
            .with_ordering(["-id", "nickname"])
            .paginate()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaginationError::MissingOrderingField { ref field } if field == "nickname"
        ));
    }

    #[tokio::test]
    async fn test_malformed_cursor_is_first_page() {
        let response = respond(&format!("{ROOT}?cursor=%25%25%25"), numbered(25)).await;
        assert_eq!(response.data.first(), Some(&25));
        assert_eq!(response.previous, None);
    }

    #[tokio::test]
    async fn test_empty_result() {
        let response = respond(ROOT, Vec::new()).await;
        assert!(response.is_empty());
        assert_eq!(response.next, None);
        assert_eq!(response.previous, None);
        assert_eq!(response.cursor_info, CursorInfo::default());
    }

    #[test]
    fn test_from_config() {
        let config = CursorConfig {
            query_param: "after".to_string(),
            page_size: 0,
            offset_cutoff: 5,
            max_token_len: 64,
        };
        let base = BasePaginator::new(
            MemoryStore::new(numbered(1)),
            PageRequest::parse(ROOT).unwrap(),
            ListOptions::new(),
        );
        let paginator = CursorPaginator::from_config(base, &config);
        assert_eq!(paginator.cursor_param(), "after");
        assert_eq!(paginator.page_size(), 1);
        assert_eq!(paginator.ordering(), &[OrderingDirective::desc("id")]);
    }

    #[test]
    fn test_decode_cursor_reads_configured_param() {
        let token = CursorCodec::new(1000, 4096).encode(&Cursor::new(3, true, None));
        let after = paginator(&format!("{ROOT}?after={token}"), numbered(1))
            .with_cursor_param("after")
            .with_offset_cutoff(2);
        assert_eq!(after.decode_cursor(), Some(Cursor::new(2, true, None)));
    }
}
