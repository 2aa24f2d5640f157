//! Response envelopes for paginated list endpoints
//!
//! # Example
//!
//! ```rust
//! use acton_pagination::response::{PaginatedResponse, PaginationMeta};
//!
//! let meta = PaginationMeta::new(25, 10, 10);
//! let response = PaginatedResponse::new(vec![11, 12, 13], 25)
//!     .with_message("ok")
//!     .with_links(Some("https://api.example.com/items?limit=10&offset=20".into()), None)
//!     .with_meta(meta);
//!
//! let json = serde_json::to_value(&response).unwrap();
//! assert_eq!(json["count"], 25);
//! assert_eq!(json["meta"]["current_page"], 2);
//! ```

use serde::{Deserialize, Serialize};

/// Page metadata for limit/offset responses
///
/// # Example
///
/// ```rust
/// use acton_pagination::response::PaginationMeta;
///
/// let meta = PaginationMeta::new(25, 10, 20);
/// assert_eq!(meta.current_page, 3);
/// assert_eq!(meta.page_count, 3);
/// assert!(!meta.has_next);
/// assert!(meta.has_previous);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Total number of items
    pub total_count: u64,
    /// Total number of pages
    pub page_count: u64,
    /// Current page number (1-indexed)
    pub current_page: u64,
    /// Items per page
    pub page_size: u64,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_previous: bool,
}

impl PaginationMeta {
    /// Compute page metadata from the total and the current window
    ///
    /// A zero `limit` is treated as 1.
    #[must_use]
    pub fn new(total_count: u64, limit: u64, offset: u64) -> Self {
        let limit = limit.max(1);
        let (current_page, page_count) = if total_count == 0 {
            (1, 0)
        } else {
            (offset / limit + 1, total_count.div_ceil(limit))
        };

        Self {
            total_count,
            page_count,
            current_page,
            page_size: limit,
            has_next: offset.saturating_add(limit) < total_count,
            has_previous: offset > 0 && total_count > 0,
        }
    }
}

/// Envelope for limit/offset pagination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    /// Free-form message
    pub message: String,
    /// Total number of items
    pub count: u64,
    /// Link to the next page
    pub next: Option<String>,
    /// Link to the previous page
    pub previous: Option<String>,
    /// Page metadata, when requested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<PaginationMeta>,
    /// Items of this page
    pub data: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Create a response with no links, meta or message
    #[must_use]
    pub fn new(data: Vec<T>, count: u64) -> Self {
        Self {
            message: String::new(),
            count,
            next: None,
            previous: None,
            meta: None,
            data,
        }
    }

    /// Set the message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the next and previous links
    #[must_use]
    pub fn with_links(mut self, next: Option<String>, previous: Option<String>) -> Self {
        self.next = next;
        self.previous = previous;
        self
    }

    /// Attach page metadata
    #[must_use]
    pub fn with_meta(mut self, meta: PaginationMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Transform the items, keeping their order
    pub fn map<U, F>(self, f: F) -> PaginatedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResponse {
            message: self.message,
            count: self.count,
            next: self.next,
            previous: self.previous,
            meta: self.meta,
            data: self.data.into_iter().map(f).collect(),
        }
    }

    /// Number of items in this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Cursor state reported alongside a cursor page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorInfo {
    /// Whether a next page exists
    pub has_next: bool,
    /// Whether a previous page exists
    pub has_previous: bool,
    /// Bare token for the next page
    pub next_cursor: Option<String>,
    /// Bare token for the previous page
    pub previous_cursor: Option<String>,
}

/// Envelope for cursor pagination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CursorPaginatedResponse<T> {
    /// Free-form message
    pub message: String,
    /// Link to the next page
    pub next: Option<String>,
    /// Link to the previous page
    pub previous: Option<String>,
    /// Cursor state
    pub cursor_info: CursorInfo,
    /// Items of this page
    pub data: Vec<T>,
}

impl<T> CursorPaginatedResponse<T> {
    /// Transform the items, keeping their order
    pub fn map<U, F>(self, f: F) -> CursorPaginatedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        CursorPaginatedResponse {
            message: self.message,
            next: self.next,
            previous: self.previous,
            cursor_info: self.cursor_info,
            data: self.data.into_iter().map(f).collect(),
        }
    }

    /// Number of items in this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(feature = "http")]
mod http {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde::Serialize;

    use super::{CursorPaginatedResponse, PaginatedResponse};

    impl<T: Serialize> IntoResponse for PaginatedResponse<T> {
        fn into_response(self) -> Response {
            (StatusCode::OK, Json(self)).into_response()
        }
    }

    impl<T: Serialize> IntoResponse for CursorPaginatedResponse<T> {
        fn into_response(self) -> Response {
            (StatusCode::OK, Json(self)).into_response()
        }
    }
}
