//! Request query-parameter extraction
//!
//! Turns the decoded query string of a list request into normalized filter,
//! search and ordering inputs for the [`QueryBuilder`](crate::builder::QueryBuilder).
//!
//! Supported query-string shapes:
//!
//! | Shape | Meaning |
//! |---|---|
//! | `?status=active`, `?filter[status]=active` | equality |
//! | `?age__gte=18` | operator (`gt`, `gte`, `lt`, `lte`, `ne`, `in`, `like`, `ilike`) |
//! | `?id__in=1,2,3` | comma-separated list |
//! | `?search=john`, `?q=john` | free-text search |
//! | `?ordering=-created_at,name`, `?order_by=...` | sort keys |

mod filters;
mod ordering;

use url::form_urlencoded;

pub use filters::{extract_filters, FilterField, FilterMap, FILTER_OPERATORS};
pub use ordering::{extract_ordering, OrderingDirective};

/// Decoded query parameters, preserving order and repeated keys
///
/// # Example
///
/// ```rust
/// use acton_pagination::params::QueryParams;
///
/// let params = QueryParams::parse("tag=a&tag=b&search=&q=rust");
/// assert_eq!(params.get("tag"), Some("b"));
/// assert_eq!(params.get_or("search", "q"), Some("rust"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse an `application/x-www-form-urlencoded` query string
    #[must_use]
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    /// Last value given for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value given for `key`, in request order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `primary` unless it is missing or empty, otherwise `fallback`
    #[must_use]
    pub fn get_or(&self, primary: &str, fallback: &str) -> Option<&str> {
        self.get(primary)
            .filter(|v| !v.is_empty())
            .or_else(|| self.get(fallback))
    }

    /// Whether `key` is present at all
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Key/value pairs in request order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs, counting repeated keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Free-text search term from `search`, falling back to `q`
#[must_use]
pub fn extract_search(params: &QueryParams) -> Option<String> {
    params.get_or("search", "q").map(str::to_string)
}
