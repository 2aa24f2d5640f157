//! The incoming list request: its URL and decoded query parameters

use url::{form_urlencoded, Url};

use crate::error::Result;
use crate::params::QueryParams;

/// Absolute URL of a list request plus its parsed query string
///
/// Paginators read filters, search, ordering and pagination inputs from
/// [`PageRequest::params`] and derive `next`/`previous` links from the URL.
///
/// # Example
///
/// ```rust
/// use acton_pagination::PageRequest;
///
/// let request = PageRequest::parse("https://api.example.com/users?limit=10&offset=20#top").unwrap();
/// assert_eq!(request.params().get("offset"), Some("20"));
///
/// let next = request.with_params(&[("offset", Some("30".to_string()))]);
/// assert_eq!(next, "https://api.example.com/users?limit=10&offset=30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    url: Url,
    params: QueryParams,
}

impl PageRequest {
    /// Parse an absolute request URL
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::from_url(Url::parse(url)?))
    }

    /// Wrap an already-parsed URL
    #[must_use]
    pub fn from_url(url: Url) -> Self {
        let params = url.query_pairs().into_owned().collect();
        Self { url, params }
    }

    /// The request URL
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Decoded query parameters
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// The request URL with some query parameters replaced
    ///
    /// For each `(key, Some(value))` the first occurrence of `key` takes the
    /// new value in place and later duplicates are removed; a key not present
    /// is appended. `(key, None)` removes the key. Other parameters keep their
    /// order. The fragment is dropped.
    #[must_use]
    pub fn with_params(&self, overrides: &[(&str, Option<String>)]) -> String {
        let mut pairs: Vec<(String, String)> = self.url.query_pairs().into_owned().collect();

        for (key, value) in overrides {
            match value {
                Some(value) => {
                    let mut seen = false;
                    pairs.retain_mut(|(k, v)| {
                        if k.as_str() != *key {
                            return true;
                        }
                        if seen {
                            return false;
                        }
                        seen = true;
                        v.clone_from(value);
                        true
                    });
                    if !seen {
                        pairs.push(((*key).to_string(), value.clone()));
                    }
                }
                None => pairs.retain(|(k, _)| k.as_str() != *key),
            }
        }

        let mut url = self.url.clone();
        url.set_fragment(None);
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&pairs)
                .finish();
            url.set_query(Some(&query));
        }
        url.into()
    }
}

/// Value of a query parameter in an absolute link, if present
///
/// # Example
///
/// ```rust
/// use acton_pagination::request::query_param;
///
/// let link = "https://api.example.com/feed?cursor=cD0xMA&limit=5";
/// assert_eq!(query_param(link, "cursor"), Some("cD0xMA".to_string()));
/// assert_eq!(query_param(link, "missing"), None);
/// ```
#[must_use]
pub fn query_param(link: &str, key: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let value = url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned());
    value
}
