use std::fmt;
use std::str::FromStr;

use crate::query::OrderDirection;

use super::QueryParams;

/// A sort key in its query-string form: `field` or `-field`
///
/// # Example
///
/// ```rust
/// use acton_pagination::params::OrderingDirective;
/// use acton_pagination::query::OrderDirection;
///
/// let directive: OrderingDirective = "-created_at".parse().unwrap();
/// assert_eq!(directive.field(), "created_at");
/// assert_eq!(directive.direction(), OrderDirection::Descending);
/// assert_eq!(directive.reversed().to_string(), "created_at");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderingDirective {
    field: String,
    direction: OrderDirection,
}

impl OrderingDirective {
    /// Ascending sort on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Ascending,
        }
    }

    /// Descending sort on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Descending,
        }
    }

    /// Parse `field` / `-field`; surrounding whitespace is ignored
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        let field = token.trim_start_matches('-');
        if field.len() == token.len() {
            Self::asc(field)
        } else {
            Self::desc(field)
        }
    }

    /// Field name without the direction prefix
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Sort direction
    #[must_use]
    pub const fn direction(&self) -> OrderDirection {
        self.direction
    }

    /// Whether the sort is descending
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        matches!(self.direction, OrderDirection::Descending)
    }

    /// The same field sorted the other way
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            direction: self.direction.reversed(),
        }
    }
}

impl fmt::Display for OrderingDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_descending() {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

impl FromStr for OrderingDirective {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for OrderingDirective {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Sort keys requested via `ordering` (or `order_by`)
///
/// Tokens whose field is not in `allowed_fields` are dropped. When nothing
/// survives, `default_ordering` is used if given.
#[must_use]
pub fn extract_ordering(
    params: &QueryParams,
    allowed_fields: &[String],
    default_ordering: Option<&OrderingDirective>,
) -> Vec<OrderingDirective> {
    let mut ordering: Vec<OrderingDirective> = params
        .get_or("ordering", "order_by")
        .map(|raw| {
            raw.split(',')
                .map(OrderingDirective::parse)
                .filter(|d| allowed_fields.iter().any(|f| f == d.field()))
                .collect()
        })
        .unwrap_or_default();

    if ordering.is_empty() {
        if let Some(default) = default_ordering {
            ordering.push(default.clone());
        }
    }
    ordering
}
