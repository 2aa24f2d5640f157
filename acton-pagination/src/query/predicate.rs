//! Predicate and ordering types applied to abstract queries
//!
//! # Example
//!
//! ```rust
//! use acton_pagination::query::{FilterCondition, OrderDirection, Predicate};
//!
//! let active_adults = Predicate::all(vec![
//!     FilterCondition::eq("is_active", true).into(),
//!     FilterCondition::gte("age", 18_i64).into(),
//! ]);
//!
//! let order = ("created_at", OrderDirection::Descending);
//! ```

use std::fmt;

use crate::model::FieldValue;

/// Direction for ordering results
///
/// # Example
///
/// ```rust
/// use acton_pagination::query::OrderDirection;
///
/// assert_eq!(format!("{}", OrderDirection::Ascending), "asc");
/// assert_eq!(OrderDirection::Ascending.reversed(), OrderDirection::Descending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// The opposite direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Comparison operators for filter conditions
///
/// # Example
///
/// ```rust
/// use acton_pagination::query::FilterOperator;
///
/// assert_eq!(format!("{}", FilterOperator::Equal), "=");
/// assert_eq!(format!("{}", FilterOperator::ILike), "ILIKE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
    /// Pattern matching (LIKE)
    Like,
    /// Case-insensitive pattern matching (ILIKE)
    ILike,
    /// Value is in a list (IN)
    In,
    /// Value is null (IS NULL)
    IsNull,
    /// Value is not null (IS NOT NULL)
    IsNotNull,
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
            Self::Like => write!(f, "LIKE"),
            Self::ILike => write!(f, "ILIKE"),
            Self::In => write!(f, "IN"),
            Self::IsNull => write!(f, "IS NULL"),
            Self::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Right-hand side of a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A single value
    Value(FieldValue),
    /// A list of values (for IN)
    List(Vec<FieldValue>),
}

impl FilterValue {
    /// The single value, if this is not a list
    #[must_use]
    pub const fn as_value(&self) -> Option<&FieldValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::List(_) => None,
        }
    }
}

impl From<FieldValue> for FilterValue {
    fn from(value: FieldValue) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<FieldValue>> for FilterValue {
    fn from(values: Vec<FieldValue>) -> Self {
        Self::List(values)
    }
}

/// A single filter condition
///
/// # Example
///
/// ```rust
/// use acton_pagination::query::FilterCondition;
///
/// let status_filter = FilterCondition::eq("status", "active");
/// let age_filter = FilterCondition::gte("age", 18_i64);
/// let name_filter = FilterCondition::ilike("name", "%smith%");
/// let deleted_filter = FilterCondition::is_null("deleted_at");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    /// The field name to filter on
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a new filter condition
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Equality filter (field = value)
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::Equal, FilterValue::Value(value.into()))
    }

    /// Not-equal filter (field != value)
    pub fn ne(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::NotEqual, FilterValue::Value(value.into()))
    }

    /// Greater-than filter (field > value)
    pub fn gt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, FilterValue::Value(value.into()))
    }

    /// Greater-than-or-equal filter (field >= value)
    pub fn gte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(
            field,
            FilterOperator::GreaterThanOrEqual,
            FilterValue::Value(value.into()),
        )
    }

    /// Less-than filter (field < value)
    pub fn lt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOperator::LessThan, FilterValue::Value(value.into()))
    }

    /// Less-than-or-equal filter (field <= value)
    pub fn lte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(
            field,
            FilterOperator::LessThanOrEqual,
            FilterValue::Value(value.into()),
        )
    }

    /// LIKE pattern filter (`%` and `_` wildcards)
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::Like,
            FilterValue::Value(FieldValue::String(pattern.into())),
        )
    }

    /// Case-insensitive LIKE pattern filter
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::ILike,
            FilterValue::Value(FieldValue::String(pattern.into())),
        )
    }

    /// IN list filter
    pub fn in_list(field: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::List(values))
    }

    /// IS NULL filter
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, FilterValue::Value(FieldValue::Null))
    }

    /// IS NOT NULL filter
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::IsNotNull,
            FilterValue::Value(FieldValue::Null),
        )
    }
}

/// A boolean combination of filter conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A single condition
    Condition(FilterCondition),
    /// Disjunction; an empty list matches nothing
    Any(Vec<Predicate>),
    /// Conjunction; an empty list matches everything
    All(Vec<Predicate>),
}

impl Predicate {
    /// OR together the given predicates
    #[must_use]
    pub fn any(predicates: Vec<Predicate>) -> Self {
        Self::Any(predicates)
    }

    /// AND together the given predicates
    #[must_use]
    pub fn all(predicates: Vec<Predicate>) -> Self {
        Self::All(predicates)
    }
}

impl From<FilterCondition> for Predicate {
    fn from(condition: FilterCondition) -> Self {
        Self::Condition(condition)
    }
}

/// One sort directive applied to a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Field to sort on
    pub field: String,
    /// Sort direction
    pub direction: OrderDirection,
}

impl OrderBy {
    /// Create a sort directive
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}
