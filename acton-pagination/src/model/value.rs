//! Runtime field values and query-string coercion
//!
//! Every field a [`Model`](super::Model) exposes is read as a [`FieldValue`].
//! Filter parameters arrive as strings and are coerced into values using the
//! declared [`FieldKind`] of the field.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Naive datetime layouts accepted after RFC 3339 fails, interpreted as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Declared type of a model field
///
/// # Example
///
/// ```rust
/// use acton_pagination::model::{FieldKind, FieldValue};
///
/// assert_eq!(FieldKind::from_type_name("int"), FieldKind::Integer);
/// assert_eq!(FieldKind::Integer.coerce("18"), Some(FieldValue::Integer(18)));
/// assert_eq!(FieldKind::Integer.coerce("eighteen"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Text
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Boolean flag
    Boolean,
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// Timestamp, normalized to UTC
    DateTime,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

impl FieldKind {
    /// Resolve a loose type name as used in endpoint declarations
    ///
    /// Unrecognized names resolve to [`FieldKind::String`].
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "id" => Self::Integer,
            "float" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            _ => Self::String,
        }
    }

    /// Coerce a raw query-string value into a value of this kind
    ///
    /// Returns `None` when the value cannot be parsed. Boolean coercion never
    /// fails: `true`, `1`, `yes` and `on` (any case) are true, anything else
    /// is false.
    #[must_use]
    pub fn coerce(&self, raw: &str) -> Option<FieldValue> {
        match self {
            Self::String => Some(FieldValue::String(raw.to_string())),
            Self::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
            Self::Float => raw.trim().parse().ok().map(FieldValue::Float),
            Self::Boolean => Some(FieldValue::Boolean(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            ))),
            Self::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
            Self::DateTime => parse_datetime(raw.trim()).map(FieldValue::DateTime),
        }
    }
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A value read from a row field or coerced from a request parameter
///
/// The [`Display`](fmt::Display) form is the cursor *position* representation:
/// strings verbatim, dates as `YYYY-MM-DD`, timestamps as RFC 3339.
///
/// # Example
///
/// ```rust
/// use acton_pagination::model::FieldValue;
///
/// let value: FieldValue = 42_i64.into();
/// assert_eq!(value.to_string(), "42");
///
/// let missing: FieldValue = Option::<String>::None.into();
/// assert!(missing.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// SQL NULL / absent value
    Null,
    /// Text value
    String(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Whether this value is [`FieldValue::Null`]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The kind of this value, `None` for NULL
    #[must_use]
    pub const fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Null => None,
            Self::String(_) => Some(FieldKind::String),
            Self::Integer(_) => Some(FieldKind::Integer),
            Self::Float(_) => Some(FieldKind::Float),
            Self::Boolean(_) => Some(FieldKind::Boolean),
            Self::Date(_) => Some(FieldKind::Date),
            Self::DateTime(_) => Some(FieldKind::DateTime),
        }
    }

    /// Borrow the text of a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of compatible kinds
    ///
    /// Integers and floats compare numerically. NULL and mismatched kinds
    /// are incomparable and yield `None`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_from_type_name() {
        assert_eq!(FieldKind::from_type_name("str"), FieldKind::String);
        assert_eq!(FieldKind::from_type_name("text"), FieldKind::String);
        assert_eq!(FieldKind::from_type_name("id"), FieldKind::Integer);
        assert_eq!(FieldKind::from_type_name("Integer"), FieldKind::Integer);
        assert_eq!(FieldKind::from_type_name("float"), FieldKind::Float);
        assert_eq!(FieldKind::from_type_name("bool"), FieldKind::Boolean);
        assert_eq!(FieldKind::from_type_name("date"), FieldKind::Date);
        assert_eq!(FieldKind::from_type_name("datetime"), FieldKind::DateTime);
        assert_eq!(FieldKind::from_type_name("uuid"), FieldKind::String);
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(FieldKind::Integer.coerce("42"), Some(FieldValue::Integer(42)));
        assert_eq!(FieldKind::Integer.coerce(" -7 "), Some(FieldValue::Integer(-7)));
        assert_eq!(FieldKind::Integer.coerce("4.2"), None);
        assert_eq!(FieldKind::Integer.coerce(""), None);
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(FieldKind::Float.coerce("2.5"), Some(FieldValue::Float(2.5)));
        assert_eq!(FieldKind::Float.coerce("3"), Some(FieldValue::Float(3.0)));
        assert_eq!(FieldKind::Float.coerce("abc"), None);
    }

    #[test]
    fn test_coerce_boolean_is_permissive() {
        for truthy in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(
                FieldKind::Boolean.coerce(truthy),
                Some(FieldValue::Boolean(true))
            );
        }
        for falsy in ["false", "0", "no", "whatever"] {
            assert_eq!(
                FieldKind::Boolean.coerce(falsy),
                Some(FieldValue::Boolean(false))
            );
        }
    }

    #[test]
    fn test_coerce_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            FieldKind::Date.coerce("2024-01-15"),
            Some(FieldValue::Date(expected))
        );
        assert_eq!(FieldKind::Date.coerce("15/01/2024"), None);
    }

    #[test]
    fn test_coerce_datetime_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-15T10:30:00Z"),
            Some(FieldValue::DateTime(expected))
        );
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-15T12:30:00+02:00"),
            Some(FieldValue::DateTime(expected))
        );
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-15T10:30:00"),
            Some(FieldValue::DateTime(expected))
        );
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-15 10:30"),
            Some(FieldValue::DateTime(expected))
        );

        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-15"),
            Some(FieldValue::DateTime(midnight))
        );
        assert_eq!(FieldKind::DateTime.coerce("yesterday"), None);
    }

    #[test]
    fn test_compare_same_kind() {
        let a = FieldValue::from("apple");
        let b = FieldValue::from("banana");
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(
            FieldValue::Integer(3).compare(&FieldValue::Integer(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_numeric_mixed() {
        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Float(3.0).compare(&FieldValue::Integer(3)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_compare_incompatible() {
        assert_eq!(FieldValue::from("1").compare(&FieldValue::Integer(1)), None);
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), None);
    }

    #[test]
    fn test_display_is_position_form() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2024-03-09");
        assert_eq!(FieldValue::DateTime(ts).to_string(), "2024-03-09T08:00:00+00:00");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
        assert_eq!(FieldValue::Null.to_string(), "null");
    }

    #[test]
    fn test_position_round_trips_through_coercion() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let value = FieldValue::DateTime(ts);
        assert_eq!(FieldKind::DateTime.coerce(&value.to_string()), Some(value));

        let value = FieldValue::Integer(-12);
        assert_eq!(FieldKind::Integer.coerce(&value.to_string()), Some(value));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(FieldValue::from(Some(5_i64)), FieldValue::Integer(5));
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
    }
}
