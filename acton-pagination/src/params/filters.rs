use std::collections::BTreeMap;

use crate::error::{PaginationError, Result};
use crate::model::{FieldKind, FieldValue};
use crate::query::FilterValue;

use super::QueryParams;

/// Operator suffixes recognised after `field__`
pub const FILTER_OPERATORS: &[&str] = &["gt", "gte", "lt", "lte", "ne", "in", "like", "ilike"];

/// Filter key (`field` or `field__op`) to coerced value
pub type FilterMap = BTreeMap<String, FilterValue>;

/// A field an endpoint allows clients to filter on
///
/// # Example
///
/// ```rust
/// use acton_pagination::model::FieldKind;
/// use acton_pagination::params::FilterField;
///
/// let fields = vec![
///     FilterField::new("is_active", FieldKind::Boolean),
///     FilterField::typed("age", "int"),
/// ];
/// assert_eq!(fields[1].kind, FieldKind::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    /// Field name
    pub name: String,
    /// Kind used to coerce incoming values
    pub kind: FieldKind,
}

impl FilterField {
    /// Declare a filterable field
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Declare a filterable field from a type name such as `"int"` or `"date"`
    pub fn typed(name: impl Into<String>, type_name: &str) -> Self {
        Self::new(name, FieldKind::from_type_name(type_name))
    }
}

/// Extract and coerce filter values for the declared fields
///
/// Equality reads `name`, falling back to `filter[name]` when the former is
/// missing or empty. Each operator key `name__op` is read independently.
/// Values for `in` are split on commas and each element is trimmed.
///
/// # Errors
///
/// Returns [`PaginationError::TypeCoercion`] for the first value that cannot
/// be coerced to the field's kind.
pub fn extract_filters(params: &QueryParams, fields: &[FilterField]) -> Result<FilterMap> {
    let mut filters = FilterMap::new();

    for field in fields {
        let bracketed = format!("filter[{}]", field.name);
        if let Some(raw) = params.get_or(&field.name, &bracketed) {
            let value = coerce(&field.name, raw, field.kind)?;
            filters.insert(field.name.clone(), FilterValue::Value(value));
        }

        for operator in FILTER_OPERATORS {
            let key = format!("{}__{}", field.name, operator);
            let Some(raw) = params.get(&key) else {
                continue;
            };
            let value = if *operator == "in" {
                let values = raw
                    .split(',')
                    .map(|part| coerce(&key, part.trim(), field.kind))
                    .collect::<Result<Vec<_>>>()?;
                FilterValue::List(values)
            } else {
                FilterValue::Value(coerce(&key, raw, field.kind)?)
            };
            filters.insert(key, value);
        }
    }

    tracing::debug!(filters = filters.len(), "extracted filter parameters");
    Ok(filters)
}

fn coerce(key: &str, raw: &str, kind: FieldKind) -> Result<FieldValue> {
    kind.coerce(raw).ok_or_else(|| {
        tracing::warn!(field = key, value = raw, expected = %kind, "filter value coercion failed");
        PaginationError::TypeCoercion {
            field: key.to_string(),
            raw_value: raw.to_string(),
            expected_type: kind,
        }
    })
}
