//! Per-entity field registries

use std::collections::HashMap;
use std::fmt;

use super::value::{FieldKind, FieldValue};

/// Reads one field off a row
pub type Accessor<M> = fn(&M) -> FieldValue;

/// A single named, typed field of an entity
pub struct FieldDef<M> {
    name: &'static str,
    kind: FieldKind,
    accessor: Accessor<M>,
}

impl<M> FieldDef<M> {
    /// Field name as used in query parameters and predicates
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared kind of the field
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read this field from a row
    pub fn read(&self, row: &M) -> FieldValue {
        (self.accessor)(row)
    }
}

impl<M> Clone for FieldDef<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            accessor: self.accessor,
        }
    }
}

impl<M> fmt::Debug for FieldDef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Field registry for one entity type
///
/// Built once per entity (typically in a `once_cell` static) and shared
/// immutably by every paginator touching that entity.
///
/// # Example
///
/// ```rust
/// use acton_pagination::model::{FieldKind, FieldValue, Schema};
///
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// let schema = Schema::<Tag>::builder("tags")
///     .field("id", FieldKind::Integer, |t| t.id.into())
///     .field("label", FieldKind::String, |t| t.label.clone().into())
///     .build();
///
/// let tag = Tag { id: 7, label: "rust".into() };
/// assert!(schema.contains("label"));
/// assert_eq!(schema.value_of(&tag, "id"), Some(FieldValue::Integer(7)));
/// assert_eq!(schema.value_of(&tag, "missing"), None);
/// ```
pub struct Schema<M> {
    entity: &'static str,
    fields: Vec<FieldDef<M>>,
    index: HashMap<&'static str, usize>,
}

impl<M> Schema<M> {
    /// Start building a schema for the named entity
    #[must_use]
    pub fn builder(entity: &'static str) -> SchemaBuilder<M> {
        SchemaBuilder {
            entity,
            fields: Vec::new(),
        }
    }

    /// Entity name, used in log events
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Look up a field definition by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef<M>> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Whether the entity declares a field with this name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Declared kind of a field
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.field(name).map(FieldDef::kind)
    }

    /// Read a named field from a row, `None` when the field is unknown
    pub fn value_of(&self, row: &M, name: &str) -> Option<FieldValue> {
        self.field(name).map(|def| def.read(row))
    }

    /// All fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef<M>> {
        self.fields.iter()
    }
}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`Schema`]
pub struct SchemaBuilder<M> {
    entity: &'static str,
    fields: Vec<FieldDef<M>>,
}

impl<M> SchemaBuilder<M> {
    /// Declare a field; a later declaration with the same name replaces it
    #[must_use]
    pub fn field(mut self, name: &'static str, kind: FieldKind, accessor: Accessor<M>) -> Self {
        let def = FieldDef {
            name,
            kind,
            accessor,
        };
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = def,
            None => self.fields.push(def),
        }
        self
    }

    /// Finish the registry
    #[must_use]
    pub fn build(self) -> Schema<M> {
        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name, i))
            .collect();
        Schema {
            entity: self.entity,
            fields: self.fields,
            index,
        }
    }
}
