//! Entity descriptors
//!
//! Paginators never inspect rows by reflection. Each entity type implements
//! [`Model`] and hands out a static [`Schema`] mapping field names to a
//! declared [`FieldKind`] and an accessor returning a [`FieldValue`].
//!
//! # Example
//!
//! ```rust
//! use acton_pagination::model::{FieldKind, Model, Schema};
//! use once_cell::sync::Lazy;
//!
//! #[derive(Clone)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! static USER_SCHEMA: Lazy<Schema<User>> = Lazy::new(|| {
//!     Schema::<User>::builder("users")
//!         .field("id", FieldKind::Integer, |u| u.id.into())
//!         .field("name", FieldKind::String, |u| u.name.clone().into())
//!         .build()
//! });
//!
//! impl Model for User {
//!     fn schema() -> &'static Schema<Self> {
//!         &USER_SCHEMA
//!     }
//! }
//!
//! assert!(User::schema().contains("name"));
//! ```

mod schema;
mod value;

pub use schema::{Accessor, FieldDef, Schema, SchemaBuilder};
pub use value::{FieldKind, FieldValue};

/// An entity whose rows can be filtered, ordered and paginated
pub trait Model: Send + Sync + Sized + 'static {
    /// Static field registry for this entity
    fn schema() -> &'static Schema<Self>;
}
