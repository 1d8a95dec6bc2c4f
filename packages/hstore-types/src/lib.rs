//! Shared types for the virtual field engine.
//!
//! This crate defines values, the hstore map, base field types and the
//! field type registry.

pub mod builtin;
pub mod field;
pub mod hstore;
pub mod registry;
pub mod types;

pub use builtin::{builtin_class, register_builtin_types, BuiltinField, BUILTIN_FIELD_TYPES};
pub use field::{FieldBinding, FieldClass, FieldError, FieldOptions, FieldType};
pub use hstore::HStore;
pub use registry::FieldTypeRegistry;
pub use types::{Type, Value};
