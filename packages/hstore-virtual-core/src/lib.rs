//! Virtual fields over a single hstore map column.
//!
//! A virtual field wraps a base field type and reads/writes one key of an
//! entity's hstore attribute. Fields are composed with [`compose`], bound to
//! an [`EntityType`] while it is built (or later with
//! [`EntityType::add_to_type`]), and accessed through a [`Record`]. They stay
//! out of the type's visible field list until materialized.
//!
//! ```
//! use hstore_types::{BuiltinField, FieldTypeRegistry, Value};
//! use hstore_virtual_core::{compose, EntityType};
//! use serde_json::json;
//!
//! let types = FieldTypeRegistry::with_builtin_types().unwrap();
//! let color = compose(&types, "CharField", json!({"hstore_field_name": "data", "max_length": 16})).unwrap();
//! let product = EntityType::builder("Product")
//!     .field("data", Box::new(BuiltinField::hstore()))
//!     .virtual_field("color", color)
//!     .build()
//!     .unwrap();
//!
//! let mut record = product.new_record().unwrap();
//! record.set("color", "red").unwrap();
//! assert_eq!(record.get("color").unwrap(), Value::from("red"));
//! assert_eq!(product.field_names().unwrap(), vec!["data"]);
//!
//! product.add_virtual_fields_to_field_list().unwrap();
//! assert_eq!(product.field_names().unwrap(), vec!["data", "color"]);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod registry;
pub mod virtual_field;

pub use config::{DematerializePolicy, VirtualFieldConfig};
pub use entity::{EntityType, EntityTypeBuilder, FieldRef, Record};
pub use error::VirtualFieldError;
pub use registry::EntityRegistry;
pub use virtual_field::{compose, BaseFieldRef, Descriptor, VirtualField};
