//! Shared fixtures for integration tests.

use std::sync::Arc;

use hstore_types::{BuiltinField, FieldTypeRegistry};
use hstore_virtual_core::{compose, EntityType, VirtualField, VirtualFieldConfig};
use serde_json::json;

/// Field type registry with the built-in types.
pub fn field_types() -> FieldTypeRegistry {
    FieldTypeRegistry::with_builtin_types().unwrap()
}

/// Composes a `CharField` virtual field stored in `data`.
pub fn char_virtual(types: &FieldTypeRegistry, default: &str) -> VirtualField {
    compose(
        types,
        "CharField",
        json!({"hstore_field_name": "data", "max_length": 32, "default": default}),
    )
    .unwrap()
}

/// `Product { id, title, data }` with virtual `color`, `size` and `stock`.
pub fn product_type(config: VirtualFieldConfig) -> Arc<EntityType> {
    let types = field_types();
    let stock = compose(
        &types,
        "IntegerField",
        json!({"hstore_field_name": "data", "default": 0}),
    )
    .unwrap();
    EntityType::builder("Product")
        .field("id", Box::new(BuiltinField::big_integer()))
        .field("title", Box::new(BuiltinField::char(80)))
        .field("data", Box::new(BuiltinField::hstore()))
        .virtual_field("color", char_virtual(&types, "unknown"))
        .virtual_field("size", char_virtual(&types, "M"))
        .virtual_field("stock", stock)
        .config(config)
        .build()
        .unwrap()
}

/// Names of the concrete fields of [`product_type`], in order.
pub const PRODUCT_FIELDS: [&str; 3] = ["id", "title", "data"];
