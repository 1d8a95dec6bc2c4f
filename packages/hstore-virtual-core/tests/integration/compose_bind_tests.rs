//! Composition and binding.

use std::sync::Arc;

use hstore_types::{builtin_class, BuiltinField, FieldType, Type, Value};
use hstore_virtual_core::{compose, EntityRegistry, EntityType, VirtualFieldError};
use serde_json::json;

use super::helpers::{char_virtual, field_types, product_type};

#[test]
fn test_compose_keeps_backing_name_for_every_base() {
    let types = field_types();
    for (base, backing) in [
        ("BooleanField", "flags"),
        ("IntegerField", "data"),
        ("FloatField", "metrics"),
        ("TextField", "attrs"),
        ("CharField", "x"),
    ] {
        let field = compose(
            &types,
            base,
            json!({"hstore_field_name": backing, "max_length": 10}),
        )
        .unwrap();
        assert_eq!(field.hstore_field_name(), backing);
        assert_eq!(field.base().type_name(), base);
        assert_eq!(field.type_name(), base);
    }
}

#[test]
fn test_compose_missing_backing_field_for_any_base() {
    let types = field_types();
    let class = builtin_class("TextField").unwrap();
    assert!(matches!(
        compose(&types, class, json!({})),
        Err(VirtualFieldError::MissingBackingField)
    ));
    for base in ["CharField", "IntegerField", "Bogus"] {
        assert!(matches!(
            compose(&types, base, json!({"default": 1})),
            Err(VirtualFieldError::MissingBackingField)
        ));
    }
}

#[test]
fn test_compose_invalid_base_names_value() {
    let err = compose(&field_types(), "DecimalField", json!({"hstore_field_name": "data"}))
        .unwrap_err();
    assert!(err.to_string().contains("DecimalField"));
}

#[test]
fn test_compose_touches_no_registry() {
    let registry = EntityRegistry::with_builtin_types().unwrap();
    let field = registry
        .compose("TextField", json!({"hstore_field_name": "data"}))
        .unwrap();
    assert!(!field.is_bound());
    assert_eq!(registry.entity_count(), 0);
}

#[test]
fn test_bind_order_is_preserved() {
    let product = product_type(Default::default());
    let names: Vec<_> = product
        .virtual_fields()
        .unwrap()
        .iter()
        .map(|f| f.name().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["color", "size", "stock"]);
    for field in product.virtual_fields().unwrap() {
        assert_eq!(field.owner(), Some("Product"));
        assert!(field.binding().unwrap().column.is_none());
    }
}

#[test]
fn test_virtual_binding_carries_base_metadata() {
    let product = product_type(Default::default());
    let color = product.virtual_field("color").unwrap().unwrap();
    let binding = color.binding().unwrap();
    assert_eq!(binding.db_type, "varchar(32)");
    assert_eq!(binding.attname, "color");
    assert_eq!(color.ty(), Type::Char);
}

#[test]
fn test_same_names_on_two_types_stay_independent() {
    let types = field_types();
    let build = |name: &str| {
        EntityType::builder(name)
            .field("data", Box::new(BuiltinField::hstore()))
            .virtual_field("color", char_virtual(&types, "none"))
            .build()
            .unwrap()
    };
    let shirt = build("Shirt");
    let car = build("Car");

    let shirt_fields = shirt.virtual_fields().unwrap();
    let car_fields = car.virtual_fields().unwrap();
    assert_eq!(shirt_fields.len(), 1);
    assert_eq!(car_fields.len(), 1);
    assert!(!Arc::ptr_eq(&shirt_fields[0], &car_fields[0]));
    assert_eq!(shirt_fields[0].owner(), Some("Shirt"));
    assert_eq!(car_fields[0].owner(), Some("Car"));

    car.add_virtual_fields_to_field_list().unwrap();
    assert_eq!(shirt.field_names().unwrap(), vec!["data"]);
    assert_eq!(car.field_names().unwrap(), vec!["data", "color"]);

    let mut shirt_record = shirt.new_record().unwrap();
    let car_record = car.new_record().unwrap();
    shirt_record.set("color", "red").unwrap();
    assert_eq!(car_record.get("color").unwrap(), Value::from("none"));
}

#[test]
fn test_failed_add_to_type_leaves_no_trace() {
    let product = product_type(Default::default());
    let before = product.virtual_fields().unwrap().len();
    let types = field_types();

    let err = product
        .add_to_type("title", char_virtual(&types, ""))
        .unwrap_err();
    assert!(matches!(err, VirtualFieldError::FieldAlreadyExists { .. }));

    let orphan = compose(&types, "TextField", json!({"hstore_field_name": "extra"})).unwrap();
    let err = product.add_to_type("notes", orphan).unwrap_err();
    assert!(matches!(err, VirtualFieldError::BindingContext { .. }));

    assert_eq!(product.virtual_fields().unwrap().len(), before);
    assert!(product.accessor("notes").is_none());
}

#[test]
fn test_field_bound_once_only() {
    let types = field_types();
    let product = product_type(Default::default());
    let other = EntityType::builder("Other")
        .field("data", Box::new(BuiltinField::hstore()))
        .build()
        .unwrap();
    let field = product.add_to_type("weight", char_virtual(&types, "")).unwrap();

    let err = other.add_to_type("weight", Arc::clone(&field)).unwrap_err();
    assert!(matches!(err, VirtualFieldError::BindingContext { .. }));
    assert_eq!(field.owner(), Some("Product"));
    assert!(other.virtual_fields().unwrap().is_empty());
    assert!(!other.has_splice_ops().unwrap());
}
