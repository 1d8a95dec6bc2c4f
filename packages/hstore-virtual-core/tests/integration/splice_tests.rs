//! Field list splicing laws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hstore_types::Value;
use hstore_virtual_core::{
    DematerializePolicy, EntityType, VirtualFieldConfig, VirtualFieldError,
};

use super::helpers::{char_virtual, field_types, product_type, PRODUCT_FIELDS};

#[test]
fn test_materialize_is_idempotent() {
    let product = product_type(Default::default());
    assert_eq!(product.add_virtual_fields_to_field_list().unwrap(), 3);
    let once = product.fields().unwrap();
    assert_eq!(product.add_virtual_fields_to_field_list().unwrap(), 0);
    assert_eq!(product.fields().unwrap(), once);
    assert_eq!(
        product.field_names().unwrap(),
        vec!["id", "title", "data", "color", "size", "stock"]
    );
    assert!(product.is_materialized().unwrap());
}

#[test]
fn test_materialize_then_dematerialize_restores_list() {
    let product = product_type(Default::default());
    let before = product.fields().unwrap();
    product.add_virtual_fields_to_field_list().unwrap();
    product.remove_virtual_fields_from_field_list().unwrap();
    assert_eq!(product.fields().unwrap(), before);
    assert_eq!(product.field_names().unwrap(), PRODUCT_FIELDS);
}

#[test]
fn test_lenient_dematerialize_is_noop_when_not_materialized() {
    let product = product_type(Default::default());
    let before = product.fields().unwrap();
    assert_eq!(product.remove_virtual_fields_from_field_list().unwrap(), 0);
    assert_eq!(product.fields().unwrap(), before);
}

#[test]
fn test_strict_dematerialize_fails_when_not_materialized() {
    let product = product_type(VirtualFieldConfig::strict());
    let err = product.remove_virtual_fields_from_field_list().unwrap_err();
    assert!(matches!(err, VirtualFieldError::NotMaterialized { ref field, .. } if field == "color"));

    product.add_virtual_fields_to_field_list().unwrap();
    assert_eq!(product.remove_virtual_fields_from_field_list().unwrap(), 3);
    assert!(product.remove_virtual_fields_from_field_list().is_err());
    assert_eq!(product.field_names().unwrap(), PRODUCT_FIELDS);
}

#[test]
fn test_field_added_after_materialize_needs_another_materialize() {
    let product = product_type(Default::default());
    product.add_virtual_fields_to_field_list().unwrap();
    let types = field_types();
    product
        .add_to_type("material", char_virtual(&types, "cotton"))
        .unwrap();
    assert!(!product.is_materialized().unwrap());
    assert_eq!(product.add_virtual_fields_to_field_list().unwrap(), 1);
    assert!(product.is_materialized().unwrap());
}

#[test]
fn test_random_splice_sequences_keep_concrete_order() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for policy in [DematerializePolicy::Lenient, DematerializePolicy::Strict] {
        let product = product_type(VirtualFieldConfig {
            dematerialize_policy: policy,
            ..Default::default()
        });
        let mut materialized = false;
        for _ in 0..200 {
            if rng.gen_bool(0.5) {
                product.add_virtual_fields_to_field_list().unwrap();
                materialized = true;
            } else {
                let result = product.remove_virtual_fields_from_field_list();
                match (policy, materialized) {
                    (DematerializePolicy::Strict, false) => assert!(result.is_err()),
                    _ => assert!(result.is_ok()),
                }
                materialized = false;
            }

            let names = product.field_names().unwrap();
            assert_eq!(&names[..3], PRODUCT_FIELDS);
            assert_eq!(names.len(), if materialized { 6 } else { 3 });
            assert_eq!(product.is_materialized().unwrap(), materialized);
        }
    }
}

#[test]
fn test_subtype_sharing_list_keeps_accessors_in_sync() {
    let product = product_type(Default::default());
    let shirt = EntityType::builder("Shirt").extends(&product).build().unwrap();
    assert!(shirt.has_splice_ops().unwrap());

    let types = field_types();
    shirt.add_to_type("sleeve", char_virtual(&types, "short")).unwrap();
    assert!(product.has_virtual_field("sleeve").unwrap());

    let mut record = product.new_record().unwrap();
    assert_eq!(record.get("sleeve").unwrap(), Value::from("short"));
    record.set("sleeve", "long").unwrap();
    assert_eq!(
        record.backing_map("data").unwrap().get("sleeve"),
        Some(&Value::from("long"))
    );

    let err = product
        .add_to_type("sleeve", char_virtual(&types, "none"))
        .unwrap_err();
    assert!(matches!(err, VirtualFieldError::FieldAlreadyExists { .. }));

    assert_eq!(product.add_virtual_fields_to_field_list().unwrap(), 4);
    assert_eq!(shirt.add_virtual_fields_to_field_list().unwrap(), 4);
    let expected = vec!["id", "title", "data", "color", "size", "stock", "sleeve"];
    assert_eq!(product.field_names().unwrap(), expected);
    assert_eq!(shirt.field_names().unwrap(), expected);
    assert_eq!(record.to_json().unwrap()["sleeve"], "long");

    shirt.remove_virtual_fields_from_field_list().unwrap();
    assert_eq!(shirt.field_names().unwrap(), PRODUCT_FIELDS);
    assert_eq!(product.field_names().unwrap(), expected);
}

#[test]
fn test_subtype_with_separate_list_splices_independently() {
    let product = product_type(Default::default());
    let shirt = EntityType::builder("Shirt")
        .extends(&product)
        .separate_virtual_fields()
        .build()
        .unwrap();

    let types = field_types();
    shirt.add_to_type("sleeve", char_virtual(&types, "short")).unwrap();
    assert!(!product.has_virtual_field("sleeve").unwrap());

    assert_eq!(product.add_virtual_fields_to_field_list().unwrap(), 3);
    assert_eq!(shirt.add_virtual_fields_to_field_list().unwrap(), 4);
    assert_eq!(product.field_names().unwrap().len(), 6);
    assert_eq!(shirt.field_names().unwrap().len(), 7);
}
