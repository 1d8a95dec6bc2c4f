//! Attribute access through records.

use hstore_types::{HStore, Value};
use hstore_virtual_core::{VirtualFieldConfig, VirtualFieldError};

use super::helpers::product_type;

#[test]
fn test_empty_map_reads_defaults() -> anyhow::Result<()> {
    let record = product_type(Default::default()).new_record()?;
    assert!(record.backing_map("data")?.is_empty());
    assert_eq!(record.get("color")?, Value::from("unknown"));
    assert_eq!(record.get("size")?, Value::from("M"));
    assert_eq!(record.get("stock")?, Value::Int(0));
    Ok(())
}

#[test]
fn test_read_set_read_keeps_map_identity() -> anyhow::Result<()> {
    let mut record = product_type(Default::default()).new_record()?;
    record.set("data", HStore::from_iter([("color", "red")]))?;
    assert_eq!(record.get("color")?, Value::from("red"));

    let before: *const HStore = record.backing_map("data")?;
    record.set("color", "blue")?;
    let after: *const HStore = record.backing_map("data")?;

    assert_eq!(record.get("color")?, Value::from("blue"));
    assert!(std::ptr::eq(before, after));
    Ok(())
}

#[test]
fn test_present_falsy_values_returned_verbatim() {
    let mut record = product_type(Default::default()).new_record().unwrap();
    record.set("color", "").unwrap();
    record.set("size", Value::Null).unwrap();
    record.set("stock", 0).unwrap();
    assert_eq!(record.get("color").unwrap(), Value::from(""));
    assert_eq!(record.get("size").unwrap(), Value::Null);
    assert_eq!(record.get("stock").unwrap(), Value::Int(0));
}

#[test]
fn test_set_writes_only_its_key() {
    let mut record = product_type(Default::default()).new_record().unwrap();
    record.set("size", "XL").unwrap();
    let map = record.backing_map("data").unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("size"), Some(&Value::from("XL")));
}

#[test]
fn test_set_is_not_validated_by_default() {
    let mut record = product_type(Default::default()).new_record().unwrap();
    record.set("stock", "plenty").unwrap();
    assert_eq!(record.get("stock").unwrap(), Value::from("plenty"));
    assert!(matches!(
        record.clean_virtual_fields(),
        Err(VirtualFieldError::Validation { ref field, .. }) if field == "stock"
    ));
}

#[test]
fn test_validate_on_set_coerces_through_base() {
    let config = VirtualFieldConfig {
        validate_on_set: true,
        ..Default::default()
    };
    let mut record = product_type(config).new_record().unwrap();
    record.set("stock", "12").unwrap();
    assert_eq!(record.get("stock").unwrap(), Value::Int(12));
    assert!(record.set("stock", "plenty").is_err());
    assert_eq!(record.get("stock").unwrap(), Value::Int(12));
}

#[test]
fn test_access_without_instance_fails() {
    let product = product_type(Default::default());
    assert!(matches!(
        product.get_attr("color"),
        Err(VirtualFieldError::UnboundAccess { .. })
    ));
    let descriptor = product.accessor("size").unwrap();
    assert!(matches!(
        descriptor.set(None, Value::from("S")),
        Err(VirtualFieldError::UnboundAccess { .. })
    ));
}

#[test]
fn test_records_do_not_share_maps() {
    let product = product_type(Default::default());
    let mut first = product.new_record().unwrap();
    let second = product.new_record().unwrap();
    first.set("color", "green").unwrap();
    assert_eq!(second.get("color").unwrap(), Value::from("unknown"));
}
