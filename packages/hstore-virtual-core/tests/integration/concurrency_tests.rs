//! Concurrent access.

use std::sync::Arc;
use std::thread;

use ntest::timeout;

use hstore_types::Value;

use super::helpers::{product_type, PRODUCT_FIELDS};

#[test]
#[timeout(10000)]
fn test_threads_on_separate_records() {
    let product = product_type(Default::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let product = Arc::clone(&product);
            thread::spawn(move || {
                let mut record = product.new_record().unwrap();
                for n in 0..500 {
                    record.set("stock", i * 1000 + n).unwrap();
                    assert_eq!(record.get("stock").unwrap(), Value::Int(i * 1000 + n));
                }
                record.get("color").unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::from("unknown"));
    }
}

#[test]
#[timeout(10000)]
fn test_concurrent_splices_are_serialized() {
    let product = product_type(Default::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let product = Arc::clone(&product);
            thread::spawn(move || {
                for _ in 0..200 {
                    if i % 2 == 0 {
                        product.add_virtual_fields_to_field_list().unwrap();
                    } else {
                        product.remove_virtual_fields_from_field_list().unwrap();
                    }
                    let names = product.field_names().unwrap();
                    assert!(names.len() == 3 || names.len() == 6, "{names:?}");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    product.remove_virtual_fields_from_field_list().unwrap();
    assert_eq!(product.field_names().unwrap(), PRODUCT_FIELDS);
}
