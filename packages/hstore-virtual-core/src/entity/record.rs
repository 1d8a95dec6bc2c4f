//! Entity instances.

use std::collections::HashMap;
use std::sync::Arc;

use hstore_types::{FieldType, HStore, Value};

use super::entity_type::EntityType;
use super::field_ref::FieldRef;
use crate::error::VirtualFieldError;
use crate::virtual_field::Descriptor;

/// One instance of an entity type.
///
/// Holds a value per concrete field. Attribute access consults the type's
/// accessor table first, so virtual fields resolve into the backing map.
#[derive(Debug, Clone)]
pub struct Record {
    entity: Arc<EntityType>,
    values: HashMap<String, Value>,
}

impl Record {
    /// Creates a record with every concrete field at its default.
    ///
    /// Hstore fields start as empty maps.
    pub fn new(entity: Arc<EntityType>) -> Result<Self, VirtualFieldError> {
        let values = {
            let meta = entity.meta()?;
            meta.concrete_fields()
                .map(|f| (f.name().to_string(), f.field_type().default_value()))
                .collect()
        };
        Ok(Self { entity, values })
    }

    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// Reads an attribute.
    pub fn get(&self, name: &str) -> Result<Value, VirtualFieldError> {
        if let Some(descriptor) = self.entity.accessor(name) {
            return descriptor.get(Some(self));
        }
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| self.entity.attribute_not_found(name))
    }

    /// Writes an attribute.
    ///
    /// Virtual fields write into their backing map; concrete fields are
    /// replaced wholesale.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), VirtualFieldError> {
        let value = value.into();
        if let Some(descriptor) = self.entity.accessor(name) {
            return descriptor.set(Some(self), value);
        }
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.entity.attribute_not_found(name)),
        }
    }

    /// Returns the hstore map stored in attribute `name`.
    pub fn backing_map(&self, name: &str) -> Result<&HStore, VirtualFieldError> {
        match self.values.get(name) {
            Some(Value::HStore(map)) => Ok(map),
            Some(_) => Err(VirtualFieldError::BackingFieldNotAMap {
                entity: self.entity.name().to_string(),
                field: name.to_string(),
            }),
            None => Err(VirtualFieldError::BackingFieldNotFound {
                entity: self.entity.name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Returns the hstore map stored in attribute `name` for in-place edits.
    pub fn backing_map_mut(&mut self, name: &str) -> Result<&mut HStore, VirtualFieldError> {
        match self.values.get_mut(name) {
            Some(Value::HStore(map)) => Ok(map),
            Some(_) => Err(VirtualFieldError::BackingFieldNotAMap {
                entity: self.entity.name().to_string(),
                field: name.to_string(),
            }),
            None => Err(VirtualFieldError::BackingFieldNotFound {
                entity: self.entity.name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Validates every stored virtual field value through its base type.
    ///
    /// Absent keys are skipped: they read as the field default.
    pub fn clean_virtual_fields(&self) -> Result<(), VirtualFieldError> {
        for field in self.entity.virtual_fields()? {
            let Some(name) = field.name() else { continue };
            let map = self.backing_map(field.hstore_field_name())?;
            if let Some(value) = map.get(name) {
                field
                    .clean(value.clone())
                    .map_err(|source| VirtualFieldError::Validation {
                        field: name.to_string(),
                        source,
                    })?;
            }
        }
        Ok(())
    }

    /// Serializes the record through the visible field list.
    ///
    /// Virtual fields appear only while materialized.
    pub fn to_json(&self) -> Result<serde_json::Value, VirtualFieldError> {
        let mut object = serde_json::Map::new();
        for field in self.entity.fields()? {
            let value = match &field {
                FieldRef::Concrete(concrete) => self
                    .values
                    .get(concrete.name())
                    .cloned()
                    .unwrap_or(Value::Null),
                FieldRef::Virtual(virtual_field) => virtual_field.get(Some(self))?,
            };
            object.insert(field.name().to_string(), value.to_json());
        }
        Ok(serde_json::Value::Object(object))
    }

    /// Materializes this record's entity type.
    pub fn materialize(&self) -> Result<usize, VirtualFieldError> {
        self.entity.add_virtual_fields_to_field_list()
    }

    /// Dematerializes this record's entity type.
    pub fn dematerialize(&self) -> Result<usize, VirtualFieldError> {
        self.entity.remove_virtual_fields_from_field_list()
    }
}
