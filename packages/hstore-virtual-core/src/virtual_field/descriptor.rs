use std::fmt;

use hstore_types::{FieldType, Value};

use super::VirtualField;
use crate::entity::Record;
use crate::error::VirtualFieldError;

/// Get/set capability installed in an entity type's accessor table.
///
/// `None` means the access came through the type rather than an instance.
pub trait Descriptor: fmt::Debug + Send + Sync {
    fn get(&self, instance: Option<&Record>) -> Result<Value, VirtualFieldError>;

    fn set(&self, instance: Option<&mut Record>, value: Value) -> Result<(), VirtualFieldError>;
}

impl Descriptor for VirtualField {
    /// Reads this field's key from the record's backing map.
    ///
    /// A missing key yields the field default; a present key is returned as
    /// stored, falsy values included.
    fn get(&self, instance: Option<&Record>) -> Result<Value, VirtualFieldError> {
        let record = instance.ok_or_else(|| VirtualFieldError::UnboundAccess {
            field: self.display_name(),
        })?;
        let key = self.bound_name()?;
        let map = record.backing_map(&self.hstore_field_name)?;
        tracing::trace!(field = key, entity = record.entity().name(), "virtual get");
        Ok(map.get_or(key, &self.default()))
    }

    /// Writes `value` under this field's key, mutating the map in place.
    fn set(&self, instance: Option<&mut Record>, value: Value) -> Result<(), VirtualFieldError> {
        let record = instance.ok_or_else(|| VirtualFieldError::UnboundAccess {
            field: self.display_name(),
        })?;
        let key = self.bound_name()?;
        let value = if record.entity().config().validate_on_set {
            self.clean(value)
                .map_err(|source| VirtualFieldError::Validation {
                    field: key.to_string(),
                    source,
                })?
        } else {
            value
        };
        tracing::trace!(field = key, entity = record.entity().name(), "virtual set");
        record
            .backing_map_mut(&self.hstore_field_name)?
            .insert(key, value);
        Ok(())
    }
}

impl VirtualField {
    fn bound_name(&self) -> Result<&str, VirtualFieldError> {
        self.name().ok_or_else(|| VirtualFieldError::BindingContext {
            field: self.display_name(),
            message: "field is not bound to an entity type".to_string(),
        })
    }
}
