//! Entries of an entity type's visible field list.

use std::sync::Arc;

use hstore_types::{FieldBinding, FieldType};

use crate::virtual_field::VirtualField;

/// A field that owns a column on the entity.
#[derive(Debug)]
pub struct ConcreteField {
    binding: FieldBinding,
    field_type: Box<dyn FieldType>,
}

impl ConcreteField {
    /// Attaches `field_type` under `name` through its attach hook.
    pub fn attach(name: &str, field_type: Box<dyn FieldType>) -> Self {
        let binding = field_type.contribute_to_type(name, false);
        Self {
            binding,
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.binding.name
    }

    pub fn binding(&self) -> &FieldBinding {
        &self.binding
    }

    pub fn field_type(&self) -> &dyn FieldType {
        self.field_type.as_ref()
    }
}

/// An entry in the visible field list.
///
/// Equality is identity: two entries are equal when they point at the same
/// field object.
#[derive(Debug, Clone)]
pub enum FieldRef {
    Concrete(Arc<ConcreteField>),
    Virtual(Arc<VirtualField>),
}

impl FieldRef {
    /// Field name; `""` for a virtual field that was never bound.
    pub fn name(&self) -> &str {
        match self {
            FieldRef::Concrete(field) => field.name(),
            FieldRef::Virtual(field) => field.name().unwrap_or(""),
        }
    }

    pub fn field_type(&self) -> &dyn FieldType {
        match self {
            FieldRef::Concrete(field) => field.field_type(),
            FieldRef::Virtual(field) => &**field,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, FieldRef::Virtual(_))
    }

    /// Returns `true` if this entry is exactly `field`.
    pub fn is_same_virtual(&self, field: &Arc<VirtualField>) -> bool {
        match self {
            FieldRef::Virtual(own) => Arc::ptr_eq(own, field),
            FieldRef::Concrete(_) => false,
        }
    }
}

impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldRef::Concrete(a), FieldRef::Concrete(b)) => Arc::ptr_eq(a, b),
            (FieldRef::Virtual(a), FieldRef::Virtual(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for FieldRef {}
