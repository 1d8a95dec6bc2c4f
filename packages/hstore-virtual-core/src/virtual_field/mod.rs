//! Virtual fields: composition, binding, attribute access and field list splicing.

mod bind;
mod compose;
mod descriptor;
mod splice;

use std::fmt;
use std::sync::OnceLock;

use hstore_types::{FieldBinding, FieldError, FieldOptions, FieldType, Type, Value};

use crate::error::VirtualFieldError;

pub(crate) use bind::check_bind;
pub use compose::{compose, BaseFieldRef, HSTORE_FIELD_NAME};
pub use descriptor::Descriptor;
pub(crate) use splice::SpliceOps;

/// A base field type wrapped with hstore key access.
///
/// The wrapped base type keeps supplying options, validation and database
/// metadata. The wrapper owns the binding hook: it always attaches
/// virtual-only, then serves get/set for its key in the map stored under
/// `hstore_field_name` on each record.
pub struct VirtualField {
    base: Box<dyn FieldType>,
    hstore_field_name: String,
    bound: OnceLock<BoundTo>,
}

/// Where a virtual field was bound; set exactly once.
#[derive(Debug, Clone)]
pub(crate) struct BoundTo {
    pub(crate) owner: String,
    pub(crate) binding: FieldBinding,
}

impl VirtualField {
    /// Wraps `base` as a virtual field stored in the map attribute `hstore_field_name`.
    ///
    /// # Returns
    /// `Err(MissingBackingField)` if `hstore_field_name` is empty.
    pub fn new(
        base: Box<dyn FieldType>,
        hstore_field_name: impl Into<String>,
    ) -> Result<Self, VirtualFieldError> {
        let hstore_field_name = hstore_field_name.into();
        if hstore_field_name.trim().is_empty() {
            return Err(VirtualFieldError::MissingBackingField);
        }
        Ok(Self {
            base,
            hstore_field_name,
            bound: OnceLock::new(),
        })
    }

    /// Name of the map attribute holding this field's value.
    pub fn hstore_field_name(&self) -> &str {
        &self.hstore_field_name
    }

    /// The wrapped base field type.
    pub fn base(&self) -> &dyn FieldType {
        self.base.as_ref()
    }

    /// Attribute and map key name, once bound.
    pub fn name(&self) -> Option<&str> {
        self.bound.get().map(|b| b.binding.name.as_str())
    }

    /// Owning entity type name, once bound.
    pub fn owner(&self) -> Option<&str> {
        self.bound.get().map(|b| b.owner.as_str())
    }

    /// Bookkeeping produced by the base attach hook, once bound.
    pub fn binding(&self) -> Option<&FieldBinding> {
        self.bound.get().map(|b| &b.binding)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.get().is_some()
    }

    /// Value returned when the key is absent from the map.
    pub fn default(&self) -> Value {
        self.base.default_value()
    }

    fn display_name(&self) -> String {
        self.name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("<unbound {}>", self.base.type_name()))
    }
}

impl FieldType for VirtualField {
    fn type_name(&self) -> &str {
        self.base.type_name()
    }

    fn ty(&self) -> Type {
        self.base.ty()
    }

    fn options(&self) -> &FieldOptions {
        self.base.options()
    }

    fn coerce(&self, value: Value) -> Result<Value, FieldError> {
        self.base.coerce(value)
    }

    fn db_type(&self) -> String {
        self.base.db_type()
    }

    fn default_value(&self) -> Value {
        self.base.default_value()
    }

    fn validate(&self, value: &Value) -> Result<(), FieldError> {
        self.base.validate(value)
    }

    fn clean(&self, value: Value) -> Result<Value, FieldError> {
        self.base.clean(value)
    }

    /// Always attaches virtual-only, whatever the caller asks for.
    fn contribute_to_type(&self, name: &str, _virtual_only: bool) -> FieldBinding {
        self.base.contribute_to_type(name, true)
    }
}

impl fmt::Debug for VirtualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualField")
            .field("name", &self.name())
            .field("base", &self.base.type_name())
            .field("hstore_field_name", &self.hstore_field_name)
            .field("owner", &self.owner())
            .finish()
    }
}
