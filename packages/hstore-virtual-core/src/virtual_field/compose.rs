use hstore_types::{FieldClass, FieldError, FieldOptions, FieldTypeRegistry};
use serde_json::Value as JsonValue;

use super::VirtualField;
use crate::error::VirtualFieldError;

/// Option key naming the backing map attribute.
pub const HSTORE_FIELD_NAME: &str = "hstore_field_name";

/// The base field a virtual field is composed from.
#[derive(Debug, Clone)]
pub enum BaseFieldRef {
    /// Class name looked up in the field type registry
    Named(String),
    /// Field class given directly
    Class(FieldClass),
}

impl From<&str> for BaseFieldRef {
    fn from(name: &str) -> Self {
        BaseFieldRef::Named(name.to_string())
    }
}

impl From<String> for BaseFieldRef {
    fn from(name: String) -> Self {
        BaseFieldRef::Named(name)
    }
}

impl From<FieldClass> for BaseFieldRef {
    fn from(class: FieldClass) -> Self {
        BaseFieldRef::Class(class)
    }
}

impl BaseFieldRef {
    fn resolve(self, types: &FieldTypeRegistry) -> Result<FieldClass, VirtualFieldError> {
        match self {
            BaseFieldRef::Class(class) => Ok(class),
            BaseFieldRef::Named(name) => {
                if name.trim().is_empty() {
                    return Err(VirtualFieldError::InvalidFieldType { value: name });
                }
                types.resolve(&name).map_err(|e| match e {
                    FieldError::UnknownFieldType { name } => {
                        VirtualFieldError::InvalidFieldType { value: name }
                    }
                    other => VirtualFieldError::Field(other),
                })
            }
        }
    }
}

/// Creates a virtual field from a base field and keyword-style options.
///
/// `options` must be a JSON object containing a non-empty string under
/// `hstore_field_name`. That key is removed and the remaining keys are
/// handed to the base field's constructor as [`FieldOptions`].
///
/// No registry is touched; the returned field is bound later by its owning
/// entity type.
///
/// # Example
/// ```
/// use hstore_types::FieldTypeRegistry;
/// use hstore_virtual_core::virtual_field::compose;
/// use serde_json::json;
///
/// let types = FieldTypeRegistry::with_builtin_types().unwrap();
/// let field = compose(
///     &types,
///     "CharField",
///     json!({"hstore_field_name": "data", "max_length": 32, "default": "red"}),
/// )
/// .unwrap();
/// assert_eq!(field.hstore_field_name(), "data");
/// ```
pub fn compose(
    types: &FieldTypeRegistry,
    base: impl Into<BaseFieldRef>,
    options: JsonValue,
) -> Result<VirtualField, VirtualFieldError> {
    let mut options = match options {
        JsonValue::Object(map) => map,
        JsonValue::Null => Default::default(),
        other => {
            return Err(VirtualFieldError::InvalidOptions {
                message: format!("expected an object of keyword options, got {other}"),
            })
        }
    };

    let hstore_field_name = match options.remove(HSTORE_FIELD_NAME) {
        Some(JsonValue::String(name)) if !name.trim().is_empty() => name,
        _ => return Err(VirtualFieldError::MissingBackingField),
    };

    let class = base.into().resolve(types)?;

    let field_options: FieldOptions = serde_json::from_value(JsonValue::Object(options))
        .map_err(|e| VirtualFieldError::InvalidOptions {
            message: format!("{}: {e}", class.name()),
        })?;

    let base = class.construct(field_options).map_err(|e| match e {
        FieldError::InvalidOptions { field_type, message } => VirtualFieldError::InvalidOptions {
            message: format!("{field_type}: {message}"),
        },
        other => VirtualFieldError::Field(other),
    })?;

    tracing::debug!(
        base = class.name(),
        hstore_field_name = %hstore_field_name,
        "composed virtual field"
    );

    VirtualField::new(base, hstore_field_name)
}
