//! Virtual field error types.

use hstore_types::FieldError;
use thiserror::Error;

/// Errors raised by composing, binding and accessing virtual fields.
#[derive(Error, Debug, Clone)]
pub enum VirtualFieldError {
    /// Base field name or class could not be resolved
    #[error("invalid base field type '{value}': expected a registered field type name or field class")]
    InvalidFieldType { value: String },

    /// No backing map attribute name supplied
    #[error("missing hstore_field_name option")]
    MissingBackingField,

    /// Options were not a keyword object or were rejected
    #[error("invalid field options: {message}")]
    InvalidOptions { message: String },

    /// Binding attempted outside a valid owning-type context
    #[error("cannot bind virtual field '{field}': {message}")]
    BindingContext { field: String, message: String },

    /// Get/set attempted without an instance
    #[error("virtual field '{field}' can only be accessed via an instance")]
    UnboundAccess { field: String },

    /// Dematerialize found a virtual field missing from the visible list
    #[error("virtual field '{field}' is not in the field list of '{entity}'")]
    NotMaterialized { entity: String, field: String },

    /// Splice operations called on a type without virtual fields
    #[error("entity type '{entity}' has no virtual fields")]
    NoVirtualFields { entity: String },

    /// Entity type declaration rejected
    #[error("invalid entity type '{entity}': {message}")]
    InvalidEntity { entity: String, message: String },

    /// Entity type not found
    #[error("entity type '{entity}' not found")]
    EntityNotFound { entity: String },

    /// Entity type already registered
    #[error("entity type '{entity}' already registered")]
    EntityAlreadyRegistered { entity: String },

    /// Field already exists on the entity type
    #[error("field '{field}' already exists on entity type '{entity}'")]
    FieldAlreadyExists { entity: String, field: String },

    /// Attribute unknown to the entity type
    #[error("'{entity}' has no attribute '{attribute}'")]
    AttributeNotFound { entity: String, attribute: String },

    /// Backing map attribute missing on the instance
    #[error("backing field '{field}' not found on '{entity}'")]
    BackingFieldNotFound { entity: String, field: String },

    /// Backing attribute holds something other than a map
    #[error("backing field '{field}' on '{entity}' is not an hstore map")]
    BackingFieldNotAMap { entity: String, field: String },

    /// Base field validation rejected a value
    #[error("validation failed for '{field}': {source}")]
    Validation { field: String, source: FieldError },

    /// Field type system error
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}
