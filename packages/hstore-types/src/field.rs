//! Base field types: options, validation and the attach hook.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Type, Value};

/// Error type for field construction, lookup and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// No field type registered under this name.
    #[error("unknown field type '{name}'")]
    UnknownFieldType { name: String },

    /// A field type with this name is already registered.
    #[error("field type '{name}' already registered")]
    AlreadyRegistered { name: String },

    /// Options rejected by the field type's constructor.
    #[error("invalid options for {field_type}: {message}")]
    InvalidOptions { field_type: String, message: String },

    /// `Null` given to a field declared without `null`.
    #[error("this field cannot be null")]
    NullNotAllowed,

    /// Empty value given to a field declared without `blank`.
    #[error("this field cannot be blank")]
    BlankNotAllowed,

    /// String longer than `max_length`.
    #[error("ensure this value has at most {max_length} characters (it has {length})")]
    TooLong { max_length: usize, length: usize },

    /// Value not among the declared choices.
    #[error("value {value} is not a valid choice")]
    InvalidChoice { value: String },

    /// Value cannot be coerced to the field's type.
    #[error("'{value}' is not a valid {expected} value")]
    InvalidValue { expected: Type, value: String },

    /// Registry lock poisoned
    #[error("field type registry lock poisoned")]
    LockPoisoned,
}

/// Construction options shared by every field type.
///
/// Deserializes from a keyword-style JSON object; unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOptions {
    /// Whether `Null` is a storable value.
    pub null: bool,
    /// Whether empty values pass validation.
    pub blank: bool,
    /// Value used when nothing is stored.
    pub default: Option<Value>,
    /// Maximum length in characters for text fields.
    pub max_length: Option<usize>,
    /// Column name override.
    pub db_column: Option<String>,
    pub help_text: Option<String>,
    /// Restricts values to this list when set.
    pub choices: Option<Vec<Value>>,
}

impl FieldOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    #[must_use]
    pub fn blankable(mut self) -> Self {
        self.blank = true;
        self
    }

    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }
}

/// Bookkeeping produced when a field attaches to an owning type.
///
/// `column` is `None` for virtual-only fields: they own no storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBinding {
    /// Attribute name on the owning type
    pub name: String,
    /// Attribute name used on instances
    pub attname: String,
    /// Backing column, if the field has one
    pub column: Option<String>,
    /// Database column type
    pub db_type: String,
    /// Whether the column accepts NULL
    pub null: bool,
}

impl FieldBinding {
    /// Returns `true` when the field occupies no column of its own.
    pub fn is_virtual(&self) -> bool {
        self.column.is_none()
    }
}

/// A base field type: storage type, options and validation rules.
///
/// Implementors supply `type_name`, `ty`, `options` and `coerce`; validation
/// and the attach hook have defaults that follow the options.
pub trait FieldType: fmt::Debug + Send + Sync {
    /// Class-style name, e.g. `"CharField"`.
    fn type_name(&self) -> &str;

    /// Storage type.
    fn ty(&self) -> Type;

    fn options(&self) -> &FieldOptions;

    /// Converts a raw value to this field's representation.
    ///
    /// `Null` is passed through unchanged; `validate` decides if it's allowed.
    fn coerce(&self, value: Value) -> Result<Value, FieldError>;

    /// Database column type.
    fn db_type(&self) -> String {
        self.ty().db_type(self.options().max_length)
    }

    /// Value used when nothing is stored.
    fn default_value(&self) -> Value {
        self.options().default.clone().unwrap_or(Value::Null)
    }

    /// Checks an already-coerced value against the options.
    fn validate(&self, value: &Value) -> Result<(), FieldError> {
        let options = self.options();
        if value.is_null() {
            return if options.null {
                Ok(())
            } else {
                Err(FieldError::NullNotAllowed)
            };
        }
        if value.is_blank() && !options.blank {
            return Err(FieldError::BlankNotAllowed);
        }
        if let (Some(max_length), Value::String(s)) = (options.max_length, value) {
            let length = s.chars().count();
            if length > max_length {
                return Err(FieldError::TooLong { max_length, length });
            }
        }
        if let Some(choices) = &options.choices {
            if !choices.contains(value) {
                return Err(FieldError::InvalidChoice {
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Coerces then validates `value`, returning the cleaned value.
    fn clean(&self, value: Value) -> Result<Value, FieldError> {
        let value = self.coerce(value)?;
        self.validate(&value)?;
        Ok(value)
    }

    /// Attach hook run when the field is bound to an owning type.
    ///
    /// With `virtual_only` the field gets no column and must not be added to
    /// the owner's standard field list.
    fn contribute_to_type(&self, name: &str, virtual_only: bool) -> FieldBinding {
        let column = if virtual_only {
            None
        } else {
            Some(
                self.options()
                    .db_column
                    .clone()
                    .unwrap_or_else(|| name.to_string()),
            )
        };
        FieldBinding {
            name: name.to_string(),
            attname: name.to_string(),
            column,
            db_type: self.db_type(),
            null: self.options().null,
        }
    }
}

/// Constructor signature for a field class.
pub type FieldConstructor =
    dyn Fn(FieldOptions) -> Result<Box<dyn FieldType>, FieldError> + Send + Sync;

/// A named field constructor, the unit stored in the field type registry.
#[derive(Clone)]
pub struct FieldClass {
    name: String,
    constructor: Arc<FieldConstructor>,
}

impl FieldClass {
    /// Creates a field class from a name and constructor.
    pub fn new(
        name: impl Into<String>,
        constructor: impl Fn(FieldOptions) -> Result<Box<dyn FieldType>, FieldError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructs a field of this class.
    pub fn construct(&self, options: FieldOptions) -> Result<Box<dyn FieldType>, FieldError> {
        (self.constructor)(options)
    }
}

impl fmt::Debug for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldClass")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
