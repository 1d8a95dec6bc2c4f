//! Built-in field types.

use crate::field::{FieldClass, FieldError, FieldOptions, FieldType};
use crate::registry::FieldTypeRegistry;
use crate::types::{Type, Value};

/// Names and storage types of the built-in field classes.
pub const BUILTIN_FIELD_TYPES: &[(&str, Type)] = &[
    ("BooleanField", Type::Boolean),
    ("IntegerField", Type::Integer),
    ("BigIntegerField", Type::BigInteger),
    ("FloatField", Type::Float),
    ("CharField", Type::Char),
    ("TextField", Type::Text),
    ("HStoreField", Type::HStore),
];

/// Field type backed by one of the built-in storage types.
#[derive(Debug, Clone)]
pub struct BuiltinField {
    type_name: String,
    ty: Type,
    options: FieldOptions,
}

impl BuiltinField {
    /// Creates a built-in field, checking type-specific options.
    ///
    /// `Type::Char` requires `max_length`.
    pub fn new(
        type_name: impl Into<String>,
        ty: Type,
        options: FieldOptions,
    ) -> Result<Self, FieldError> {
        let type_name = type_name.into();
        if ty == Type::Char && options.max_length.is_none() {
            return Err(FieldError::InvalidOptions {
                field_type: type_name,
                message: "max_length is required".to_string(),
            });
        }
        if options.max_length == Some(0) {
            return Err(FieldError::InvalidOptions {
                field_type: type_name,
                message: "max_length must be positive".to_string(),
            });
        }
        Ok(Self {
            type_name,
            ty,
            options,
        })
    }

    /// Shorthand for a `CharField` with the given `max_length`.
    pub fn char(max_length: usize) -> Self {
        Self {
            type_name: "CharField".to_string(),
            ty: Type::Char,
            options: FieldOptions::new().with_max_length(max_length),
        }
    }

    /// Shorthand for an `HStoreField` starting as an empty map.
    pub fn hstore() -> Self {
        Self {
            type_name: "HStoreField".to_string(),
            ty: Type::HStore,
            options: FieldOptions::new().blankable(),
        }
    }

    /// Shorthand for a `BigIntegerField`.
    pub fn big_integer() -> Self {
        Self {
            type_name: "BigIntegerField".to_string(),
            ty: Type::BigInteger,
            options: FieldOptions::new(),
        }
    }

    fn invalid(&self, value: &Value) -> FieldError {
        FieldError::InvalidValue {
            expected: self.ty,
            value: value.to_string(),
        }
    }
}

/// Whole floats in `[-2^63, 2^63)` convert to `i64` without saturating.
fn fits_i64(f: f64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (-BOUND..BOUND).contains(&f)
}

impl FieldType for BuiltinField {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn ty(&self) -> Type {
        self.ty
    }

    fn options(&self) -> &FieldOptions {
        &self.options
    }

    fn coerce(&self, value: Value) -> Result<Value, FieldError> {
        if value.is_null() {
            return Ok(value);
        }
        match self.ty {
            Type::Boolean => match &value {
                Value::Bool(_) => Ok(value),
                Value::Int(0) => Ok(Value::Bool(false)),
                Value::Int(1) => Ok(Value::Bool(true)),
                Value::String(s) => match s.to_ascii_lowercase().as_str() {
                    "t" | "true" | "1" => Ok(Value::Bool(true)),
                    "f" | "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(self.invalid(&value)),
                },
                _ => Err(self.invalid(&value)),
            },
            Type::Integer | Type::BigInteger => {
                let n = match &value {
                    Value::Int(n) => *n,
                    Value::Float(f) if f.fract() == 0.0 && fits_i64(*f) => *f as i64,
                    Value::String(s) => s.trim().parse::<i64>().map_err(|_| self.invalid(&value))?,
                    _ => return Err(self.invalid(&value)),
                };
                if self.ty == Type::Integer && i32::try_from(n).is_err() {
                    return Err(self.invalid(&value));
                }
                Ok(Value::Int(n))
            }
            Type::Float => match &value {
                Value::Float(_) => Ok(value),
                Value::Int(n) => Ok(Value::Float(*n as f64)),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| self.invalid(&value)),
                _ => Err(self.invalid(&value)),
            },
            Type::Char | Type::Text => match value {
                Value::String(_) => Ok(value),
                Value::Bool(_) | Value::Int(_) | Value::Float(_) => {
                    Ok(Value::String(value.to_string()))
                }
                _ => Err(self.invalid(&value)),
            },
            Type::HStore => match value {
                Value::HStore(_) => Ok(value),
                _ => Err(self.invalid(&value)),
            },
        }
    }

    fn default_value(&self) -> Value {
        match (&self.options.default, self.ty) {
            (Some(default), _) => default.clone(),
            (None, Type::HStore) => Value::HStore(Default::default()),
            (None, _) => Value::Null,
        }
    }
}

/// Returns the field class for a built-in type name.
pub fn builtin_class(name: &str) -> Option<FieldClass> {
    let (name, ty) = BUILTIN_FIELD_TYPES
        .iter()
        .copied()
        .find(|(candidate, _)| *candidate == name)?;
    Some(FieldClass::new(name, move |options| {
        Ok(Box::new(BuiltinField::new(name, ty, options)?) as Box<dyn FieldType>)
    }))
}

/// Registers all built-in field classes in the registry.
///
/// # Returns
/// `Ok(())` if all types registered successfully.
pub fn register_builtin_types(registry: &FieldTypeRegistry) -> Result<(), FieldError> {
    for (name, _) in BUILTIN_FIELD_TYPES {
        if let Some(class) = builtin_class(name) {
            registry.register(class)?;
        }
    }
    Ok(())
}
