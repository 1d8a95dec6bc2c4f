use std::collections::HashMap;
use std::sync::RwLock;

use crate::builtin::register_builtin_types;
use crate::field::{FieldClass, FieldError};

/// Registry for field classes.
///
/// Stores field constructors with lookup by class name.
/// Provides thread-safe registration and retrieval.
#[derive(Debug, Default)]
pub struct FieldTypeRegistry {
    types: RwLock<HashMap<String, FieldClass>>,
}

impl FieldTypeRegistry {
    /// Creates a new empty field type registry.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry pre-populated with the built-in field classes.
    pub fn with_builtin_types() -> Result<Self, FieldError> {
        let registry = Self::new();
        register_builtin_types(&registry)?;
        Ok(registry)
    }

    /// Registers a field class.
    ///
    /// # Returns
    /// `Ok(())` if successful, `Err(FieldError)` if the name is taken.
    pub fn register(&self, class: FieldClass) -> Result<(), FieldError> {
        let mut types = self.types.write().map_err(|_| FieldError::LockPoisoned)?;

        if types.contains_key(class.name()) {
            return Err(FieldError::AlreadyRegistered {
                name: class.name().to_string(),
            });
        }

        types.insert(class.name().to_string(), class);
        Ok(())
    }

    /// Retrieves a field class by name.
    pub fn get(&self, name: &str) -> Option<FieldClass> {
        let types = self.types.read().ok()?;
        types.get(name).cloned()
    }

    /// Retrieves a field class by name, failing with `UnknownFieldType`.
    pub fn resolve(&self, name: &str) -> Result<FieldClass, FieldError> {
        self.get(name).ok_or_else(|| FieldError::UnknownFieldType {
            name: name.to_string(),
        })
    }

    /// Checks if a field class is registered.
    pub fn contains(&self, name: &str) -> bool {
        let types = match self.types.read() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        types.contains_key(name)
    }

    /// Returns all registered class names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let types = match self.types.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let mut names: Vec<String> = types.keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes a field class registration.
    ///
    /// # Returns
    /// `true` if the class was removed, `false` if it wasn't found.
    pub fn remove(&self, name: &str) -> bool {
        let mut types = match self.types.write() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        types.remove(name).is_some()
    }
}
