//! Process-wide registry of entity types.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hstore_types::FieldTypeRegistry;

use crate::entity::EntityType;
use crate::error::VirtualFieldError;
use crate::virtual_field::{compose, BaseFieldRef, VirtualField};

/// Registry holding entity types keyed by name, plus the field type registry
/// used to resolve base fields by name.
#[derive(Debug)]
pub struct EntityRegistry {
    /// Map of entity type name to entity type
    entities: RwLock<HashMap<String, Arc<EntityType>>>,
    /// Field classes available to `compose`
    field_types: Arc<FieldTypeRegistry>,
}

impl EntityRegistry {
    /// Creates an empty registry with an empty field type registry.
    pub fn new() -> Self {
        Self::with_field_types(Arc::new(FieldTypeRegistry::new()))
    }

    /// Creates an empty registry whose field type registry holds the built-in types.
    pub fn with_builtin_types() -> Result<Self, VirtualFieldError> {
        Ok(Self::with_field_types(Arc::new(
            FieldTypeRegistry::with_builtin_types()?,
        )))
    }

    /// Creates a registry with an existing field type registry.
    pub fn with_field_types(field_types: Arc<FieldTypeRegistry>) -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            field_types,
        }
    }

    /// Returns a reference to the field type registry.
    pub fn field_types(&self) -> &Arc<FieldTypeRegistry> {
        &self.field_types
    }

    /// Composes a virtual field against this registry's field types.
    ///
    /// See [`compose`].
    pub fn compose(
        &self,
        base: impl Into<BaseFieldRef>,
        options: serde_json::Value,
    ) -> Result<VirtualField, VirtualFieldError> {
        compose(&self.field_types, base, options)
    }

    /// Registers an entity type under its name.
    ///
    /// # Returns
    /// `Err(EntityAlreadyRegistered)` if the name is taken.
    pub fn register(&self, entity: Arc<EntityType>) -> Result<(), VirtualFieldError> {
        let mut entities = self
            .entities
            .write()
            .map_err(|_| VirtualFieldError::LockPoisoned)?;
        if entities.contains_key(entity.name()) {
            return Err(VirtualFieldError::EntityAlreadyRegistered {
                entity: entity.name().to_string(),
            });
        }
        tracing::debug!(entity = entity.name(), "registered entity type");
        entities.insert(entity.name().to_string(), entity);
        Ok(())
    }

    /// Gets an entity type by name.
    pub fn get(&self, name: &str) -> Result<Arc<EntityType>, VirtualFieldError> {
        let entities = self
            .entities
            .read()
            .map_err(|_| VirtualFieldError::LockPoisoned)?;
        entities
            .get(name)
            .cloned()
            .ok_or_else(|| VirtualFieldError::EntityNotFound {
                entity: name.to_string(),
            })
    }

    /// Checks if an entity type is registered.
    pub fn contains(&self, name: &str) -> bool {
        match self.entities.read() {
            Ok(entities) => entities.contains_key(name),
            Err(_) => false,
        }
    }

    /// Removes an entity type by name.
    pub fn remove(&self, name: &str) -> Result<Arc<EntityType>, VirtualFieldError> {
        let mut entities = self
            .entities
            .write()
            .map_err(|_| VirtualFieldError::LockPoisoned)?;
        entities
            .remove(name)
            .ok_or_else(|| VirtualFieldError::EntityNotFound {
                entity: name.to_string(),
            })
    }

    /// Returns all registered entity type names, sorted.
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.entities.read() {
            Ok(entities) => entities.keys().cloned().collect(),
            Err(_) => return Vec::new(),
        };
        names.sort();
        names
    }

    /// Returns the number of registered entity types.
    pub fn entity_count(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Materializes every registered type that has virtual fields.
    ///
    /// Returns the total number of fields added.
    pub fn materialize_all(&self) -> Result<usize, VirtualFieldError> {
        self.for_each_with_virtual_fields(|entity| entity.add_virtual_fields_to_field_list())
    }

    /// Dematerializes every registered type that has virtual fields.
    ///
    /// Returns the total number of fields removed.
    pub fn dematerialize_all(&self) -> Result<usize, VirtualFieldError> {
        self.for_each_with_virtual_fields(|entity| entity.remove_virtual_fields_from_field_list())
    }

    fn for_each_with_virtual_fields<F>(&self, f: F) -> Result<usize, VirtualFieldError>
    where
        F: Fn(&EntityType) -> Result<usize, VirtualFieldError>,
    {
        let entities: Vec<Arc<EntityType>> = {
            let entities = self
                .entities
                .read()
                .map_err(|_| VirtualFieldError::LockPoisoned)?;
            entities.values().cloned().collect()
        };
        let mut total = 0;
        for entity in entities {
            if entity.has_splice_ops()? {
                total += f(&entity)?;
            }
        }
        Ok(total)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
