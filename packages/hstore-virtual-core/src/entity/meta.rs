//! Per-type metadata container and the shared virtual field list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arc_swap::ArcSwap;
use hstore_types::Type;

use super::field_ref::{ConcreteField, FieldRef};
use crate::error::VirtualFieldError;
use crate::virtual_field::{Descriptor, SpliceOps, VirtualField};

/// Accessor table: attribute name to get/set capability.
pub type Accessors = HashMap<String, Arc<dyn Descriptor>>;

/// Metadata of one entity type.
#[derive(Debug, Default)]
pub struct EntityMeta {
    /// Visible field list: concrete fields plus any materialized virtual fields
    pub(crate) fields: Vec<FieldRef>,
    /// Installed when the type gets a virtual field list
    pub(crate) splice: Option<SpliceOps>,
}

impl EntityMeta {
    /// Visible field list.
    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    /// Finds a concrete field by name.
    pub fn concrete_field(&self, name: &str) -> Option<&Arc<ConcreteField>> {
        self.fields.iter().find_map(|f| match f {
            FieldRef::Concrete(field) if field.name() == name => Some(field),
            _ => None,
        })
    }

    /// Iterates concrete fields in declaration order.
    pub fn concrete_fields(&self) -> impl Iterator<Item = &Arc<ConcreteField>> {
        self.fields.iter().filter_map(|f| match f {
            FieldRef::Concrete(field) => Some(field),
            FieldRef::Virtual(_) => None,
        })
    }
}

/// Concrete schema of an entity type reading a virtual field list.
///
/// Concrete fields are fixed once a type is built.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub(crate) entity: String,
    concrete: HashMap<String, Type>,
}

impl Member {
    pub(crate) fn of(entity: &str, meta: &EntityMeta) -> Self {
        Self {
            entity: entity.to_string(),
            concrete: meta
                .concrete_fields()
                .map(|f| (f.name().to_string(), f.field_type().ty()))
                .collect(),
        }
    }

    /// Storage type of the concrete field `name`, if declared.
    pub(crate) fn concrete_type(&self, name: &str) -> Option<Type> {
        self.concrete.get(name).copied()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListEntries {
    /// Bound virtual fields, in bind order
    pub(crate) fields: Vec<Arc<VirtualField>>,
    /// Every entity type reading this list
    pub(crate) members: Vec<Member>,
}

/// Virtual fields bound to a type, in bind order, and their accessor table.
///
/// Shared by reference between a type and the subtypes that extend it. All
/// members resolve the same accessors; a field binds only if its name is free
/// and its backing map is an hstore field on every member.
#[derive(Debug)]
pub(crate) struct VirtualFieldList {
    entries: RwLock<ListEntries>,
    accessors: ArcSwap<Accessors>,
}

impl VirtualFieldList {
    pub(crate) fn new(member: Member) -> Self {
        Self {
            entries: RwLock::new(ListEntries {
                fields: Vec::new(),
                members: vec![member],
            }),
            accessors: ArcSwap::from_pointee(Accessors::new()),
        }
    }

    /// A list with the same fields and accessors, read by `member` alone.
    pub(crate) fn detached_copy(&self, member: Member) -> Result<Self, VirtualFieldError> {
        Ok(Self {
            entries: RwLock::new(ListEntries {
                fields: self.fields()?,
                members: vec![member],
            }),
            accessors: ArcSwap::new(self.accessors()),
        })
    }

    pub(crate) fn entries(&self) -> Result<RwLockReadGuard<'_, ListEntries>, VirtualFieldError> {
        self.entries.read().map_err(|_| VirtualFieldError::LockPoisoned)
    }

    pub(crate) fn entries_mut(
        &self,
    ) -> Result<RwLockWriteGuard<'_, ListEntries>, VirtualFieldError> {
        self.entries.write().map_err(|_| VirtualFieldError::LockPoisoned)
    }

    /// Snapshot of the bound fields.
    pub(crate) fn fields(&self) -> Result<Vec<Arc<VirtualField>>, VirtualFieldError> {
        Ok(self.entries()?.fields.clone())
    }

    pub(crate) fn accessor(&self, name: &str) -> Option<Arc<dyn Descriptor>> {
        self.accessors.load().get(name).cloned()
    }

    pub(crate) fn accessors(&self) -> Arc<Accessors> {
        self.accessors.load_full()
    }

    /// Publishes `descriptor` as the accessor for `name` on every member.
    ///
    /// Callers hold the entries write lock, which serializes publishers.
    pub(crate) fn install_accessor(&self, name: &str, descriptor: Arc<dyn Descriptor>) {
        let mut accessors = (*self.accessors.load_full()).clone();
        accessors.insert(name.to_string(), descriptor);
        self.accessors.store(Arc::new(accessors));
    }

    /// Adds `member` as a reader of this list.
    ///
    /// Fails if a bound field would shadow one of its concrete fields or its
    /// backing map is not an hstore field of `member`.
    pub(crate) fn join(&self, member: Member) -> Result<(), VirtualFieldError> {
        let mut entries = self.entries_mut()?;
        let accessors = self.accessors.load();
        if let Some(name) = member.concrete.keys().find(|n| accessors.contains_key(n.as_str())) {
            return Err(VirtualFieldError::FieldAlreadyExists {
                entity: member.entity.clone(),
                field: name.clone(),
            });
        }
        if let Some(field) = entries
            .fields
            .iter()
            .find(|f| member.concrete_type(f.hstore_field_name()) != Some(Type::HStore))
        {
            return Err(VirtualFieldError::BindingContext {
                field: field.name().unwrap_or_default().to_string(),
                message: format!(
                    "backing field '{}' is not an hstore field of '{}'",
                    field.hstore_field_name(),
                    member.entity
                ),
            });
        }
        entries.members.push(member);
        Ok(())
    }
}
