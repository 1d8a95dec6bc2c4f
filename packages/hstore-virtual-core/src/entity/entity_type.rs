//! Owning entity types and their construction.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arc_swap::ArcSwapOption;
use hstore_types::{FieldType, Value};

use super::field_ref::{ConcreteField, FieldRef};
use super::meta::{Accessors, EntityMeta, Member, VirtualFieldList};
use super::record::Record;
use crate::config::VirtualFieldConfig;
use crate::error::VirtualFieldError;
use crate::virtual_field::{check_bind, Descriptor, SpliceOps, VirtualField};

/// An entity type: its visible field list and virtual field list.
///
/// Metadata sits behind an `RwLock`; it is written at type construction,
/// when a virtual field binds, and by the splice operations. The virtual
/// field list, created on first bind or inherited from a parent, carries the
/// accessor table read on every attribute get/set.
#[derive(Debug)]
pub struct EntityType {
    name: String,
    config: VirtualFieldConfig,
    meta: RwLock<EntityMeta>,
    virtual_fields: ArcSwapOption<VirtualFieldList>,
}

impl EntityType {
    /// Starts declaring an entity type.
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &VirtualFieldConfig {
        &self.config
    }

    pub(crate) fn meta(&self) -> Result<RwLockReadGuard<'_, EntityMeta>, VirtualFieldError> {
        self.meta.read().map_err(|_| VirtualFieldError::LockPoisoned)
    }

    pub(crate) fn meta_mut(&self) -> Result<RwLockWriteGuard<'_, EntityMeta>, VirtualFieldError> {
        self.meta.write().map_err(|_| VirtualFieldError::LockPoisoned)
    }

    pub(crate) fn virtual_field_list(&self) -> Option<Arc<VirtualFieldList>> {
        self.virtual_fields.load_full()
    }

    /// Attaches the list created by the first bind.
    ///
    /// Callers hold the metadata write lock.
    pub(crate) fn attach_virtual_field_list(&self, list: Arc<VirtualFieldList>) {
        self.virtual_fields.store(Some(list));
    }

    /// Returns the accessor installed for `name`, if any.
    pub fn accessor(&self, name: &str) -> Option<Arc<dyn Descriptor>> {
        self.virtual_fields.load_full()?.accessor(name)
    }

    /// Binds `field` to this type under `name` after construction.
    ///
    /// Returns the bound field.
    pub fn add_to_type(
        &self,
        name: &str,
        field: impl Into<Arc<VirtualField>>,
    ) -> Result<Arc<VirtualField>, VirtualFieldError> {
        let field = field.into();
        field.bind(self, name)?;
        Ok(field)
    }

    /// Snapshot of the visible field list.
    pub fn fields(&self) -> Result<Vec<FieldRef>, VirtualFieldError> {
        Ok(self.meta()?.fields.clone())
    }

    /// Names in the visible field list, in order.
    pub fn field_names(&self) -> Result<Vec<String>, VirtualFieldError> {
        Ok(self
            .meta()?
            .fields
            .iter()
            .map(|f| f.name().to_string())
            .collect())
    }

    /// Virtual fields registered for this type, in bind order.
    ///
    /// Includes fields bound through any type sharing the list.
    pub fn virtual_fields(&self) -> Result<Vec<Arc<VirtualField>>, VirtualFieldError> {
        match self.virtual_field_list() {
            Some(list) => list.fields(),
            None => Ok(Vec::new()),
        }
    }

    /// Finds a registered virtual field by name.
    pub fn virtual_field(&self, name: &str) -> Result<Option<Arc<VirtualField>>, VirtualFieldError> {
        Ok(self
            .virtual_fields()?
            .into_iter()
            .find(|f| f.name() == Some(name)))
    }

    pub fn has_virtual_field(&self, name: &str) -> Result<bool, VirtualFieldError> {
        Ok(self.virtual_field(name)?.is_some())
    }

    /// Returns `true` once the splice operations are installed.
    pub fn has_splice_ops(&self) -> Result<bool, VirtualFieldError> {
        Ok(self.meta()?.splice.is_some())
    }

    /// Returns `true` if every registered virtual field is in the visible list.
    ///
    /// `false` for a type without virtual fields.
    pub fn is_materialized(&self) -> Result<bool, VirtualFieldError> {
        let meta = self.meta()?;
        let virtual_fields = self.virtual_fields()?;
        Ok(!virtual_fields.is_empty()
            && virtual_fields
                .iter()
                .all(|vf| meta.fields.iter().any(|f| f.is_same_virtual(vf))))
    }

    /// Materialize: appends each virtual field not yet in the visible list.
    ///
    /// Idempotent. Returns the number of fields added.
    pub fn add_virtual_fields_to_field_list(&self) -> Result<usize, VirtualFieldError> {
        let mut meta = self.meta_mut()?;
        let splice = self.installed_splice(&meta)?;
        let virtual_fields = self.virtual_fields()?;
        let added = splice.materialize(&mut meta.fields, &virtual_fields);
        tracing::debug!(entity = %self.name, added, "materialized virtual fields");
        Ok(added)
    }

    /// Dematerialize: removes the virtual fields from the visible list.
    ///
    /// Concrete fields keep their order. Returns the number of fields removed.
    pub fn remove_virtual_fields_from_field_list(&self) -> Result<usize, VirtualFieldError> {
        let mut meta = self.meta_mut()?;
        let splice = self.installed_splice(&meta)?;
        let virtual_fields = self.virtual_fields()?;
        let removed = splice.dematerialize(&self.name, &mut meta.fields, &virtual_fields)?;
        tracing::debug!(entity = %self.name, removed, "dematerialized virtual fields");
        Ok(removed)
    }

    fn installed_splice(&self, meta: &EntityMeta) -> Result<SpliceOps, VirtualFieldError> {
        meta.splice.ok_or_else(|| VirtualFieldError::NoVirtualFields {
            entity: self.name.clone(),
        })
    }

    /// Type-level attribute read.
    ///
    /// Virtual fields fail with `UnboundAccess`; they need a record.
    pub fn get_attr(&self, name: &str) -> Result<Value, VirtualFieldError> {
        match self.accessor(name) {
            Some(descriptor) => descriptor.get(None),
            None => Err(self.attribute_not_found(name)),
        }
    }

    /// Type-level attribute write; fails like [`EntityType::get_attr`].
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<(), VirtualFieldError> {
        match self.accessor(name) {
            Some(descriptor) => descriptor.set(None, value.into()),
            None => Err(self.attribute_not_found(name)),
        }
    }

    pub(crate) fn attribute_not_found(&self, name: &str) -> VirtualFieldError {
        VirtualFieldError::AttributeNotFound {
            entity: self.name.clone(),
            attribute: name.to_string(),
        }
    }

    /// Creates a record with every concrete field at its default.
    pub fn new_record(self: &Arc<Self>) -> Result<Record, VirtualFieldError> {
        Record::new(Arc::clone(self))
    }
}

/// Declares an entity type; `build` is the type construction phase.
///
/// Concrete fields attach first, in declaration order, then virtual fields
/// bind in declaration order.
pub struct EntityTypeBuilder {
    name: String,
    config: VirtualFieldConfig,
    parent: Option<Arc<EntityType>>,
    separate_virtual_fields: bool,
    fields: Vec<(String, Box<dyn FieldType>)>,
    virtual_fields: Vec<(String, Arc<VirtualField>)>,
}

impl EntityTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: VirtualFieldConfig::default(),
            parent: None,
            separate_virtual_fields: false,
            fields: Vec::new(),
            virtual_fields: Vec::new(),
        }
    }

    /// Declares a concrete field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: Box<dyn FieldType>) -> Self {
        self.fields.push((name.into(), field_type));
        self
    }

    /// Declares a virtual field, bound when the type is built.
    #[must_use]
    pub fn virtual_field(
        mut self,
        name: impl Into<String>,
        field: impl Into<Arc<VirtualField>>,
    ) -> Self {
        self.virtual_fields.push((name.into(), field.into()));
        self
    }

    /// Inherits `parent`'s concrete fields and virtual fields.
    ///
    /// The parent's virtual field list is shared unless
    /// [`separate_virtual_fields`](Self::separate_virtual_fields) is set: a
    /// field later bound to either type is then visible on both.
    #[must_use]
    pub fn extends(mut self, parent: &Arc<EntityType>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Gives this type its own copy of the parent's virtual field list.
    #[must_use]
    pub fn separate_virtual_fields(mut self) -> Self {
        self.separate_virtual_fields = true;
        self
    }

    #[must_use]
    pub fn config(mut self, config: VirtualFieldConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the type, attaching and binding every declared field.
    ///
    /// All declarations are checked before any virtual field binds, so a
    /// failed build leaves no field bound and no shared list touched.
    pub fn build(self) -> Result<Arc<EntityType>, VirtualFieldError> {
        let EntityTypeBuilder {
            name,
            config,
            parent,
            separate_virtual_fields,
            fields,
            virtual_fields,
        } = self;

        if name.trim().is_empty() {
            return Err(VirtualFieldError::InvalidEntity {
                entity: name,
                message: "entity type name must not be empty".to_string(),
            });
        }

        let mut meta = EntityMeta::default();
        let mut inherited = None;

        if let Some(parent) = &parent {
            let parent_meta = parent.meta()?;
            meta.fields = parent_meta
                .concrete_fields()
                .map(|field| FieldRef::Concrete(Arc::clone(field)))
                .collect();
            inherited = parent.virtual_field_list();
        }
        let accessors: Arc<Accessors> = inherited
            .as_ref()
            .map(|list| list.accessors())
            .unwrap_or_default();

        for (field_name, field_type) in fields {
            if field_name.trim().is_empty() {
                return Err(VirtualFieldError::InvalidEntity {
                    entity: name,
                    message: "field name must not be empty".to_string(),
                });
            }
            if meta.concrete_field(&field_name).is_some() || accessors.contains_key(&field_name) {
                return Err(VirtualFieldError::FieldAlreadyExists {
                    entity: name,
                    field: field_name,
                });
            }
            let field = ConcreteField::attach(&field_name, field_type);
            meta.fields.push(FieldRef::Concrete(Arc::new(field)));
        }

        let member = Member::of(&name, &meta);
        // types whose schema the declared virtual fields must fit
        let mut members = match &inherited {
            Some(list) if !separate_virtual_fields => list.entries()?.members.clone(),
            _ => Vec::new(),
        };
        members.push(member.clone());

        for (index, (field_name, field)) in virtual_fields.iter().enumerate() {
            check_bind(&name, &members, &accessors, field_name, field)?;
            let earlier = &virtual_fields[..index];
            if earlier.iter().any(|(other, _)| other == field_name) {
                return Err(VirtualFieldError::FieldAlreadyExists {
                    entity: name,
                    field: field_name.clone(),
                });
            }
            if earlier.iter().any(|(_, other)| Arc::ptr_eq(other, field)) {
                return Err(VirtualFieldError::BindingContext {
                    field: field_name.clone(),
                    message: "the same field is declared twice".to_string(),
                });
            }
        }

        let list = match inherited {
            Some(list) if separate_virtual_fields => Some(Arc::new(list.detached_copy(member)?)),
            Some(list) => {
                list.join(member)?;
                Some(list)
            }
            None => None,
        };
        if list.is_some() {
            meta.splice = Some(SpliceOps::new(config.dematerialize_policy));
        }

        let concrete_count = meta.concrete_fields().count();
        let entity = Arc::new(EntityType {
            name,
            config,
            meta: RwLock::new(meta),
            virtual_fields: ArcSwapOption::new(list),
        });

        for (field_name, field) in &virtual_fields {
            field.bind(&entity, field_name)?;
        }

        tracing::debug!(
            entity = %entity.name,
            fields = concrete_count,
            virtual_fields = virtual_fields.len(),
            parent = parent.as_ref().map(|p| p.name()),
            "built entity type"
        );
        Ok(entity)
    }
}
