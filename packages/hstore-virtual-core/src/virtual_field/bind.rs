use std::sync::Arc;

use hstore_types::{FieldType, Type};

use super::{BoundTo, Descriptor, SpliceOps, VirtualField};
use crate::entity::{Accessors, EntityType, Member, VirtualFieldList};
use crate::error::VirtualFieldError;

impl VirtualField {
    /// Binds this field to `owner` under `name`.
    ///
    /// Runs the base attach hook virtual-only, appends the field to the
    /// owner's virtual field list (creating it on first use), installs the
    /// splice operations if the owner has none yet, and publishes the field
    /// as the accessor for `name`. When the list is shared with a parent or
    /// subtypes, the field and its accessor appear on all of them.
    ///
    /// Every check runs before anything is mutated, so a failed bind leaves
    /// the owner untouched.
    ///
    /// # Returns
    /// `Err(BindingContext)` if the field is already bound, the name is empty
    /// or the backing map is not an hstore field of every type sharing the
    /// list; `Err(FieldAlreadyExists)` if `name` is taken on any of them.
    pub fn bind(self: &Arc<Self>, owner: &EntityType, name: &str) -> Result<(), VirtualFieldError> {
        let mut meta = owner.meta_mut()?;
        let existing = owner.virtual_field_list();
        let list = match &existing {
            Some(list) => Arc::clone(list),
            None => Arc::new(VirtualFieldList::new(Member::of(owner.name(), &meta))),
        };

        let mut entries = list.entries_mut()?;
        check_bind(owner.name(), &entries.members, &list.accessors(), name, self)?;

        let binding = self.contribute_to_type(name, true);
        self.bound
            .set(BoundTo {
                owner: owner.name().to_string(),
                binding,
            })
            .map_err(|_| VirtualFieldError::BindingContext {
                field: name.to_string(),
                message: "field is already bound".to_string(),
            })?;

        entries.fields.push(Arc::clone(self));
        list.install_accessor(name, Arc::clone(self) as Arc<dyn Descriptor>);
        let shared_with = entries.members.len() - 1;
        drop(entries);

        if existing.is_none() {
            owner.attach_virtual_field_list(list);
        }
        if meta.splice.is_none() {
            meta.splice = Some(SpliceOps::new(owner.config().dematerialize_policy));
            tracing::debug!(entity = owner.name(), "installed virtual field splice operations");
        }

        tracing::debug!(
            entity = owner.name(),
            field = name,
            base = self.base.type_name(),
            hstore_field_name = %self.hstore_field_name,
            shared_with,
            "bound virtual field"
        );
        Ok(())
    }
}

/// Checks that `field` may bind under `name` to a list read by `members`.
pub(crate) fn check_bind(
    entity: &str,
    members: &[Member],
    accessors: &Accessors,
    name: &str,
    field: &VirtualField,
) -> Result<(), VirtualFieldError> {
    let context_error = |message: String| VirtualFieldError::BindingContext {
        field: name.to_string(),
        message,
    };

    if let Some(owner) = field.owner() {
        return Err(context_error(format!(
            "field is already bound to entity type '{owner}'"
        )));
    }
    if name.trim().is_empty() {
        return Err(context_error("field name must not be empty".to_string()));
    }
    if name == field.hstore_field_name {
        return Err(context_error(
            "a virtual field cannot be its own backing map".to_string(),
        ));
    }
    if accessors.contains_key(name) {
        return Err(VirtualFieldError::FieldAlreadyExists {
            entity: entity.to_string(),
            field: name.to_string(),
        });
    }
    for member in members {
        if member.concrete_type(name).is_some() {
            return Err(VirtualFieldError::FieldAlreadyExists {
                entity: member.entity.clone(),
                field: name.to_string(),
            });
        }
        match member.concrete_type(&field.hstore_field_name) {
            Some(Type::HStore) => {}
            Some(_) => {
                return Err(context_error(format!(
                    "backing field '{}' on '{}' is not an hstore field",
                    field.hstore_field_name, member.entity
                )))
            }
            None => {
                return Err(context_error(format!(
                    "backing field '{}' is not declared on '{}'",
                    field.hstore_field_name, member.entity
                )))
            }
        }
    }
    Ok(())
}
