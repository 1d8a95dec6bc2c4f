use std::sync::Arc;

use super::VirtualField;
use crate::config::DematerializePolicy;
use crate::entity::FieldRef;
use crate::error::VirtualFieldError;

/// Materialize/dematerialize operations installed once per entity type.
///
/// Installed when the first virtual field binds to a type; the dematerialize
/// policy is captured from the type's config at that moment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpliceOps {
    policy: DematerializePolicy,
}

impl SpliceOps {
    pub(crate) fn new(policy: DematerializePolicy) -> Self {
        Self { policy }
    }

    /// Appends each virtual field not already in `fields`.
    ///
    /// Returns the number of fields added.
    pub(crate) fn materialize(
        &self,
        fields: &mut Vec<FieldRef>,
        virtual_fields: &[Arc<VirtualField>],
    ) -> usize {
        let mut added = 0;
        for field in virtual_fields {
            if !fields.iter().any(|f| f.is_same_virtual(field)) {
                fields.push(FieldRef::Virtual(Arc::clone(field)));
                added += 1;
            }
        }
        added
    }

    /// Removes every virtual field from `fields`, leaving other fields in order.
    ///
    /// Under `Strict` a missing field fails before anything is removed.
    /// Returns the number of fields removed.
    pub(crate) fn dematerialize(
        &self,
        entity: &str,
        fields: &mut Vec<FieldRef>,
        virtual_fields: &[Arc<VirtualField>],
    ) -> Result<usize, VirtualFieldError> {
        if self.policy == DematerializePolicy::Strict {
            if let Some(missing) = virtual_fields
                .iter()
                .find(|vf| !fields.iter().any(|f| f.is_same_virtual(vf)))
            {
                return Err(VirtualFieldError::NotMaterialized {
                    entity: entity.to_string(),
                    field: missing.display_name(),
                });
            }
        }

        let mut removed = 0;
        for field in virtual_fields {
            match fields.iter().position(|f| f.is_same_virtual(field)) {
                Some(pos) => {
                    fields.remove(pos);
                    removed += 1;
                }
                None => tracing::warn!(
                    entity,
                    field = %field.display_name(),
                    "virtual field not in field list, skipping"
                ),
            }
        }
        Ok(removed)
    }
}
