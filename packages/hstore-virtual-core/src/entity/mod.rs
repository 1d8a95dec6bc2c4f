//! Entity types, their metadata and records.

mod entity_type;
mod field_ref;
mod meta;
mod record;

pub use entity_type::{EntityType, EntityTypeBuilder};
pub use field_ref::{ConcreteField, FieldRef};
pub use meta::{Accessors, EntityMeta};
pub(crate) use meta::{Member, VirtualFieldList};
pub use record::Record;
