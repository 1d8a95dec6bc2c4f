//! Virtual field configuration.

use serde::{Deserialize, Serialize};

use crate::error::VirtualFieldError;

/// What dematerialize does with a virtual field missing from the field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DematerializePolicy {
    /// Fail with `NotMaterialized` and leave the list untouched
    Strict,
    /// Skip missing fields
    Lenient,
}

/// Per-entity-type virtual field configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualFieldConfig {
    /// Policy captured by the splice operations when they are installed
    pub dematerialize_policy: DematerializePolicy,
    /// Run the base field's `clean` before writing into the map
    pub validate_on_set: bool,
}

impl Default for VirtualFieldConfig {
    fn default() -> Self {
        Self {
            dematerialize_policy: DematerializePolicy::Lenient,
            validate_on_set: false, // values are written verbatim
        }
    }
}

impl VirtualFieldConfig {
    /// Strict dematerialize, verbatim writes.
    pub fn strict() -> Self {
        Self {
            dematerialize_policy: DematerializePolicy::Strict,
            ..Default::default()
        }
    }

    /// Parses a configuration from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, VirtualFieldError> {
        serde_json::from_str(json).map_err(|e| VirtualFieldError::InvalidOptions {
            message: e.to_string(),
        })
    }
}
