//! Configurable business thresholds.

use serde::{Deserialize, Serialize};

use crate::blueprint::BlueprintLibrary;

/// Text recorded when a large shipment arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remark {
    pub text: String,
    pub meaning: String,
}

impl Default for Remark {
    fn default() -> Self {
        Self {
            text: "Boltov tebe v korobky peredach".to_string(),
            meaning: "awe in the face of the amount of parts delivered".to_string(),
        }
    }
}

/// Rules the factory aggregate enforces.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryRules {
    /// Maximum number of shipments waiting in the cargo bay. A transfer is
    /// rejected once this many are pending.
    pub cargo_bay_capacity: usize,

    /// A shipment whose total quantity is strictly above this also records a remark.
    pub remark_threshold: i64,

    /// Names that may never be assigned (compared case-insensitively).
    pub blacklisted_names: Vec<String>,

    pub remark: Remark,

    pub blueprints: BlueprintLibrary,
}

impl Default for FactoryRules {
    fn default() -> Self {
        Self {
            cargo_bay_capacity: 2,
            remark_threshold: 10,
            blacklisted_names: vec!["bender".to_string()],
            remark: Remark::default(),
            blueprints: BlueprintLibrary::default(),
        }
    }
}

impl FactoryRules {
    pub fn is_blacklisted(&self, employee_name: &str) -> bool {
        let candidate = employee_name.to_lowercase();
        self.blacklisted_names
            .iter()
            .any(|name| name.to_lowercase() == candidate)
    }
}
