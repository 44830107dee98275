use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;

/// Gates voluntary eviction (drain). Either bound may be set; both are
/// honored if both are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdbSpec {
    pub selector: Labels,
    #[serde(default)]
    pub max_unavailable: Option<u32>,
    #[serde(default)]
    pub min_available: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdbStatus {
    /// Evictions deferred so far, a diagnostic for `describe`.
    pub disruptions_blocked: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodDisruptionBudget {
    pub uid: String,
    pub name: String,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: PdbSpec,
    pub status: PdbStatus,
}

impl PodDisruptionBudget {
    pub fn new(name: &str, spec: PdbSpec) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            creation_timestamp: Utc::now(),
            spec,
            status: PdbStatus::default(),
        }
    }
}
