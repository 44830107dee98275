use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::PodTemplate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSetSpec {
    pub selector: Labels,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSetStatus {
    /// Number of eligible nodes this tick.
    pub desired: u32,
    pub current: u32,
    pub ready: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSet {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: DaemonSetSpec,
    pub status: DaemonSetStatus,
}

impl DaemonSet {
    pub fn new(name: &str, spec: DaemonSetSpec) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
            spec,
            status: DaemonSetStatus::default(),
        }
    }
}
