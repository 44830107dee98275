use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::{OwnerRef, PodTemplate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaSetSpec {
    pub replicas: u32,
    pub selector: Labels,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSetStatus {
    pub replicas: u32,
    pub ready_replicas: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaSet {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    /// Owning Deployment, if any; standalone ReplicaSets have none.
    pub owner: Option<OwnerRef>,
    /// Hash of the pod template this ReplicaSet was stamped from, used by the
    /// Deployment controller to recognize its current-generation set.
    pub template_hash: String,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: ReplicaSetSpec,
    pub status: ReplicaSetStatus,
}

impl ReplicaSet {
    pub fn new(name: &str, spec: ReplicaSetSpec) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            owner: None,
            template_hash: String::new(),
            creation_timestamp: Utc::now(),
            spec,
            status: ReplicaSetStatus::default(),
        }
    }
}
