use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::PodTemplate;

/// RollingUpdate knobs, absolute pod counts. Defaults keep availability:
/// surge one pod at a time, never dip below desired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingUpdate {
    pub max_surge: u32,
    pub max_unavailable: u32,
}

impl Default for RollingUpdate {
    fn default() -> Self {
        Self {
            max_surge: 1,
            max_unavailable: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub replicas: u32,
    pub selector: Labels,
    pub template: PodTemplate,
    #[serde(default)]
    pub strategy: RollingUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub condition_type: String,
    pub status: bool,
    pub reason: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub replicas: u32,
    pub ready_replicas: u32,
    pub updated_replicas: u32,
    pub conditions: Vec<Condition>,
}

impl DeploymentStatus {
    pub fn condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|c| c.condition_type == condition_type)
    }

    pub fn is_available(&self) -> bool {
        self.condition("Available").map(|c| c.status).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: DeploymentSpec,
    pub status: DeploymentStatus,
}

impl Deployment {
    pub fn new(name: &str, spec: DeploymentSpec) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
            spec,
            status: DeploymentStatus::default(),
        }
    }

    /// Deterministic hash of the pod template; names the per-generation
    /// ReplicaSet (`<deployment>-<hash>`).
    pub fn template_hash(&self) -> String {
        let mut hasher = DefaultHasher::new();
        serde_json::to_string(&self.spec.template)
            .unwrap_or_default()
            .hash(&mut hasher);
        format!("{:x}", hasher.finish() % 0xfffffff)
    }
}
