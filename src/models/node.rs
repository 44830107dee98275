use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::{Toleration, TolerationOperator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaintEffect {
    NoSchedule,
    NoExecute,
    PreferNoSchedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taint {
    pub key: String,
    pub value: String,
    pub effect: TaintEffect,
}

impl Taint {
    pub fn new(key: &str, value: &str, effect: TaintEffect) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            effect,
        }
    }

    /// A taint is tolerated by an Exists toleration matching the key alone,
    /// or an Equal toleration matching key and value. Exists with an empty
    /// key tolerates everything. PreferNoSchedule never blocks scheduling.
    pub fn tolerated_by(&self, tolerations: &[Toleration]) -> bool {
        tolerations.iter().any(|t| match t.operator {
            TolerationOperator::Exists => t.key.is_empty() || t.key == self.key,
            TolerationOperator::Equal => {
                t.key == self.key && t.value.as_deref() == Some(self.value.as_str())
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
    /// Maximum number of pods this node can host.
    pub capacity: u32,
    pub taints: Vec<Taint>,
    /// Ready condition. Cordoning marks the node NotReady in this simplified
    /// model, which is what makes its pods fail over to other nodes.
    pub ready: bool,
    pub unschedulable: bool,
    /// Set by `drain`; the eviction controller empties the node gracefully.
    pub draining: bool,
    pub allocated_pods: u32,
}

impl Node {
    pub fn new(name: &str, capacity: u32) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
            capacity,
            taints: Vec::new(),
            ready: true,
            unschedulable: false,
            draining: false,
            allocated_pods: 0,
        }
    }

    pub fn with_taint(mut self, taint: Taint) -> Self {
        self.taints.push(taint);
        self
    }

    pub fn has_room(&self) -> bool {
        self.allocated_pods < self.capacity
    }

    /// Schedulable by the default scheduler.
    pub fn schedulable_for(&self, tolerations: &[Toleration]) -> bool {
        self.ready && !self.unschedulable && self.has_room() && self.tolerates(tolerations)
    }

    /// Every NoSchedule/NoExecute taint must be tolerated.
    pub fn tolerates(&self, tolerations: &[Toleration]) -> bool {
        self.taints
            .iter()
            .filter(|t| matches!(t.effect, TaintEffect::NoSchedule | TaintEffect::NoExecute))
            .all(|t| t.tolerated_by(tolerations))
    }
}
