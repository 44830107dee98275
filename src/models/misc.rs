use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::PodTemplate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMap {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub data: BTreeMap<String, String>,
    pub creation_timestamp: DateTime<Utc>,
}

impl ConfigMap {
    pub fn new(name: &str, data: BTreeMap<String, String>) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            data,
            creation_timestamp: Utc::now(),
        }
    }
}

/// State-model record only; no dedicated controller in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatefulSet {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub replicas: u32,
    pub selector: Labels,
    pub template: PodTemplate,
    pub creation_timestamp: DateTime<Utc>,
}

impl StatefulSet {
    pub fn new(name: &str, replicas: u32, selector: Labels, template: PodTemplate) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            replicas,
            selector,
            template,
            creation_timestamp: Utc::now(),
        }
    }
}

/// State-model record only; lessons read it, nothing reconciles it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalPodAutoscaler {
    pub uid: String,
    pub name: String,
    /// `deployment/<name>` style target reference.
    pub target_ref: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub creation_timestamp: DateTime<Utc>,
}

impl HorizontalPodAutoscaler {
    pub fn new(name: &str, target_ref: &str, min_replicas: u32, max_replicas: u32) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            target_ref: target_ref.to_string(),
            min_replicas,
            max_replicas,
            creation_timestamp: Utc::now(),
        }
    }
}
