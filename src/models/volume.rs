use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageClass {
    pub uid: String,
    pub name: String,
    pub provisioner: String,
    pub creation_timestamp: DateTime<Utc>,
}

impl StorageClass {
    pub fn new(name: &str, provisioner: &str) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            provisioner: provisioner.to_string(),
            creation_timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PvPhase {
    Available,
    Bound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentVolume {
    pub uid: String,
    pub name: String,
    pub capacity_gi: u32,
    pub storage_class: Option<String>,
    pub phase: PvPhase,
    /// Name of the claim bound to this volume.
    pub claim_ref: Option<String>,
    pub creation_timestamp: DateTime<Utc>,
}

impl PersistentVolume {
    pub fn new(name: &str, capacity_gi: u32, storage_class: Option<String>) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            capacity_gi,
            storage_class,
            phase: PvPhase::Available,
            claim_ref: None,
            creation_timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PvcPhase {
    Pending,
    Bound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentVolumeClaim {
    pub uid: String,
    pub name: String,
    pub request_gi: u32,
    pub storage_class: Option<String>,
    pub phase: PvcPhase,
    /// Name of the bound volume.
    pub volume_name: Option<String>,
    pub creation_timestamp: DateTime<Utc>,
}

impl PersistentVolumeClaim {
    pub fn new(name: &str, request_gi: u32, storage_class: Option<String>) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            request_gi,
            storage_class,
            phase: PvcPhase::Pending,
            volume_name: None,
            creation_timestamp: Utc::now(),
        }
    }
}
