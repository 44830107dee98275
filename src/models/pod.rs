use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    CrashLoopBackOff,
    #[serde(rename = "OOMKilled")]
    OomKilled,
}

/// Deterministic failure injected at pod creation time, keyed by image via
/// the lesson's failure rules. Never auto-resolves without a corrective
/// command (typically `set-image` to a healthy image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureMode {
    ImagePullError,
    CrashLoopBackOff,
    #[serde(rename = "OOMKilled")]
    OomKilled,
}

impl FailureMode {
    pub fn phase(&self) -> PodPhase {
        match self {
            // Image pull failures keep the pod Pending, like the real thing.
            FailureMode::ImagePullError => PodPhase::Pending,
            FailureMode::CrashLoopBackOff => PodPhase::CrashLoopBackOff,
            FailureMode::OomKilled => PodPhase::OomKilled,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            FailureMode::ImagePullError => "ImagePullError",
            FailureMode::CrashLoopBackOff => "CrashLoopBackOff",
            FailureMode::OomKilled => "OOMKilled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TolerationOperator {
    Equal,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toleration {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    pub operator: TolerationOperator,
}

impl Toleration {
    pub fn equal(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: Some(value.to_string()),
            operator: TolerationOperator::Equal,
        }
    }

    pub fn exists(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            operator: TolerationOperator::Exists,
        }
    }
}

/// Probes are modeled in ticks: a readiness probe succeeds once the pod has
/// been scheduled for `ready_after_ticks` ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub ready_after_ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    ReplicaSet,
    Deployment,
    DaemonSet,
    Job,
    CronJob,
    StatefulSet,
}

/// Controller ownership. Nodes are never owners; controllers reference nodes
/// by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: OwnerKind,
    pub name: String,
    pub uid: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    pub image: String,
    pub node_name: Option<String>,
    #[serde(default)]
    pub tolerations: Vec<Toleration>,
    #[serde(default)]
    pub readiness_probe: Option<Probe>,
    #[serde(default)]
    pub liveness_probe: Option<Probe>,
    #[serde(default)]
    pub startup_probe: Option<Probe>,
    /// PVC names this pod mounts.
    #[serde(default)]
    pub volume_claims: Vec<String>,
    #[serde(default)]
    pub failure_mode: Option<FailureMode>,
    /// For Job pods: ticks of Running before the pod Succeeds.
    #[serde(default)]
    pub run_ticks: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodStatus {
    pub phase: PodPhase,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub ready: bool,
    pub restart_count: u32,
    pub tick_created: u64,
    pub tick_scheduled: Option<u64>,
    /// Tick at which deletion was requested. Set means terminating: the pod
    /// is excluded from endpoints, readiness and replica counts, and is
    /// finalized (removed) on the following tick.
    pub deletion_timestamp: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub owner: Option<OwnerRef>,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: PodSpec,
    pub status: PodStatus,
}

impl Pod {
    pub fn new(name: String, labels: Labels, spec: PodSpec, tick: u64) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name,
            labels,
            owner: None,
            creation_timestamp: Utc::now(),
            spec,
            status: PodStatus {
                phase: PodPhase::Pending,
                reason: None,
                message: None,
                ready: false,
                restart_count: 0,
                tick_created: tick,
                tick_scheduled: None,
                deletion_timestamp: None,
            },
        }
    }

    pub fn is_terminating(&self) -> bool {
        self.status.deletion_timestamp.is_some()
    }

    /// Live means this pod still counts toward its owner's replica count:
    /// not terminating and not finished. CrashLoopBackOff and OOMKilled pods
    /// are live so controllers do not replace a pod the learner must fix.
    pub fn is_live(&self) -> bool {
        !self.is_terminating()
            && !matches!(self.status.phase, PodPhase::Succeeded | PodPhase::Failed)
    }

    /// Eligible to back a Service endpoint.
    pub fn is_ready_endpoint(&self) -> bool {
        self.status.phase == PodPhase::Running && !self.is_terminating() && self.status.ready
    }

    pub fn owned_by(&self, kind: OwnerKind, name: &str) -> bool {
        self.owner
            .as_ref()
            .map(|o| o.kind == kind && o.name == name)
            .unwrap_or(false)
    }
}

/// Pod template stamped out by ReplicaSets, DaemonSets and Jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(default)]
    pub labels: Labels,
    pub spec: PodSpec,
}
