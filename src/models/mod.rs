pub mod daemonset;
pub mod deployment;
pub mod event;
pub mod job;
pub mod labels;
pub mod misc;
pub mod node;
pub mod pdb;
pub mod pod;
pub mod replicaset;
pub mod service;
pub mod volume;

pub use daemonset::{DaemonSet, DaemonSetSpec};
pub use deployment::{Condition, Deployment, DeploymentSpec, DeploymentStatus, RollingUpdate};
pub use event::{Event, EventType};
pub use job::{CronJob, CronJobSpec, Job, JobPhase, JobSpec};
pub use labels::{labels, selector_matches, Labels};
pub use misc::{ConfigMap, HorizontalPodAutoscaler, Namespace, StatefulSet};
pub use node::{Node, Taint, TaintEffect};
pub use pdb::{PdbSpec, PodDisruptionBudget};
pub use pod::{
    FailureMode, OwnerKind, OwnerRef, Pod, PodPhase, PodSpec, PodTemplate, Probe, Toleration,
    TolerationOperator,
};
pub use replicaset::{ReplicaSet, ReplicaSetSpec, ReplicaSetStatus};
pub use service::{Service, ServiceSpec, ServiceStatus};
pub use volume::{PersistentVolume, PersistentVolumeClaim, PvPhase, PvcPhase, StorageClass};
