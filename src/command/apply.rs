use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::info;

use crate::error::SimError;
use crate::models::{
    labels::Labels, ConfigMap, CronJob, CronJobSpec, DaemonSet, DaemonSetSpec, Deployment,
    DeploymentSpec, HorizontalPodAutoscaler, Job, JobSpec, Namespace, Node, PersistentVolume,
    PersistentVolumeClaim, Pod, PodDisruptionBudget, PodSpec, PodTemplate, PdbSpec, Probe,
    StatefulSet, StorageClass, Service, Taint, Toleration,
};
use crate::state::ClusterState;

/// Simplified declarative manifest. Flat on purpose: lessons hand learners
/// small YAML bodies, not full Kubernetes object trees.
#[derive(Debug, Deserialize)]
struct Manifest {
    kind: String,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    replicas: Option<u32>,
    #[serde(default)]
    labels: Option<Labels>,
    #[serde(default)]
    selector: Option<Labels>,
    #[serde(default)]
    data: Option<BTreeMap<String, String>>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    taints: Option<Vec<Taint>>,
    #[serde(default)]
    tolerations: Option<Vec<Toleration>>,
    #[serde(default)]
    readiness_after: Option<u64>,
    #[serde(default)]
    liveness: Option<bool>,
    #[serde(default)]
    completions: Option<u32>,
    #[serde(default)]
    parallelism: Option<u32>,
    #[serde(default)]
    backoff_limit: Option<u32>,
    #[serde(default)]
    run_ticks: Option<u64>,
    #[serde(default)]
    every_ticks: Option<u64>,
    #[serde(default)]
    max_unavailable: Option<u32>,
    #[serde(default)]
    min_available: Option<u32>,
    #[serde(default)]
    size_gi: Option<u32>,
    #[serde(default)]
    storage_class: Option<String>,
    #[serde(default)]
    provisioner: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    min: Option<u32>,
    #[serde(default)]
    max: Option<u32>,
}

impl Manifest {
    fn labels_or_app(&self) -> Labels {
        self.labels
            .clone()
            .unwrap_or_else(|| crate::models::labels(&[("app", &self.name)]))
    }

    fn pod_spec(&self) -> PodSpec {
        PodSpec {
            image: self.image.clone().unwrap_or_else(|| "nginx".to_string()),
            tolerations: self.tolerations.clone().unwrap_or_default(),
            readiness_probe: self.readiness_after.map(|t| Probe {
                ready_after_ticks: t,
            }),
            liveness_probe: if self.liveness.unwrap_or(false) {
                Some(Probe {
                    ready_after_ticks: 0,
                })
            } else {
                None
            },
            run_ticks: self.run_ticks,
            ..PodSpec::default()
        }
    }

    fn job_spec(&self) -> JobSpec {
        JobSpec {
            completions: self.completions.unwrap_or(1),
            parallelism: self.parallelism.unwrap_or(1),
            backoff_limit: self.backoff_limit.unwrap_or(3),
            template: PodTemplate {
                labels: self.labels_or_app(),
                spec: self.pod_spec(),
            },
        }
    }
}

/// Create-or-update from one or more `---`-separated YAML documents.
pub fn apply(state: &mut ClusterState, body: &str) -> Result<String, SimError> {
    if body.trim().is_empty() {
        return Err(SimError::InvalidCommand(
            "apply needs a YAML manifest body".to_string(),
        ));
    }

    let mut outputs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(body) {
        let manifest = Manifest::deserialize(document)?;
        outputs.push(apply_one(state, manifest)?);
    }
    if outputs.is_empty() {
        return Err(SimError::InvalidCommand(
            "apply body contained no documents".to_string(),
        ));
    }
    Ok(outputs.join("\n"))
}

fn apply_one(state: &mut ClusterState, m: Manifest) -> Result<String, SimError> {
    let kind = super::canonical_kind(&m.kind.to_lowercase())?;
    let name = m.name.clone();
    info!("applying {} {}", kind, name);

    let verdict = match kind {
        "Deployment" => {
            if let Some(d) = state.deployments.get_mut(&name) {
                if let Some(replicas) = m.replicas {
                    d.spec.replicas = replicas;
                }
                if let Some(image) = &m.image {
                    d.spec.template.spec.image = image.clone();
                }
                "configured"
            } else {
                let labels = m.labels_or_app();
                let spec = DeploymentSpec {
                    replicas: m.replicas.unwrap_or(1),
                    selector: m.selector.clone().unwrap_or_else(|| labels.clone()),
                    template: PodTemplate {
                        labels,
                        spec: m.pod_spec(),
                    },
                    strategy: Default::default(),
                };
                state.deployments.insert(name.clone(), Deployment::new(&name, spec));
                "created"
            }
        }
        "Pod" => {
            if let Some(pod) = state.pods.get_mut(&name) {
                if let Some(image) = &m.image {
                    pod.spec.image = image.clone();
                }
                "configured"
            } else {
                let pod = Pod::new(name.clone(), m.labels_or_app(), m.pod_spec(), state.tick);
                state.pods.insert(name.clone(), pod);
                "created"
            }
        }
        "Service" => {
            if let Some(svc) = state.services.get_mut(&name) {
                if let Some(selector) = m.selector.clone() {
                    svc.spec.selector = selector;
                }
                if let Some(port) = m.port {
                    svc.spec.port = Some(port);
                }
                "configured"
            } else {
                let selector = m.selector.clone().unwrap_or_else(|| m.labels_or_app());
                let mut svc = Service::new(&name, selector);
                svc.spec.port = m.port;
                state.services.insert(name.clone(), svc);
                "created"
            }
        }
        "Namespace" => {
            if state.namespaces.contains_key(&name) {
                "unchanged"
            } else {
                state.namespaces.insert(name.clone(), Namespace::new(&name));
                "created"
            }
        }
        "ConfigMap" => {
            let data = m.data.clone().unwrap_or_default();
            if let Some(cm) = state.configmaps.get_mut(&name) {
                cm.data = data;
                "configured"
            } else {
                state.configmaps.insert(name.clone(), ConfigMap::new(&name, data));
                "created"
            }
        }
        "Node" => {
            if let Some(node) = state.nodes.get_mut(&name) {
                if let Some(capacity) = m.capacity {
                    node.capacity = capacity;
                }
                if let Some(taints) = m.taints.clone() {
                    node.taints = taints;
                }
                "configured"
            } else {
                let mut node = Node::new(&name, m.capacity.unwrap_or(4));
                node.taints = m.taints.clone().unwrap_or_default();
                state.nodes.insert(name.clone(), node);
                "created"
            }
        }
        "Job" => {
            if state.jobs.contains_key(&name) {
                "unchanged"
            } else {
                state.jobs.insert(name.clone(), Job::new(&name, m.job_spec()));
                "created"
            }
        }
        "CronJob" => {
            if state.cronjobs.contains_key(&name) {
                "unchanged"
            } else {
                let every_ticks = m.every_ticks.ok_or_else(|| {
                    SimError::InvalidManifest("cronjob needs every_ticks".to_string())
                })?;
                let spec = CronJobSpec {
                    every_ticks,
                    job_template: m.job_spec(),
                };
                let tick = state.tick;
                state.cronjobs.insert(name.clone(), CronJob::new(&name, spec, tick));
                "created"
            }
        }
        "DaemonSet" => {
            if let Some(ds) = state.daemonsets.get_mut(&name) {
                if let Some(image) = &m.image {
                    ds.spec.template.spec.image = image.clone();
                }
                "configured"
            } else {
                let labels = m.labels_or_app();
                let spec = DaemonSetSpec {
                    selector: labels.clone(),
                    template: PodTemplate {
                        labels,
                        spec: m.pod_spec(),
                    },
                };
                state.daemonsets.insert(name.clone(), DaemonSet::new(&name, spec));
                "created"
            }
        }
        "StatefulSet" => {
            if let Some(sts) = state.statefulsets.get_mut(&name) {
                if let Some(replicas) = m.replicas {
                    sts.replicas = replicas;
                }
                "configured"
            } else {
                let labels = m.labels_or_app();
                let template = PodTemplate {
                    labels: labels.clone(),
                    spec: m.pod_spec(),
                };
                state.statefulsets.insert(
                    name.clone(),
                    StatefulSet::new(&name, m.replicas.unwrap_or(1), labels, template),
                );
                "created"
            }
        }
        "HorizontalPodAutoscaler" => {
            if state.hpas.contains_key(&name) {
                "unchanged"
            } else {
                let target = m.target.clone().ok_or_else(|| {
                    SimError::InvalidManifest("hpa needs a target".to_string())
                })?;
                state.hpas.insert(
                    name.clone(),
                    HorizontalPodAutoscaler::new(
                        &name,
                        &target,
                        m.min.unwrap_or(1),
                        m.max.unwrap_or(10),
                    ),
                );
                "created"
            }
        }
        "PersistentVolumeClaim" => {
            if state.persistent_volume_claims.contains_key(&name) {
                "unchanged"
            } else {
                state.persistent_volume_claims.insert(
                    name.clone(),
                    PersistentVolumeClaim::new(
                        &name,
                        m.size_gi.unwrap_or(1),
                        m.storage_class.clone(),
                    ),
                );
                "created"
            }
        }
        "PersistentVolume" => {
            if state.persistent_volumes.contains_key(&name) {
                "unchanged"
            } else {
                state.persistent_volumes.insert(
                    name.clone(),
                    PersistentVolume::new(&name, m.size_gi.unwrap_or(1), m.storage_class.clone()),
                );
                "created"
            }
        }
        "StorageClass" => {
            if state.storage_classes.contains_key(&name) {
                "unchanged"
            } else {
                let provisioner = m
                    .provisioner
                    .clone()
                    .unwrap_or_else(|| "sim.io/standard".to_string());
                state
                    .storage_classes
                    .insert(name.clone(), StorageClass::new(&name, &provisioner));
                "created"
            }
        }
        "PodDisruptionBudget" => {
            if state.pdbs.contains_key(&name) {
                "unchanged"
            } else {
                let selector = m.selector.clone().ok_or_else(|| {
                    SimError::InvalidManifest("pdb needs a selector".to_string())
                })?;
                let spec = PdbSpec {
                    selector,
                    max_unavailable: m.max_unavailable,
                    min_available: m.min_available,
                };
                state.pdbs.insert(name.clone(), PodDisruptionBudget::new(&name, spec));
                "created"
            }
        }
        other => {
            return Err(SimError::InvalidManifest(format!(
                "cannot apply resource kind \"{}\"",
                other
            )))
        }
    };

    Ok(format!("{}/{} {}", kind.to_lowercase(), name, verdict))
}
