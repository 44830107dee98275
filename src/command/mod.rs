mod apply;
mod query;

use std::collections::BTreeMap;

use tracing::info;

use crate::error::SimError;
use crate::models::{
    labels::Labels, ConfigMap, CronJob, CronJobSpec, DaemonSet, DaemonSetSpec, Deployment,
    DeploymentSpec, EventType, HorizontalPodAutoscaler, Job, JobSpec, Namespace, Node,
    PersistentVolumeClaim, Pod, PodDisruptionBudget, PodPhase, PodSpec, PodTemplate, PdbSpec,
    Service, StatefulSet,
};
use crate::state::ClusterState;

/// Executes one kubectl-shaped command line against the cluster. For
/// `apply`, everything after the first line is the YAML manifest body.
/// Successful commands record their verb into `commands_used`; failures
/// leave state untouched apart from a diagnostic event.
pub fn execute(state: &mut ClusterState, input: &str) -> Result<String, SimError> {
    let (line, body) = match input.find('\n') {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let verb = match tokens.first() {
        Some(v) => *v,
        None => return Err(SimError::InvalidCommand("empty command".to_string())),
    };

    let result = match verb {
        "create" => create(state, &tokens[1..]),
        "delete" => delete(state, &tokens[1..]),
        "scale" => scale(state, &tokens[1..]),
        "set-image" => set_image(state, &tokens[1..]),
        "patch" => patch(state, &tokens[1..]),
        "label" => label(state, &tokens[1..]),
        "cordon" => cordon(state, &tokens[1..]),
        "uncordon" => uncordon(state, &tokens[1..]),
        "drain" => drain(state, &tokens[1..]),
        "apply" => apply::apply(state, body),
        "get" => query::get(state, &tokens[1..]),
        "describe" => query::describe(state, &tokens[1..]),
        "logs" => query::logs(state, &tokens[1..]),
        "get-events" => query::get_events(state, &tokens[1..]),
        other => Err(SimError::UnknownVerb(other.to_string())),
    };

    match result {
        Ok(output) => {
            state.commands_used.insert(verb.to_string());
            Ok(output)
        }
        Err(err) => {
            if let SimError::NotFound { kind, name } = &err {
                state.record_event(
                    EventType::Warning,
                    "NotFound",
                    kind,
                    name,
                    format!("command failed: {} \"{}\" not found", kind, name),
                );
            }
            Err(err)
        }
    }
}

/// `--key=value` flags. Bare `--key` flags are stored with an empty value.
struct Flags(BTreeMap<String, String>);

impl Flags {
    fn parse(args: &[&str]) -> Result<(Vec<String>, Flags), SimError> {
        let mut positional = Vec::new();
        let mut flags = BTreeMap::new();
        for arg in args {
            if let Some(rest) = arg.strip_prefix("--") {
                match rest.split_once('=') {
                    Some((k, v)) => flags.insert(k.to_string(), v.to_string()),
                    None => flags.insert(rest.to_string(), String::new()),
                };
            } else {
                positional.push(arg.to_string());
            }
        }
        Ok((positional, Flags(flags)))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    fn get_u32(&self, key: &str) -> Result<Option<u32>, SimError> {
        match self.0.get(key) {
            Some(v) => v
                .parse::<u32>()
                .map(Some)
                .map_err(|_| SimError::InvalidCommand(format!("--{} expects a number", key))),
            None => Ok(None),
        }
    }

    fn get_u64(&self, key: &str) -> Result<Option<u64>, SimError> {
        match self.0.get(key) {
            Some(v) => v
                .parse::<u64>()
                .map(Some)
                .map_err(|_| SimError::InvalidCommand(format!("--{} expects a number", key))),
            None => Ok(None),
        }
    }
}

/// `k=v,k2=v2` label/selector arguments.
fn parse_pairs(spec: &str) -> Result<Labels, SimError> {
    let mut out = Labels::new();
    for part in spec.split(',').filter(|p| !p.is_empty()) {
        let (k, v) = part
            .split_once('=')
            .ok_or_else(|| SimError::InvalidCommand(format!("expected key=value, got \"{}\"", part)))?;
        out.insert(k.to_string(), v.to_string());
    }
    Ok(out)
}

/// Canonical resource kind from the aliases kubectl users type.
pub(crate) fn canonical_kind(kind: &str) -> Result<&'static str, SimError> {
    let k = match kind {
        "pod" | "pods" | "po" => "Pod",
        "node" | "nodes" | "no" => "Node",
        "deployment" | "deployments" | "deploy" => "Deployment",
        "replicaset" | "replicasets" | "rs" => "ReplicaSet",
        "service" | "services" | "svc" => "Service",
        "daemonset" | "daemonsets" | "ds" => "DaemonSet",
        "job" | "jobs" => "Job",
        "cronjob" | "cronjobs" | "cj" => "CronJob",
        "statefulset" | "statefulsets" | "sts" => "StatefulSet",
        "hpa" | "horizontalpodautoscaler" => "HorizontalPodAutoscaler",
        "namespace" | "namespaces" | "ns" => "Namespace",
        "configmap" | "configmaps" | "cm" => "ConfigMap",
        "pvc" | "persistentvolumeclaim" | "persistentvolumeclaims" => "PersistentVolumeClaim",
        "pv" | "persistentvolume" | "persistentvolumes" => "PersistentVolume",
        "storageclass" | "storageclasses" | "sc" => "StorageClass",
        "pdb" | "poddisruptionbudget" | "poddisruptionbudgets" => "PodDisruptionBudget",
        "event" | "events" => "Event",
        other => return Err(SimError::InvalidCommand(format!("unknown resource kind \"{}\"", other))),
    };
    Ok(k)
}

/// Accepts `deployment/web` and `deployment web` argument shapes.
fn kind_and_name(args: &[String]) -> Result<(String, String), SimError> {
    match args {
        [arg] => match arg.split_once('/') {
            Some((kind, name)) => Ok((canonical_kind(kind)?.to_string(), name.to_string())),
            None => Err(SimError::InvalidCommand(format!(
                "expected kind/name, got \"{}\"",
                arg
            ))),
        },
        [kind, name, ..] => Ok((canonical_kind(kind)?.to_string(), name.to_string())),
        _ => Err(SimError::InvalidCommand("expected a resource and a name".to_string())),
    }
}

fn default_labels(flags: &Flags, name: &str) -> Result<Labels, SimError> {
    match flags.get("labels") {
        Some(spec) => parse_pairs(spec),
        None => Ok(crate::models::labels(&[("app", name)])),
    }
}

fn create(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, flags) = Flags::parse(args)?;
    let (kind, name) = kind_and_name(&positional)?;
    ensure_absent(state, &kind, &name)?;

    let image = flags.get("image").unwrap_or("nginx").to_string();
    match kind.as_str() {
        "Deployment" => {
            let labels = default_labels(&flags, &name)?;
            let replicas = flags.get_u32("replicas")?.unwrap_or(1);
            let spec = DeploymentSpec {
                replicas,
                selector: labels.clone(),
                template: PodTemplate {
                    labels,
                    spec: PodSpec {
                        image,
                        ..PodSpec::default()
                    },
                },
                strategy: Default::default(),
            };
            state.deployments.insert(name.clone(), Deployment::new(&name, spec));
            info!("created deployment {}", name);
            Ok(format!("deployment.apps/{} created", name))
        }
        "Pod" => {
            let labels = default_labels(&flags, &name)?;
            let spec = PodSpec {
                image,
                ..PodSpec::default()
            };
            let pod = Pod::new(name.clone(), labels, spec, state.tick);
            state.pods.insert(name.clone(), pod);
            Ok(format!("pod/{} created", name))
        }
        "Service" => {
            let selector = match flags.get("selector") {
                Some(spec) => parse_pairs(spec)?,
                None => crate::models::labels(&[("app", &name)]),
            };
            let mut svc = Service::new(&name, selector);
            if let Some(port) = flags.get_u32("port")? {
                svc.spec.port = Some(port as u16);
            }
            state.services.insert(name.clone(), svc);
            Ok(format!("service/{} created", name))
        }
        "Namespace" => {
            state.namespaces.insert(name.clone(), Namespace::new(&name));
            Ok(format!("namespace/{} created", name))
        }
        "ConfigMap" => {
            let mut data = BTreeMap::new();
            if let Some(spec) = flags.get("from-literal") {
                data = parse_pairs(spec)?;
            }
            state.configmaps.insert(name.clone(), ConfigMap::new(&name, data));
            Ok(format!("configmap/{} created", name))
        }
        "Node" => {
            let capacity = flags.get_u32("capacity")?.unwrap_or(4);
            state.nodes.insert(name.clone(), Node::new(&name, capacity));
            Ok(format!("node/{} created", name))
        }
        "Job" => {
            let labels = default_labels(&flags, &name)?;
            let spec = JobSpec {
                completions: flags.get_u32("completions")?.unwrap_or(1),
                parallelism: flags.get_u32("parallelism")?.unwrap_or(1),
                backoff_limit: flags.get_u32("backoff-limit")?.unwrap_or(3),
                template: PodTemplate {
                    labels,
                    spec: PodSpec {
                        image,
                        run_ticks: flags.get_u64("run-ticks")?,
                        ..PodSpec::default()
                    },
                },
            };
            state.jobs.insert(name.clone(), Job::new(&name, spec));
            Ok(format!("job.batch/{} created", name))
        }
        "CronJob" => {
            let labels = default_labels(&flags, &name)?;
            let every_ticks = flags
                .get_u64("every-ticks")?
                .ok_or_else(|| SimError::InvalidCommand("cronjob needs --every-ticks".to_string()))?;
            let spec = CronJobSpec {
                every_ticks,
                job_template: JobSpec {
                    completions: flags.get_u32("completions")?.unwrap_or(1),
                    parallelism: flags.get_u32("parallelism")?.unwrap_or(1),
                    backoff_limit: flags.get_u32("backoff-limit")?.unwrap_or(3),
                    template: PodTemplate {
                        labels,
                        spec: PodSpec {
                            image,
                            run_ticks: flags.get_u64("run-ticks")?,
                            ..PodSpec::default()
                        },
                    },
                },
            };
            let tick = state.tick;
            state.cronjobs.insert(name.clone(), CronJob::new(&name, spec, tick));
            Ok(format!("cronjob.batch/{} created", name))
        }
        "DaemonSet" => {
            let labels = default_labels(&flags, &name)?;
            let spec = DaemonSetSpec {
                selector: labels.clone(),
                template: PodTemplate {
                    labels,
                    spec: PodSpec {
                        image,
                        ..PodSpec::default()
                    },
                },
            };
            state.daemonsets.insert(name.clone(), DaemonSet::new(&name, spec));
            Ok(format!("daemonset.apps/{} created", name))
        }
        "StatefulSet" => {
            let labels = default_labels(&flags, &name)?;
            let replicas = flags.get_u32("replicas")?.unwrap_or(1);
            let template = PodTemplate {
                labels: labels.clone(),
                spec: PodSpec {
                    image,
                    ..PodSpec::default()
                },
            };
            state
                .statefulsets
                .insert(name.clone(), StatefulSet::new(&name, replicas, labels, template));
            Ok(format!("statefulset.apps/{} created", name))
        }
        "HorizontalPodAutoscaler" => {
            let target = flags
                .get("target")
                .ok_or_else(|| SimError::InvalidCommand("hpa needs --target".to_string()))?;
            let hpa = HorizontalPodAutoscaler::new(
                &name,
                target,
                flags.get_u32("min")?.unwrap_or(1),
                flags.get_u32("max")?.unwrap_or(10),
            );
            state.hpas.insert(name.clone(), hpa);
            Ok(format!("horizontalpodautoscaler.autoscaling/{} created", name))
        }
        "PersistentVolumeClaim" => {
            let size = flags.get_u32("size")?.unwrap_or(1);
            let class = flags.get("storage-class").map(|s| s.to_string());
            state
                .persistent_volume_claims
                .insert(name.clone(), PersistentVolumeClaim::new(&name, size, class));
            Ok(format!("persistentvolumeclaim/{} created", name))
        }
        "PodDisruptionBudget" => {
            let selector = parse_pairs(
                flags
                    .get("selector")
                    .ok_or_else(|| SimError::InvalidCommand("pdb needs --selector".to_string()))?,
            )?;
            let spec = PdbSpec {
                selector,
                max_unavailable: flags.get_u32("max-unavailable")?,
                min_available: flags.get_u32("min-available")?,
            };
            state
                .pdbs
                .insert(name.clone(), PodDisruptionBudget::new(&name, spec));
            Ok(format!("poddisruptionbudget.policy/{} created", name))
        }
        other => Err(SimError::InvalidCommand(format!(
            "cannot create resource kind \"{}\"",
            other
        ))),
    }
}

fn ensure_absent(state: &ClusterState, kind: &str, name: &str) -> Result<(), SimError> {
    let exists = match kind {
        "Deployment" => state.deployments.contains_key(name),
        "Pod" => state.pods.contains_key(name),
        "Service" => state.services.contains_key(name),
        "Namespace" => state.namespaces.contains_key(name),
        "ConfigMap" => state.configmaps.contains_key(name),
        "Node" => state.nodes.contains_key(name),
        "Job" => state.jobs.contains_key(name),
        "CronJob" => state.cronjobs.contains_key(name),
        "DaemonSet" => state.daemonsets.contains_key(name),
        "StatefulSet" => state.statefulsets.contains_key(name),
        "HorizontalPodAutoscaler" => state.hpas.contains_key(name),
        "PersistentVolumeClaim" => state.persistent_volume_claims.contains_key(name),
        "PodDisruptionBudget" => state.pdbs.contains_key(name),
        _ => false,
    };
    if exists {
        Err(SimError::already_exists(kind, name))
    } else {
        Ok(())
    }
}

fn delete(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, _) = Flags::parse(args)?;
    let (kind, name) = kind_and_name(&positional)?;
    match kind.as_str() {
        "Pod" => {
            if !state.pods.contains_key(&name) {
                return Err(SimError::not_found("Pod", &name));
            }
            state.mark_pod_terminating(&name);
            Ok(format!("pod/{} deleted", name))
        }
        "Deployment" => {
            state
                .deployments
                .remove(&name)
                .ok_or_else(|| SimError::not_found("Deployment", &name))?;
            let owned: Vec<String> = state
                .replicasets
                .values()
                .filter(|rs| {
                    rs.owner
                        .as_ref()
                        .map(|o| o.kind == crate::models::OwnerKind::Deployment && o.name == name)
                        .unwrap_or(false)
                })
                .map(|rs| rs.name.clone())
                .collect();
            for rs_name in owned {
                delete_replicaset(state, &rs_name);
            }
            Ok(format!("deployment.apps/{} deleted", name))
        }
        "ReplicaSet" => {
            if !state.replicasets.contains_key(&name) {
                return Err(SimError::not_found("ReplicaSet", &name));
            }
            delete_replicaset(state, &name);
            Ok(format!("replicaset.apps/{} deleted", name))
        }
        "Service" => {
            state
                .services
                .remove(&name)
                .ok_or_else(|| SimError::not_found("Service", &name))?;
            Ok(format!("service/{} deleted", name))
        }
        "DaemonSet" => {
            state
                .daemonsets
                .remove(&name)
                .ok_or_else(|| SimError::not_found("DaemonSet", &name))?;
            mark_owned_terminating(state, crate::models::OwnerKind::DaemonSet, &name);
            Ok(format!("daemonset.apps/{} deleted", name))
        }
        "Job" => {
            state
                .jobs
                .remove(&name)
                .ok_or_else(|| SimError::not_found("Job", &name))?;
            mark_owned_terminating(state, crate::models::OwnerKind::Job, &name);
            Ok(format!("job.batch/{} deleted", name))
        }
        "CronJob" => {
            state
                .cronjobs
                .remove(&name)
                .ok_or_else(|| SimError::not_found("CronJob", &name))?;
            Ok(format!("cronjob.batch/{} deleted", name))
        }
        "Node" => {
            state
                .nodes
                .remove(&name)
                .ok_or_else(|| SimError::not_found("Node", &name))?;
            let stranded: Vec<String> = state
                .pods
                .values()
                .filter(|p| p.spec.node_name.as_deref() == Some(name.as_str()) && p.is_live())
                .map(|p| p.name.clone())
                .collect();
            let tick = state.tick;
            for pod_name in stranded {
                if let Some(pod) = state.pods.get_mut(&pod_name) {
                    pod.status.phase = PodPhase::Failed;
                    pod.status.ready = false;
                    pod.status.reason = Some("NodeDeleted".to_string());
                    pod.status.deletion_timestamp = Some(tick);
                }
            }
            Ok(format!("node/{} deleted", name))
        }
        "Namespace" => {
            state
                .namespaces
                .remove(&name)
                .ok_or_else(|| SimError::not_found("Namespace", &name))?;
            Ok(format!("namespace/{} deleted", name))
        }
        "ConfigMap" => {
            state
                .configmaps
                .remove(&name)
                .ok_or_else(|| SimError::not_found("ConfigMap", &name))?;
            Ok(format!("configmap/{} deleted", name))
        }
        "StatefulSet" => {
            state
                .statefulsets
                .remove(&name)
                .ok_or_else(|| SimError::not_found("StatefulSet", &name))?;
            Ok(format!("statefulset.apps/{} deleted", name))
        }
        "HorizontalPodAutoscaler" => {
            state
                .hpas
                .remove(&name)
                .ok_or_else(|| SimError::not_found("HorizontalPodAutoscaler", &name))?;
            Ok(format!("horizontalpodautoscaler.autoscaling/{} deleted", name))
        }
        "PersistentVolumeClaim" => {
            state
                .persistent_volume_claims
                .remove(&name)
                .ok_or_else(|| SimError::not_found("PersistentVolumeClaim", &name))?;
            Ok(format!("persistentvolumeclaim/{} deleted", name))
        }
        "PodDisruptionBudget" => {
            state
                .pdbs
                .remove(&name)
                .ok_or_else(|| SimError::not_found("PodDisruptionBudget", &name))?;
            Ok(format!("poddisruptionbudget.policy/{} deleted", name))
        }
        other => Err(SimError::InvalidCommand(format!(
            "cannot delete resource kind \"{}\"",
            other
        ))),
    }
}

fn delete_replicaset(state: &mut ClusterState, rs_name: &str) {
    state.replicasets.remove(rs_name);
    mark_owned_terminating(state, crate::models::OwnerKind::ReplicaSet, rs_name);
}

fn mark_owned_terminating(state: &mut ClusterState, kind: crate::models::OwnerKind, owner: &str) {
    let owned: Vec<String> = state
        .pods
        .values()
        .filter(|p| p.owned_by(kind, owner) && !p.is_terminating())
        .map(|p| p.name.clone())
        .collect();
    for pod_name in owned {
        state.mark_pod_terminating(&pod_name);
    }
}

fn scale(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, flags) = Flags::parse(args)?;
    let (kind, name) = kind_and_name(&positional)?;
    let replicas = flags
        .get_u32("replicas")?
        .ok_or_else(|| SimError::InvalidCommand("scale needs --replicas".to_string()))?;
    match kind.as_str() {
        "Deployment" => {
            let d = state
                .deployments
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("Deployment", &name))?;
            d.spec.replicas = replicas;
            info!("scaled deployment {} to {}", name, replicas);
            Ok(format!("deployment.apps/{} scaled", name))
        }
        "ReplicaSet" => {
            let rs = state
                .replicasets
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("ReplicaSet", &name))?;
            rs.spec.replicas = replicas;
            Ok(format!("replicaset.apps/{} scaled", name))
        }
        "StatefulSet" => {
            let sts = state
                .statefulsets
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("StatefulSet", &name))?;
            sts.replicas = replicas;
            Ok(format!("statefulset.apps/{} scaled", name))
        }
        other => Err(SimError::InvalidCommand(format!(
            "cannot scale resource kind \"{}\"",
            other
        ))),
    }
}

fn set_image(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, _) = Flags::parse(args)?;
    if positional.len() < 2 {
        return Err(SimError::InvalidCommand(
            "set-image needs a target and container=image".to_string(),
        ));
    }
    let (kind, name) = kind_and_name(&positional[..1])?;
    // `container=image`; the container name is accepted and ignored since
    // pods model a single container.
    let image = positional[1]
        .split_once('=')
        .map(|(_, img)| img)
        .unwrap_or(positional[1].as_str())
        .to_string();

    match kind.as_str() {
        "Deployment" => {
            let d = state
                .deployments
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("Deployment", &name))?;
            d.spec.template.spec.image = image.clone();
            info!("deployment {} image set to {}", name, image);
            Ok(format!("deployment.apps/{} image updated", name))
        }
        "DaemonSet" => {
            let ds = state
                .daemonsets
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("DaemonSet", &name))?;
            ds.spec.template.spec.image = image;
            Ok(format!("daemonset.apps/{} image updated", name))
        }
        other => Err(SimError::InvalidCommand(format!(
            "cannot set image on resource kind \"{}\"",
            other
        ))),
    }
}

fn patch(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, flags) = Flags::parse(args)?;
    let (kind, name) = kind_and_name(&positional)?;
    match kind.as_str() {
        "Service" => {
            let selector = parse_pairs(
                flags
                    .get("selector")
                    .ok_or_else(|| SimError::InvalidCommand("patch service needs --selector".to_string()))?,
            )?;
            let svc = state
                .services
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("Service", &name))?;
            svc.spec.selector = selector;
            Ok(format!("service/{} patched", name))
        }
        "Deployment" => {
            let d = state
                .deployments
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("Deployment", &name))?;
            let mut patched = false;
            if let Some(replicas) = flags.get_u32("replicas")? {
                d.spec.replicas = replicas;
                patched = true;
            }
            if let Some(image) = flags.get("image") {
                d.spec.template.spec.image = image.to_string();
                patched = true;
            }
            if !patched {
                return Err(SimError::InvalidCommand(
                    "patch deployment needs --replicas or --image".to_string(),
                ));
            }
            Ok(format!("deployment.apps/{} patched", name))
        }
        "Pod" => {
            let image = flags
                .get("image")
                .ok_or_else(|| SimError::InvalidCommand("patch pod needs --image".to_string()))?
                .to_string();
            let tick = state.tick;
            let pod = state
                .pods
                .get_mut(&name)
                .ok_or_else(|| SimError::not_found("Pod", &name))?;
            // A corrected image clears any injected failure; the pod resumes
            // running in place, or goes back through the scheduler.
            pod.spec.image = image;
            pod.spec.failure_mode = None;
            pod.status.reason = None;
            pod.status.message = None;
            pod.status.restart_count = 0;
            if pod.spec.node_name.is_some() {
                pod.status.phase = PodPhase::Running;
                pod.status.ready = pod.spec.readiness_probe.is_none();
                pod.status.tick_scheduled = Some(tick);
            } else {
                pod.status.phase = PodPhase::Pending;
            }
            Ok(format!("pod/{} patched", name))
        }
        other => Err(SimError::InvalidCommand(format!(
            "cannot patch resource kind \"{}\"",
            other
        ))),
    }
}

fn label(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let (positional, _) = Flags::parse(args)?;
    if positional.len() < 3 {
        return Err(SimError::InvalidCommand(
            "label needs a resource, a name and key=value (or key-)".to_string(),
        ));
    }
    let (kind, name) = kind_and_name(&positional[..2])?;
    let changes = &positional[2..];

    let labels = match kind.as_str() {
        "Pod" => state
            .pods
            .get_mut(&name)
            .map(|p| &mut p.labels)
            .ok_or_else(|| SimError::not_found("Pod", &name))?,
        "Node" => state
            .nodes
            .get_mut(&name)
            .map(|n| &mut n.labels)
            .ok_or_else(|| SimError::not_found("Node", &name))?,
        "Service" => state
            .services
            .get_mut(&name)
            .map(|s| &mut s.labels)
            .ok_or_else(|| SimError::not_found("Service", &name))?,
        "Deployment" => state
            .deployments
            .get_mut(&name)
            .map(|d| &mut d.labels)
            .ok_or_else(|| SimError::not_found("Deployment", &name))?,
        other => {
            return Err(SimError::InvalidCommand(format!(
                "cannot label resource kind \"{}\"",
                other
            )))
        }
    };

    for change in changes {
        if let Some(key) = change.strip_suffix('-') {
            labels.remove(key);
        } else {
            let (k, v) = change.split_once('=').ok_or_else(|| {
                SimError::InvalidCommand(format!("expected key=value or key-, got \"{}\"", change))
            })?;
            labels.insert(k.to_string(), v.to_string());
        }
    }
    Ok(format!("{}/{} labeled", kind.to_lowercase(), name))
}

fn cordon(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let name = single_node_arg(args)?;
    {
        let node = state
            .nodes
            .get_mut(&name)
            .ok_or_else(|| SimError::not_found("Node", &name))?;
        // Cordoning takes the node out of service entirely in this model:
        // unschedulable and NotReady, so its pods fail over on the next tick.
        node.unschedulable = true;
        node.ready = false;
    }
    info!("cordoned node {}", name);
    state.record_event(
        EventType::Normal,
        "Cordoned",
        "Node",
        &name,
        "node marked unschedulable".to_string(),
    );
    Ok(format!("node/{} cordoned", name))
}

fn uncordon(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let name = single_node_arg(args)?;
    {
        let node = state
            .nodes
            .get_mut(&name)
            .ok_or_else(|| SimError::not_found("Node", &name))?;
        node.unschedulable = false;
        node.ready = true;
        node.draining = false;
    }
    info!("uncordoned node {}", name);
    state.record_event(
        EventType::Normal,
        "Uncordoned",
        "Node",
        &name,
        "node schedulable again".to_string(),
    );
    Ok(format!("node/{} uncordoned", name))
}

fn drain(state: &mut ClusterState, args: &[&str]) -> Result<String, SimError> {
    let name = single_node_arg(args)?;
    {
        let node = state
            .nodes
            .get_mut(&name)
            .ok_or_else(|| SimError::not_found("Node", &name))?;
        // The node stays Ready while draining; pods leave gracefully through
        // the PDB-gated eviction controller, not by node failure.
        node.unschedulable = true;
        node.draining = true;
    }
    info!("draining node {}", name);
    state.record_event(
        EventType::Normal,
        "DrainStarted",
        "Node",
        &name,
        "evicting pods respecting disruption budgets".to_string(),
    );
    Ok(format!("node/{} draining", name))
}

fn single_node_arg(args: &[&str]) -> Result<String, SimError> {
    let (positional, _) = Flags::parse(args)?;
    match positional.as_slice() {
        [name] => Ok(name.strip_prefix("node/").unwrap_or(name).to_string()),
        _ => Err(SimError::InvalidCommand("expected exactly one node name".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_split_positionals_and_pairs() {
        let (pos, flags) =
            Flags::parse(&["deployment", "web", "--image=nginx", "--replicas=2"]).unwrap();
        assert_eq!(pos, vec!["deployment", "web"]);
        assert_eq!(flags.get("image"), Some("nginx"));
        assert_eq!(flags.get_u32("replicas").unwrap(), Some(2));
    }

    #[test]
    fn kind_and_name_accepts_slash_form() {
        let (kind, name) = kind_and_name(&["deployment/frontend".to_string()]).unwrap();
        assert_eq!(kind, "Deployment");
        assert_eq!(name, "frontend");
    }

    #[test]
    fn unknown_kind_is_invalid() {
        assert!(matches!(
            canonical_kind("gizmo"),
            Err(SimError::InvalidCommand(_))
        ));
    }

    #[test]
    fn pairs_parse_and_reject_garbage() {
        let labels = parse_pairs("app=web,tier=frontend").unwrap();
        assert_eq!(labels.get("tier").map(|s| s.as_str()), Some("frontend"));
        assert!(parse_pairs("nonsense").is_err());
    }
}
