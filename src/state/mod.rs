use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::models::{
    labels::selector_matches, ConfigMap, CronJob, DaemonSet, Deployment, Event, EventType,
    FailureMode, HorizontalPodAutoscaler, Job, Labels, Namespace, Node, OwnerRef,
    PersistentVolume, PersistentVolumeClaim, Pod, PodDisruptionBudget, PodTemplate, ReplicaSet,
    Service, StatefulSet, StorageClass,
};

/// Images whose pods come up broken, supplied per lesson and consulted when
/// controllers stamp out pods.
pub type FailureRules = BTreeMap<String, FailureMode>;

/// The entire simulated cluster. One isolated value per lesson instance;
/// controllers mutate it in place during a tick. All collections are keyed
/// by object name in BTreeMaps so every pass over them is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ClusterState {
    pub tick: u64,
    pub nodes: BTreeMap<String, Node>,
    pub pods: BTreeMap<String, Pod>,
    pub replicasets: BTreeMap<String, ReplicaSet>,
    pub deployments: BTreeMap<String, Deployment>,
    pub services: BTreeMap<String, Service>,
    pub daemonsets: BTreeMap<String, DaemonSet>,
    pub jobs: BTreeMap<String, Job>,
    pub cronjobs: BTreeMap<String, CronJob>,
    pub statefulsets: BTreeMap<String, StatefulSet>,
    pub hpas: BTreeMap<String, HorizontalPodAutoscaler>,
    pub namespaces: BTreeMap<String, Namespace>,
    pub configmaps: BTreeMap<String, ConfigMap>,
    pub storage_classes: BTreeMap<String, StorageClass>,
    pub persistent_volumes: BTreeMap<String, PersistentVolume>,
    pub persistent_volume_claims: BTreeMap<String, PersistentVolumeClaim>,
    pub pdbs: BTreeMap<String, PodDisruptionBudget>,
    /// Append-only diagnostic trail.
    pub events: Vec<Event>,
    /// Append-only set of command verbs the learner has used, read by lesson
    /// goal checks. Observability only, never consulted by controllers.
    pub commands_used: BTreeSet<String>,
}

impl ClusterState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state
            .namespaces
            .insert("default".to_string(), Namespace::new("default"));
        state
    }

    /// Fresh state with ready nodes of uniform capacity, the shape most
    /// lessons start from.
    pub fn with_nodes(count: u32, capacity: u32) -> Self {
        let mut state = Self::new();
        for i in 1..=count {
            let name = format!("node-{}", i);
            state.nodes.insert(name.clone(), Node::new(&name, capacity));
        }
        state
    }

    pub fn record_event(
        &mut self,
        event_type: EventType,
        reason: &str,
        object_kind: &str,
        object_name: &str,
        message: String,
    ) {
        debug!(
            tick = self.tick,
            kind = object_kind,
            object = object_name,
            reason,
            "{}",
            message
        );
        self.events.push(Event::new(
            self.tick,
            event_type,
            reason,
            object_kind,
            object_name,
            message,
        ));
    }

    pub fn events_for(&self, object_kind: &str, object_name: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.object_kind == object_kind && e.object_name == object_name)
            .collect()
    }

    /// Live pods matching a selector, in name order.
    pub fn live_pods_matching(&self, selector: &Labels) -> Vec<&Pod> {
        self.pods
            .values()
            .filter(|p| p.is_live() && selector_matches(selector, &p.labels))
            .collect()
    }

    /// Stamp a pod out of a template, applying fault-injection rules. The
    /// name is `<base>-<uid fragment>` so repeated creations never collide.
    pub fn spawn_pod(
        &mut self,
        base_name: &str,
        template: &PodTemplate,
        owner: Option<OwnerRef>,
        rules: &FailureRules,
    ) -> String {
        let mut pod = Pod::new(String::new(), template.labels.clone(), template.spec.clone(), self.tick);
        let fragment = pod.uid.split('-').next().unwrap_or("0").to_string();
        pod.name = format!("{}-{}", base_name, &fragment[..fragment.len().min(5)]);
        pod.owner = owner;

        // Lesson failure rules by image, unless the template already injects
        // a failure of its own.
        if pod.spec.failure_mode.is_none() {
            if let Some(mode) = rules.get(&pod.spec.image) {
                pod.spec.failure_mode = Some(*mode);
            }
        }
        if let Some(mode) = pod.spec.failure_mode {
            pod.status.phase = mode.phase();
            pod.status.reason = Some(mode.reason().to_string());
            pod.status.message = Some(format!(
                "container image \"{}\" failed: {}",
                pod.spec.image,
                mode.reason()
            ));
            self.record_event(
                EventType::Warning,
                mode.reason(),
                "Pod",
                &pod.name,
                format!("pod created with injected failure for image {}", pod.spec.image),
            );
        }

        let name = pod.name.clone();
        self.pods.insert(name.clone(), pod);
        name
    }

    /// Graceful delete: mark terminating now, finalize on a later tick.
    pub fn mark_pod_terminating(&mut self, pod_name: &str) {
        let tick = self.tick;
        if let Some(pod) = self.pods.get_mut(pod_name) {
            if pod.status.deletion_timestamp.is_none() {
                pod.status.deletion_timestamp = Some(tick);
            }
        }
    }

    /// Keep node pod-counts in sync with the pods that actually reference
    /// them. Cheap at lesson scale and makes every controller pass
    /// re-runnable.
    pub fn recount_node_allocations(&mut self) {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for pod in self.pods.values() {
            if let Some(node) = &pod.spec.node_name {
                *counts.entry(node.clone()).or_insert(0) += 1;
            }
        }
        for node in self.nodes.values_mut() {
            node.allocated_pods = counts.get(&node.name).copied().unwrap_or(0);
        }
    }
}
