use tracing::info;

use crate::models::{EventType, PodPhase};
use crate::state::ClusterState;

/// Assigns Pending pods to nodes. Runs after the workload controllers have
/// created pods and before the endpoints controller recomputes, so a pod
/// scheduled this tick is visible (and its readiness honored) immediately.
pub struct Scheduler;

impl Scheduler {
    pub fn new() -> Self {
        Scheduler
    }

    pub fn schedule(&self, state: &mut ClusterState) {
        // DaemonSet pods never reach here: they are created with node_name
        // pinned. Pods with an injected failure stay put as well.
        let pending: Vec<String> = state
            .pods
            .values()
            .filter(|p| {
                p.status.phase == PodPhase::Pending
                    && p.spec.node_name.is_none()
                    && p.spec.failure_mode.is_none()
                    && !p.is_terminating()
            })
            .map(|p| p.name.clone())
            .collect();

        for pod_name in pending {
            let tolerations = match state.pods.get(&pod_name) {
                Some(p) => p.spec.tolerations.clone(),
                None => continue,
            };

            // Filter by readiness, cordon, capacity and taints; score by most
            // free capacity. Ties go to the lexicographically smallest node
            // name so outcomes are stable across runs.
            let chosen = state
                .nodes
                .values()
                .filter(|n| n.schedulable_for(&tolerations))
                .max_by(|a, b| {
                    (a.capacity - a.allocated_pods)
                        .cmp(&(b.capacity - b.allocated_pods))
                        .then_with(|| b.name.cmp(&a.name))
                })
                .map(|n| n.name.clone());

            match chosen {
                Some(node_name) => {
                    self.bind(state, &pod_name, &node_name);
                }
                None => {
                    let already_marked = state
                        .pods
                        .get(&pod_name)
                        .map(|p| p.status.reason.as_deref() == Some("Unschedulable"))
                        .unwrap_or(true);
                    if !already_marked {
                        if let Some(pod) = state.pods.get_mut(&pod_name) {
                            pod.status.reason = Some("Unschedulable".to_string());
                            pod.status.message =
                                Some("no eligible node for this pod".to_string());
                        }
                        state.record_event(
                            EventType::Warning,
                            "FailedScheduling",
                            "Pod",
                            &pod_name,
                            "no node is ready, schedulable, within capacity and tolerated"
                                .to_string(),
                        );
                    }
                }
            }
        }
    }

    fn bind(&self, state: &mut ClusterState, pod_name: &str, node_name: &str) {
        let tick = state.tick;
        if let Some(pod) = state.pods.get_mut(pod_name) {
            pod.spec.node_name = Some(node_name.to_string());
            pod.status.phase = PodPhase::Running;
            // Pods without a readiness probe are ready the moment they run.
            pod.status.ready = pod.spec.readiness_probe.is_none();
            pod.status.tick_scheduled = Some(tick);
            pod.status.reason = None;
            pod.status.message = None;
        }
        if let Some(node) = state.nodes.get_mut(node_name) {
            node.allocated_pods += 1;
        }
        info!("scheduled pod {} onto {}", pod_name, node_name);
        state.record_event(
            EventType::Normal,
            "Scheduled",
            "Pod",
            pod_name,
            format!("successfully assigned to {}", node_name),
        );
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
