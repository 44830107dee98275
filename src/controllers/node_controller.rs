use tracing::{debug, warn};

use crate::models::{EventType, OwnerKind, PodPhase};
use crate::state::ClusterState;

/// Ticks a liveness probe will wait for an unready container before the
/// simulated kubelet kills it.
pub const LIVENESS_GRACE_TICKS: u64 = 3;

/// Node lifecycle plus the kubelet-ish per-pod runtime behavior: finalizing
/// terminating pods, failing pods off NotReady nodes, probe simulation and
/// Job pod completion. Runs first every tick.
pub struct NodeLifecycleController;

impl NodeLifecycleController {
    pub fn new() -> Self {
        NodeLifecycleController
    }

    pub fn reconcile(&self, state: &mut ClusterState) {
        self.finalize_terminated(state);
        state.recount_node_allocations();
        self.fail_pods_on_unready_nodes(state);
        self.run_probes(state);
        self.complete_job_pods(state);
    }

    /// Pods whose deletion was requested on an earlier tick are removed.
    /// Waiting one tick keeps the terminating pod observable, which is what
    /// PDB accounting and lessons rely on.
    fn finalize_terminated(&self, state: &mut ClusterState) {
        let tick = state.tick;
        let done: Vec<String> = state
            .pods
            .values()
            .filter(|p| matches!(p.status.deletion_timestamp, Some(t) if t < tick))
            .map(|p| p.name.clone())
            .collect();
        for name in done {
            debug!("finalized pod {}", name);
            state.pods.remove(&name);
        }
    }

    fn fail_pods_on_unready_nodes(&self, state: &mut ClusterState) {
        let unready: Vec<String> = state
            .nodes
            .values()
            .filter(|n| !n.ready)
            .map(|n| n.name.clone())
            .collect();

        let tick = state.tick;
        for node_name in unready {
            let victims: Vec<String> = state
                .pods
                .values()
                .filter(|p| p.spec.node_name.as_deref() == Some(node_name.as_str()) && p.is_live())
                .map(|p| p.name.clone())
                .collect();
            for pod_name in victims {
                warn!("pod {} lost: node {} is not ready", pod_name, node_name);
                if let Some(pod) = state.pods.get_mut(&pod_name) {
                    pod.status.phase = PodPhase::Failed;
                    pod.status.ready = false;
                    pod.status.reason = Some("NodeNotReady".to_string());
                    pod.status.message = Some(format!("node {} is not ready", node_name));
                    pod.status.deletion_timestamp = Some(tick);
                }
                state.record_event(
                    EventType::Warning,
                    "NodeNotReady",
                    "Pod",
                    &pod_name,
                    format!("pod failed because node {} became not ready", node_name),
                );
            }
        }
    }

    /// Readiness probes flip `ready` once their tick threshold elapses. A
    /// liveness probe with no startup probe kills a container that was never
    /// ready within the grace window, modeling liveness shooting down a
    /// slow starter.
    fn run_probes(&self, state: &mut ClusterState) {
        let tick = state.tick;
        let running: Vec<String> = state
            .pods
            .values()
            .filter(|p| p.status.phase == PodPhase::Running && !p.is_terminating())
            .map(|p| p.name.clone())
            .collect();

        for pod_name in running {
            let mut killed = false;
            if let Some(pod) = state.pods.get_mut(&pod_name) {
                let scheduled = match pod.status.tick_scheduled {
                    Some(t) => t,
                    None => continue,
                };
                let age = tick.saturating_sub(scheduled);

                if !pod.status.ready {
                    if let Some(probe) = &pod.spec.readiness_probe {
                        if age >= probe.ready_after_ticks {
                            pod.status.ready = true;
                            debug!("pod {} passed its readiness probe", pod_name);
                        }
                    }
                }

                if !pod.status.ready
                    && pod.spec.liveness_probe.is_some()
                    && pod.spec.startup_probe.is_none()
                    && age >= LIVENESS_GRACE_TICKS
                {
                    pod.status.phase = PodPhase::CrashLoopBackOff;
                    pod.status.restart_count += 1;
                    pod.status.reason = Some("CrashLoopBackOff".to_string());
                    pod.status.message =
                        Some("liveness probe failed before container became ready".to_string());
                    killed = true;
                }
            }
            if killed {
                state.record_event(
                    EventType::Warning,
                    "Unhealthy",
                    "Pod",
                    &pod_name,
                    "liveness probe killed container that never became ready".to_string(),
                );
            }
        }
    }

    /// Job pods run for `run_ticks` (default 1) and then succeed.
    fn complete_job_pods(&self, state: &mut ClusterState) {
        let tick = state.tick;
        let finished: Vec<String> = state
            .pods
            .values()
            .filter(|p| {
                p.status.phase == PodPhase::Running
                    && !p.is_terminating()
                    && p.owner.as_ref().map(|o| o.kind == OwnerKind::Job).unwrap_or(false)
                    && p.status
                        .tick_scheduled
                        .map(|t| tick.saturating_sub(t) >= p.spec.run_ticks.unwrap_or(1))
                        .unwrap_or(false)
            })
            .map(|p| p.name.clone())
            .collect();

        for pod_name in finished {
            if let Some(pod) = state.pods.get_mut(&pod_name) {
                pod.status.phase = PodPhase::Succeeded;
                pod.status.ready = false;
            }
            debug!("job pod {} finished its run", pod_name);
        }
    }
}

impl Default for NodeLifecycleController {
    fn default() -> Self {
        Self::new()
    }
}
