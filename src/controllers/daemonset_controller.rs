use tracing::info;

use crate::models::{EventType, OwnerKind, OwnerRef, PodPhase};
use crate::state::{ClusterState, FailureRules};

/// One pod pinned per eligible node. Eligible means Ready with every
/// NoSchedule/NoExecute taint tolerated by the template; pods are bound
/// directly by node name and never pass through the scheduler.
pub struct DaemonSetController;

impl DaemonSetController {
    pub fn new() -> Self {
        DaemonSetController
    }

    pub fn reconcile(&self, state: &mut ClusterState, rules: &FailureRules) {
        let names: Vec<String> = state.daemonsets.keys().cloned().collect();
        for ds_name in names {
            self.reconcile_one(state, &ds_name, rules);
        }
    }

    fn reconcile_one(&self, state: &mut ClusterState, ds_name: &str, rules: &FailureRules) {
        let (uid, template) = match state.daemonsets.get(ds_name) {
            Some(ds) => (ds.uid.clone(), ds.spec.template.clone()),
            None => return,
        };
        let tolerations = template.spec.tolerations.clone();

        let eligible: Vec<String> = state
            .nodes
            .values()
            .filter(|n| n.ready && n.tolerates(&tolerations))
            .map(|n| n.name.clone())
            .collect();

        for node_name in &eligible {
            let covered = state.pods.values().any(|p| {
                p.is_live()
                    && p.owned_by(OwnerKind::DaemonSet, ds_name)
                    && p.spec.node_name.as_deref() == Some(node_name.as_str())
            });
            if covered {
                continue;
            }
            let owner = OwnerRef {
                kind: OwnerKind::DaemonSet,
                name: ds_name.to_string(),
                uid: uid.clone(),
            };
            let pod_name = state.spawn_pod(ds_name, &template, Some(owner), rules);
            let tick = state.tick;
            if let Some(pod) = state.pods.get_mut(&pod_name) {
                pod.spec.node_name = Some(node_name.clone());
                pod.status.tick_scheduled = Some(tick);
                // Injected failures keep their pre-set phase; healthy pods
                // start running immediately on their pinned node.
                if pod.spec.failure_mode.is_none() {
                    pod.status.phase = PodPhase::Running;
                    pod.status.ready = pod.spec.readiness_probe.is_none();
                }
            }
            if let Some(node) = state.nodes.get_mut(node_name) {
                node.allocated_pods += 1;
            }
            info!("daemonset {} placed pod {} on {}", ds_name, pod_name, node_name);
            state.record_event(
                EventType::Normal,
                "SuccessfulCreate",
                "DaemonSet",
                ds_name,
                format!("created pod {} on node {}", pod_name, node_name),
            );
        }

        // Tear down pods on nodes that fell out of eligibility.
        let stray: Vec<String> = state
            .pods
            .values()
            .filter(|p| {
                p.is_live()
                    && p.owned_by(OwnerKind::DaemonSet, ds_name)
                    && p.spec
                        .node_name
                        .as_ref()
                        .map(|n| !eligible.contains(n))
                        .unwrap_or(true)
            })
            .map(|p| p.name.clone())
            .collect();
        for pod_name in stray {
            state.mark_pod_terminating(&pod_name);
            state.record_event(
                EventType::Normal,
                "SuccessfulDelete",
                "DaemonSet",
                ds_name,
                format!("deleted pod {} from ineligible node", pod_name),
            );
        }

        let (current, ready) = {
            let mut current = 0;
            let mut ready = 0;
            for p in state.pods.values() {
                if p.is_live() && p.owned_by(OwnerKind::DaemonSet, ds_name) {
                    current += 1;
                    if p.is_ready_endpoint() {
                        ready += 1;
                    }
                }
            }
            (current, ready)
        };
        if let Some(ds) = state.daemonsets.get_mut(ds_name) {
            ds.status.desired = eligible.len() as u32;
            ds.status.current = current;
            ds.status.ready = ready;
        }
    }
}

impl Default for DaemonSetController {
    fn default() -> Self {
        Self::new()
    }
}
