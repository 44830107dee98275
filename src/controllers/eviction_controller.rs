use tracing::{info, warn};

use crate::models::{labels::selector_matches, EventType, OwnerKind};
use crate::state::ClusterState;

/// Empties draining nodes one eviction at a time, deferring any eviction a
/// PodDisruptionBudget would not allow. Blocked evictions are retried every
/// tick; nothing here is ever a hard error. DaemonSet pods are left in
/// place, as `kubectl drain --ignore-daemonsets` does.
pub struct EvictionController;

impl EvictionController {
    pub fn new() -> Self {
        EvictionController
    }

    pub fn reconcile(&self, state: &mut ClusterState) {
        let draining: Vec<String> = state
            .nodes
            .values()
            .filter(|n| n.draining)
            .map(|n| n.name.clone())
            .collect();

        for node_name in draining {
            let victims: Vec<String> = state
                .pods
                .values()
                .filter(|p| {
                    p.spec.node_name.as_deref() == Some(node_name.as_str())
                        && !p.is_terminating()
                        && !p
                            .owner
                            .as_ref()
                            .map(|o| o.kind == OwnerKind::DaemonSet)
                            .unwrap_or(false)
                })
                .map(|p| p.name.clone())
                .collect();

            if victims.is_empty() {
                if let Some(node) = state.nodes.get_mut(&node_name) {
                    node.draining = false;
                }
                info!("node {} drained", node_name);
                state.record_event(
                    EventType::Normal,
                    "Drained",
                    "Node",
                    &node_name,
                    "all evictable pods removed".to_string(),
                );
                continue;
            }

            for pod_name in victims {
                let blockers = self.blocking_pdbs(state, &pod_name);
                if blockers.is_empty() {
                    state.mark_pod_terminating(&pod_name);
                    state.record_event(
                        EventType::Normal,
                        "Evicted",
                        "Pod",
                        &pod_name,
                        format!("evicted from draining node {}", node_name),
                    );
                } else {
                    for pdb_name in &blockers {
                        if let Some(pdb) = state.pdbs.get_mut(pdb_name) {
                            pdb.status.disruptions_blocked += 1;
                        }
                    }
                    warn!(
                        "eviction of {} deferred by pdb [{}]",
                        pod_name,
                        blockers.join(", ")
                    );
                    state.record_event(
                        EventType::Warning,
                        "EvictionBlocked",
                        "Pod",
                        &pod_name,
                        format!("disruption budget {} would be exceeded", blockers.join(", ")),
                    );
                }
            }
        }
    }

    /// Names of PDBs that would be violated by evicting this pod now.
    /// Terminating pods still count as unavailable until finalized, which is
    /// what keeps concurrent disruption bounded across ticks.
    fn blocking_pdbs(&self, state: &ClusterState, pod_name: &str) -> Vec<String> {
        let pod = match state.pods.get(pod_name) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let pod_available = pod.is_ready_endpoint();

        let mut blockers = Vec::new();
        for pdb in state.pdbs.values() {
            if !selector_matches(&pdb.spec.selector, &pod.labels) {
                continue;
            }
            let matching: Vec<_> = state
                .pods
                .values()
                .filter(|p| selector_matches(&pdb.spec.selector, &p.labels))
                .collect();
            let available = matching.iter().filter(|p| p.is_ready_endpoint()).count() as u32;
            let after = if pod_available {
                available.saturating_sub(1)
            } else {
                available
            };
            let unavailable_after = matching.len() as u32 - after;

            let violates_max = pdb
                .spec
                .max_unavailable
                .map(|max| unavailable_after > max)
                .unwrap_or(false);
            let violates_min = pdb
                .spec
                .min_available
                .map(|min| after < min)
                .unwrap_or(false);
            if violates_max || violates_min {
                blockers.push(pdb.name.clone());
            }
        }
        blockers
    }
}

impl Default for EvictionController {
    fn default() -> Self {
        Self::new()
    }
}
