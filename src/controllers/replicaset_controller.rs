use tracing::info;

use crate::models::{labels::selector_matches, EventType, OwnerKind, OwnerRef};
use crate::state::{ClusterState, FailureRules};

/// Drives each ReplicaSet's live pod count toward `spec.replicas`.
/// Ownership is selector-based: a pod whose matching label is removed is
/// orphaned (no longer counted, not deleted) and the set backfills it.
pub struct ReplicaSetController;

impl ReplicaSetController {
    pub fn new() -> Self {
        ReplicaSetController
    }

    pub fn reconcile(&self, state: &mut ClusterState, rules: &FailureRules) {
        let names: Vec<String> = state.replicasets.keys().cloned().collect();
        for rs_name in names {
            self.reconcile_one(state, &rs_name, rules);
        }
    }

    fn reconcile_one(&self, state: &mut ClusterState, rs_name: &str, rules: &FailureRules) {
        let (uid, desired, selector, template) = match state.replicasets.get(rs_name) {
            Some(rs) => (
                rs.uid.clone(),
                rs.spec.replicas,
                rs.spec.selector.clone(),
                rs.spec.template.clone(),
            ),
            None => return,
        };

        let live: Vec<(String, u64, bool)> = state
            .pods
            .values()
            .filter(|p| p.is_live() && selector_matches(&selector, &p.labels))
            .map(|p| (p.name.clone(), p.status.tick_created, p.is_ready_endpoint()))
            .collect();
        let current = live.len() as u32;

        if current < desired {
            let missing = desired - current;
            info!("replicaset {} needs {} more pods", rs_name, missing);
            for _ in 0..missing {
                let owner = OwnerRef {
                    kind: OwnerKind::ReplicaSet,
                    name: rs_name.to_string(),
                    uid: uid.clone(),
                };
                let pod_name = state.spawn_pod(rs_name, &template, Some(owner), rules);
                state.record_event(
                    EventType::Normal,
                    "SuccessfulCreate",
                    "ReplicaSet",
                    rs_name,
                    format!("created pod {}", pod_name),
                );
            }
        } else if current > desired {
            let excess = (current - desired) as usize;
            info!("replicaset {} has {} excess pods", rs_name, excess);
            // Unready pods go first, then newest (latest creation tick, name
            // order breaking ties within a tick).
            let mut victims = live;
            victims.sort_by(|a, b| {
                a.2.cmp(&b.2)
                    .then_with(|| b.1.cmp(&a.1))
                    .then_with(|| b.0.cmp(&a.0))
            });
            for (pod_name, _, _) in victims.into_iter().take(excess) {
                state.mark_pod_terminating(&pod_name);
                state.record_event(
                    EventType::Normal,
                    "SuccessfulDelete",
                    "ReplicaSet",
                    rs_name,
                    format!("deleted pod {}", pod_name),
                );
            }
        }

        // Refresh status from what is actually live after the corrections.
        let (replicas, ready) = {
            let mut replicas = 0;
            let mut ready = 0;
            for p in state.pods.values() {
                if p.is_live() && selector_matches(&selector, &p.labels) {
                    replicas += 1;
                    if p.is_ready_endpoint() {
                        ready += 1;
                    }
                }
            }
            (replicas, ready)
        };
        if let Some(rs) = state.replicasets.get_mut(rs_name) {
            rs.status.replicas = replicas;
            rs.status.ready_replicas = ready;
        }
    }
}

impl Default for ReplicaSetController {
    fn default() -> Self {
        Self::new()
    }
}
