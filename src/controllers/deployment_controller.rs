use tracing::info;

use crate::models::{
    Condition, EventType, OwnerKind, OwnerRef, ReplicaSet, ReplicaSetSpec,
};
use crate::state::ClusterState;

const POD_TEMPLATE_HASH: &str = "pod-template-hash";

/// Owns ReplicaSets, one per pod-template generation. On a template change a
/// new ReplicaSet named `<deployment>-<hash>` appears and the rollout walks
/// old sets down and the new one up within maxSurge/maxUnavailable.
pub struct DeploymentController;

impl DeploymentController {
    pub fn new() -> Self {
        DeploymentController
    }

    pub fn reconcile(&self, state: &mut ClusterState) {
        let names: Vec<String> = state.deployments.keys().cloned().collect();
        for name in names {
            self.reconcile_one(state, &name);
        }
    }

    fn reconcile_one(&self, state: &mut ClusterState, name: &str) {
        let (uid, desired, strategy, mut template, mut selector, hash) =
            match state.deployments.get(name) {
                Some(d) => (
                    d.uid.clone(),
                    d.spec.replicas,
                    d.spec.strategy.clone(),
                    d.spec.template.clone(),
                    d.spec.selector.clone(),
                    d.template_hash(),
                ),
                None => return,
            };

        // The hash label keeps generations of the same deployment from
        // claiming each other's pods.
        selector.insert(POD_TEMPLATE_HASH.to_string(), hash.clone());
        template
            .labels
            .insert(POD_TEMPLATE_HASH.to_string(), hash.clone());

        let current_rs = format!("{}-{}", name, hash);
        let owned: Vec<String> = state
            .replicasets
            .values()
            .filter(|rs| {
                rs.owner
                    .as_ref()
                    .map(|o| o.kind == OwnerKind::Deployment && o.name == name)
                    .unwrap_or(false)
            })
            .map(|rs| rs.name.clone())
            .collect();

        if !state.replicasets.contains_key(&current_rs) {
            // First generation goes straight to scale; later generations
            // start at zero and surge up.
            let initial = if owned.is_empty() { desired } else { 0 };
            let mut rs = ReplicaSet::new(
                &current_rs,
                ReplicaSetSpec {
                    replicas: initial,
                    selector: selector.clone(),
                    template: template.clone(),
                },
            );
            rs.owner = Some(OwnerRef {
                kind: OwnerKind::Deployment,
                name: name.to_string(),
                uid: uid.clone(),
            });
            rs.template_hash = hash.clone();
            info!("deployment {} created replicaset {}", name, current_rs);
            state.record_event(
                EventType::Normal,
                "ScalingReplicaSet",
                "Deployment",
                name,
                format!("created replicaset {} (replicas {})", current_rs, initial),
            );
            state.replicasets.insert(current_rs.clone(), rs);
        }

        let old: Vec<String> = owned.into_iter().filter(|n| n != &current_rs).collect();

        // Ready pods across every generation, measured live.
        let ready_total = self.ready_owned_pods(state, &current_rs, &old);

        if old.is_empty() {
            // No rollout in flight; track scale changes directly.
            if let Some(rs) = state.replicasets.get_mut(&current_rs) {
                if rs.spec.replicas != desired {
                    info!(
                        "deployment {} scaling replicaset {} to {}",
                        name, current_rs, desired
                    );
                    rs.spec.replicas = desired;
                }
            }
        } else {
            // Scale old sets down as far as availability allows, then the
            // new set up within the surge budget. Down first so the surge
            // headroom frees up in the same tick. Unhealthy old replicas
            // never count against availability, so a wedged generation can
            // always be cleared out.
            let min_available = desired.saturating_sub(strategy.max_unavailable);
            let mut ready_removable = ready_total.saturating_sub(min_available);
            for old_name in &old {
                let (live, ready) = {
                    let mut live = 0;
                    let mut ready = 0;
                    for p in state.pods.values() {
                        if p.is_live() && p.owned_by(OwnerKind::ReplicaSet, old_name) {
                            live += 1;
                            if p.is_ready_endpoint() {
                                ready += 1;
                            }
                        }
                    }
                    (live, ready)
                };
                let unhealthy: u32 = live - ready;
                if let Some(rs) = state.replicasets.get_mut(old_name) {
                    let dec = rs
                        .spec
                        .replicas
                        .min(unhealthy + ready.min(ready_removable));
                    if dec > 0 {
                        rs.spec.replicas -= dec;
                        ready_removable -= dec.saturating_sub(unhealthy).min(ready_removable);
                        let to = rs.spec.replicas;
                        state.record_event(
                            EventType::Normal,
                            "ScalingReplicaSet",
                            "Deployment",
                            name,
                            format!("scaled down replicaset {} to {}", old_name, to),
                        );
                    }
                }
            }

            let specced: u32 = [current_rs.clone()]
                .iter()
                .chain(old.iter())
                .filter_map(|n| state.replicasets.get(n))
                .map(|rs| rs.spec.replicas)
                .sum();
            let headroom = (desired + strategy.max_surge).saturating_sub(specced);
            if let Some(rs) = state.replicasets.get_mut(&current_rs) {
                if rs.spec.replicas < desired && headroom > 0 {
                    let inc = (desired - rs.spec.replicas).min(headroom);
                    rs.spec.replicas += inc;
                    let to = rs.spec.replicas;
                    state.record_event(
                        EventType::Normal,
                        "ScalingReplicaSet",
                        "Deployment",
                        name,
                        format!("scaled up replicaset {} to {}", current_rs, to),
                    );
                }
            }

            // Drop drained generations once their pods are gone.
            for old_name in &old {
                let specced_zero = state
                    .replicasets
                    .get(old_name)
                    .map(|rs| rs.spec.replicas == 0)
                    .unwrap_or(false);
                let no_pods = !state
                    .pods
                    .values()
                    .any(|p| p.is_live() && p.owned_by(OwnerKind::ReplicaSet, old_name));
                if specced_zero && no_pods {
                    state.replicasets.remove(old_name);
                    info!("deployment {} removed old replicaset {}", name, old_name);
                }
            }
        }

        self.update_status(state, name, &current_rs, desired, strategy.max_unavailable);
    }

    fn ready_owned_pods(&self, state: &ClusterState, current_rs: &str, old: &[String]) -> u32 {
        let mut ready = 0;
        for p in state.pods.values() {
            if !p.is_ready_endpoint() {
                continue;
            }
            let owned = p.owned_by(OwnerKind::ReplicaSet, current_rs)
                || old.iter().any(|o| p.owned_by(OwnerKind::ReplicaSet, o));
            if owned {
                ready += 1;
            }
        }
        ready
    }

    fn update_status(
        &self,
        state: &mut ClusterState,
        name: &str,
        current_rs: &str,
        desired: u32,
        max_unavailable: u32,
    ) {
        let still_rolling = state
            .replicasets
            .values()
            .any(|rs| {
                rs.name != current_rs
                    && rs.owner
                        .as_ref()
                        .map(|o| o.kind == OwnerKind::Deployment && o.name == name)
                        .unwrap_or(false)
            });
        let mut replicas = 0;
        let mut ready = 0;
        let mut updated = 0;
        for p in state.pods.values() {
            if !p.is_live() {
                continue;
            }
            let on_current = p.owned_by(OwnerKind::ReplicaSet, current_rs);
            let on_deployment = on_current
                || p.owner
                    .as_ref()
                    .map(|o| {
                        o.kind == OwnerKind::ReplicaSet
                            && state
                                .replicasets
                                .get(&o.name)
                                .and_then(|rs| rs.owner.as_ref())
                                .map(|d| d.kind == OwnerKind::Deployment && d.name == name)
                                .unwrap_or(false)
                    })
                    .unwrap_or(false);
            if on_deployment {
                replicas += 1;
                if p.is_ready_endpoint() {
                    ready += 1;
                }
                if on_current {
                    updated += 1;
                }
            }
        }

        let available = ready >= desired.saturating_sub(max_unavailable) && desired > 0;
        let settled = !still_rolling && ready >= desired;
        if let Some(d) = state.deployments.get_mut(name) {
            d.status.replicas = replicas;
            d.status.ready_replicas = ready;
            d.status.updated_replicas = updated;
            d.status.conditions = vec![
                Condition {
                    condition_type: "Available".to_string(),
                    status: available,
                    reason: if available {
                        "MinimumReplicasAvailable".to_string()
                    } else {
                        "MinimumReplicasUnavailable".to_string()
                    },
                    message: format!("{} of {} replicas are available", ready, desired),
                },
                Condition {
                    condition_type: "Progressing".to_string(),
                    status: true,
                    reason: if settled {
                        "NewReplicaSetAvailable".to_string()
                    } else {
                        "ReplicaSetUpdated".to_string()
                    },
                    message: if settled {
                        format!("replicaset {} has successfully progressed", current_rs)
                    } else {
                        format!("replicaset {} is progressing", current_rs)
                    },
                },
            ];
        }
    }
}

impl Default for DeploymentController {
    fn default() -> Self {
        Self::new()
    }
}
