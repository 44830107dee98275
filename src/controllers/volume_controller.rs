use tracing::info;

use crate::models::{EventType, PersistentVolume, PvPhase, PvcPhase};
use crate::state::ClusterState;

/// Binds Pending claims: first to a matching pre-provisioned volume, else by
/// dynamic provisioning through a named StorageClass.
pub struct VolumeController;

impl VolumeController {
    pub fn new() -> Self {
        VolumeController
    }

    pub fn reconcile(&self, state: &mut ClusterState) {
        let pending: Vec<String> = state
            .persistent_volume_claims
            .values()
            .filter(|c| c.phase == PvcPhase::Pending)
            .map(|c| c.name.clone())
            .collect();

        for claim_name in pending {
            let (request, class) = match state.persistent_volume_claims.get(&claim_name) {
                Some(c) => (c.request_gi, c.storage_class.clone()),
                None => continue,
            };

            // Static binding: smallest-named available volume of the same
            // class with enough capacity.
            let matched = state
                .persistent_volumes
                .values()
                .find(|pv| {
                    pv.phase == PvPhase::Available
                        && pv.storage_class == class
                        && pv.capacity_gi >= request
                })
                .map(|pv| pv.name.clone());

            if let Some(pv_name) = matched {
                self.bind(state, &claim_name, &pv_name);
                continue;
            }

            // Dynamic provisioning through the requested class.
            let provisionable = class
                .as_ref()
                .map(|c| state.storage_classes.contains_key(c))
                .unwrap_or(false);
            if provisionable {
                let pv_name = format!("pv-{}", claim_name);
                let pv = PersistentVolume::new(&pv_name, request, class.clone());
                state.persistent_volumes.insert(pv_name.clone(), pv);
                state.record_event(
                    EventType::Normal,
                    "Provisioned",
                    "PersistentVolumeClaim",
                    &claim_name,
                    format!("dynamically provisioned volume {}", pv_name),
                );
                self.bind(state, &claim_name, &pv_name);
            } else if !state
                .events_for("PersistentVolumeClaim", &claim_name)
                .iter()
                .any(|e| e.reason == "FailedBinding")
            {
                state.record_event(
                    EventType::Warning,
                    "FailedBinding",
                    "PersistentVolumeClaim",
                    &claim_name,
                    "no matching volume and no storage class to provision one".to_string(),
                );
            }
        }
    }

    fn bind(&self, state: &mut ClusterState, claim_name: &str, pv_name: &str) {
        if let Some(pv) = state.persistent_volumes.get_mut(pv_name) {
            pv.phase = PvPhase::Bound;
            pv.claim_ref = Some(claim_name.to_string());
        }
        if let Some(claim) = state.persistent_volume_claims.get_mut(claim_name) {
            claim.phase = PvcPhase::Bound;
            claim.volume_name = Some(pv_name.to_string());
        }
        info!("bound claim {} to volume {}", claim_name, pv_name);
        state.record_event(
            EventType::Normal,
            "Bound",
            "PersistentVolumeClaim",
            claim_name,
            format!("bound to volume {}", pv_name),
        );
    }
}

impl Default for VolumeController {
    fn default() -> Self {
        Self::new()
    }
}
