use tracing::debug;

use crate::models::labels::selector_matches;
use crate::state::ClusterState;

/// Recomputes every Service's endpoints from live pod state each tick, so
/// endpoints are never stale across a full reconciliation.
pub struct EndpointsController;

impl EndpointsController {
    pub fn new() -> Self {
        EndpointsController
    }

    pub fn reconcile(&self, state: &mut ClusterState) {
        let names: Vec<String> = state.services.keys().cloned().collect();
        for svc_name in names {
            let selector = match state.services.get(&svc_name) {
                Some(svc) => svc.spec.selector.clone(),
                None => continue,
            };

            // Running, non-terminating, ready, labels a superset of the
            // selector. BTreeMap iteration already yields name order.
            let endpoints: Vec<String> = state
                .pods
                .values()
                .filter(|p| p.is_ready_endpoint() && selector_matches(&selector, &p.labels))
                .map(|p| p.name.clone())
                .collect();

            if let Some(svc) = state.services.get_mut(&svc_name) {
                if svc.status.endpoints != endpoints {
                    debug!(
                        "service {} endpoints now [{}]",
                        svc_name,
                        endpoints.join(", ")
                    );
                    svc.status.endpoints = endpoints;
                }
            }
        }
    }
}

impl Default for EndpointsController {
    fn default() -> Self {
        Self::new()
    }
}
