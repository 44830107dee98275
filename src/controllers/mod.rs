pub mod daemonset_controller;
pub mod deployment_controller;
pub mod endpoints_controller;
pub mod eviction_controller;
pub mod job_controller;
pub mod node_controller;
pub mod replicaset_controller;
pub mod volume_controller;

use crate::scheduler::Scheduler;
use crate::state::{ClusterState, FailureRules};

use self::daemonset_controller::DaemonSetController;
use self::deployment_controller::DeploymentController;
use self::endpoints_controller::EndpointsController;
use self::eviction_controller::EvictionController;
use self::job_controller::JobController;
use self::node_controller::NodeLifecycleController;
use self::replicaset_controller::ReplicaSetController;
use self::volume_controller::VolumeController;

/// Runs every controller once, in the fixed dependency order. The order is
/// load-bearing: the scheduler must see the pods the workload controllers
/// created this tick, and endpoints must see what the scheduler placed.
pub struct ControllerManager {
    node: NodeLifecycleController,
    deployment: DeploymentController,
    replicaset: ReplicaSetController,
    daemonset: DaemonSetController,
    job: JobController,
    scheduler: Scheduler,
    endpoints: EndpointsController,
    volume: VolumeController,
    eviction: EvictionController,
}

impl ControllerManager {
    pub fn new() -> Self {
        Self {
            node: NodeLifecycleController::new(),
            deployment: DeploymentController::new(),
            replicaset: ReplicaSetController::new(),
            daemonset: DaemonSetController::new(),
            job: JobController::new(),
            scheduler: Scheduler::new(),
            endpoints: EndpointsController::new(),
            volume: VolumeController::new(),
            eviction: EvictionController::new(),
        }
    }

    /// One full synchronous reconciliation pass. Re-running with no
    /// intervening commands converges: no duplicate creations, no
    /// double-evictions.
    pub fn reconcile(&self, state: &mut ClusterState, rules: &FailureRules) {
        self.node.reconcile(state);
        self.deployment.reconcile(state);
        self.replicaset.reconcile(state, rules);
        self.daemonset.reconcile(state, rules);
        self.job.reconcile(state, rules);
        self.scheduler.schedule(state);
        self.endpoints.reconcile(state);
        self.volume.reconcile(state);
        self.eviction.reconcile(state);
    }
}

impl Default for ControllerManager {
    fn default() -> Self {
        Self::new()
    }
}
