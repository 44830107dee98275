use crate::state::{ClusterState, FailureRules};

/// What a lesson supplies to drive the engine. Lessons are data plus a few
/// hooks; the engine never knows which lesson is running.
pub trait Lesson {
    /// The cluster as the learner first sees it.
    fn initial_state(&self) -> ClusterState;

    /// Runs once per tick after all built-in controllers, observing the
    /// fully reconciled state. Scripted fault injection lives here.
    fn after_tick(&self, _tick: u64, _state: &mut ClusterState) {}

    /// Whether the learner has reached the lesson's goal.
    fn goal_check(&self, state: &ClusterState) -> bool;

    /// Images that come up broken, consulted whenever a controller creates
    /// a pod.
    fn pod_failure_rules(&self) -> FailureRules {
        FailureRules::new()
    }
}

/// Free-play environment: three empty nodes, no goal. What `main` runs when
/// no lesson is driving.
#[derive(Debug, Default)]
pub struct Sandbox;

impl Lesson for Sandbox {
    fn initial_state(&self) -> ClusterState {
        ClusterState::with_nodes(3, 4)
    }

    fn goal_check(&self, _state: &ClusterState) -> bool {
        false
    }
}
