use tracing::info;

use crate::command;
use crate::controllers::ControllerManager;
use crate::error::SimError;
use crate::lesson::Lesson;
use crate::state::{ClusterState, FailureRules};

/// One lesson instance: an isolated cluster state plus the lesson hooks and
/// the controller set. Entirely turn-based; nothing advances until
/// `run_command` or `tick` is called, and every tick runs to completion.
pub struct Simulation {
    state: ClusterState,
    lesson: Box<dyn Lesson>,
    manager: ControllerManager,
    failure_rules: FailureRules,
}

impl Simulation {
    pub fn new(lesson: Box<dyn Lesson>) -> Self {
        let state = lesson.initial_state();
        let failure_rules = lesson.pod_failure_rules();
        Self {
            state,
            lesson,
            manager: ControllerManager::new(),
            failure_rules,
        }
    }

    pub fn state(&self) -> &ClusterState {
        &self.state
    }

    /// Direct state access for scripted scenarios and tests.
    pub fn state_mut(&mut self) -> &mut ClusterState {
        &mut self.state
    }

    /// Executes one kubectl-shaped command. Errors are local: failed
    /// commands never corrupt state or stop the simulation.
    pub fn run_command(&mut self, input: &str) -> Result<String, SimError> {
        command::execute(&mut self.state, input)
    }

    /// Advances simulated time by one reconciliation pass, then lets the
    /// lesson's hook observe (and possibly perturb) the result.
    pub fn tick(&mut self) {
        self.state.tick += 1;
        info!("tick {}", self.state.tick);
        self.manager.reconcile(&mut self.state, &self.failure_rules);
        let tick = self.state.tick;
        self.lesson.after_tick(tick, &mut self.state);
    }

    /// Convenience: run several ticks back to back.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.lesson.goal_check(&self.state)
    }
}
