#![allow(dead_code)]

use kubesim::models::{
    labels, PodPhase, PodSpec, PodTemplate, ReplicaSet, ReplicaSetSpec,
};
use kubesim::{ClusterState, FailureRules, Lesson, Simulation};

pub type AfterHook = fn(u64, &mut ClusterState);

/// Test stand-in for lesson content: a canned initial state, optional
/// failure rules and an optional scripted after-tick hook.
pub struct ScriptedLesson {
    initial: ClusterState,
    rules: FailureRules,
    after: Option<AfterHook>,
}

impl Lesson for ScriptedLesson {
    fn initial_state(&self) -> ClusterState {
        self.initial.clone()
    }

    fn after_tick(&self, tick: u64, state: &mut ClusterState) {
        if let Some(hook) = self.after {
            hook(tick, state);
        }
    }

    fn goal_check(&self, _state: &ClusterState) -> bool {
        false
    }

    fn pod_failure_rules(&self) -> FailureRules {
        self.rules.clone()
    }
}

pub fn sim_with(initial: ClusterState) -> Simulation {
    Simulation::new(Box::new(ScriptedLesson {
        initial,
        rules: FailureRules::new(),
        after: None,
    }))
}

pub fn sim_with_rules(initial: ClusterState, rules: FailureRules) -> Simulation {
    Simulation::new(Box::new(ScriptedLesson {
        initial,
        rules,
        after: None,
    }))
}

pub fn sim_with_hook(initial: ClusterState, after: AfterHook) -> Simulation {
    Simulation::new(Box::new(ScriptedLesson {
        initial,
        rules: FailureRules::new(),
        after: Some(after),
    }))
}

/// Standalone ReplicaSet with `app=<name>` selector and matching template.
pub fn basic_replicaset(name: &str, replicas: u32, image: &str) -> ReplicaSet {
    let selector = labels(&[("app", name)]);
    ReplicaSet::new(
        name,
        ReplicaSetSpec {
            replicas,
            selector: selector.clone(),
            template: PodTemplate {
                labels: selector,
                spec: PodSpec {
                    image: image.to_string(),
                    ..PodSpec::default()
                },
            },
        },
    )
}

pub fn running_pods(state: &ClusterState) -> usize {
    state
        .pods
        .values()
        .filter(|p| p.status.phase == PodPhase::Running && !p.is_terminating())
        .count()
}

pub fn live_pods(state: &ClusterState) -> usize {
    state.pods.values().filter(|p| p.is_live()).count()
}

pub fn pods_on_node(state: &ClusterState, node: &str) -> Vec<String> {
    state
        .pods
        .values()
        .filter(|p| p.spec.node_name.as_deref() == Some(node) && !p.is_terminating())
        .map(|p| p.name.clone())
        .collect()
}
