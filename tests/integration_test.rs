mod common;

use common::{pods_on_node, running_pods, sim_with};
use kubesim::models::{labels, PodPhase, Service};
use kubesim::{ClusterState, Lesson, Simulation};

/// Node failure walkthrough: cordon takes a node out of service, its pods
/// fail over, and capacity comes back with uncordon.
#[test]
fn cordoned_node_fails_over_and_recovers() {
    let mut sim = sim_with(ClusterState::with_nodes(3, 6));
    sim.run_command("create deployment web --image=nginx:1.25 --replicas=6")
        .unwrap();
    sim.run_command("create service web --selector=app=web").unwrap();
    sim.run_ticks(2);

    let state = sim.state();
    assert_eq!(running_pods(state), 6);
    for node in ["node-1", "node-2", "node-3"] {
        assert_eq!(pods_on_node(state, node).len(), 2);
    }
    assert_eq!(state.services["web"].status.endpoints.len(), 6);

    sim.run_command("cordon node-3").unwrap();
    sim.tick();

    // Replacements land on the surviving nodes within the same tick.
    let state = sim.state();
    assert!(pods_on_node(state, "node-3").is_empty());
    assert_eq!(
        state.pods.values().filter(|p| p.is_live()).count(),
        6
    );
    assert_eq!(state.services["web"].status.endpoints.len(), 6);

    sim.tick();
    let nodes = sim.run_command("get nodes").unwrap();
    assert!(nodes.contains("NotReady,SchedulingDisabled"));

    sim.run_command("uncordon node-3").unwrap();
    sim.run_ticks(2);

    // Nothing rebalances on its own; node-3 is simply available again.
    let state = sim.state();
    assert_eq!(running_pods(state), 6);
    assert!(pods_on_node(state, "node-3").is_empty());
    assert!(state.nodes["node-3"].ready);
    assert!(state.deployments["web"].status.is_available());
    assert!(state.commands_used.contains("cordon"));
    assert!(state.commands_used.contains("uncordon"));
}

/// A converged cluster is a fixed point: ticking again changes nothing
/// observable.
#[test]
fn converged_state_is_stable_under_extra_ticks() {
    let mut sim = sim_with(ClusterState::with_nodes(3, 6));
    sim.run_command("create deployment web --image=nginx --replicas=4")
        .unwrap();
    sim.run_command("create service web --selector=app=web").unwrap();
    sim.run_command("create daemonset agent --image=agent:v1")
        .unwrap();
    sim.run_ticks(3);

    let digest = |state: &ClusterState| {
        let pods: Vec<(String, PodPhase, Option<String>, bool)> = state
            .pods
            .values()
            .map(|p| {
                (
                    p.name.clone(),
                    p.status.phase,
                    p.spec.node_name.clone(),
                    p.status.ready,
                )
            })
            .collect();
        (
            pods,
            state.services["web"].status.endpoints.clone(),
            state.replicasets.len(),
        )
    };

    let before = digest(sim.state());
    sim.run_ticks(2);
    assert_eq!(digest(sim.state()), before);
}

struct EndpointGoal;

impl Lesson for EndpointGoal {
    fn initial_state(&self) -> ClusterState {
        let mut state = ClusterState::with_nodes(2, 5);
        state
            .services
            .insert("web".to_string(), Service::new("web", labels(&[("app", "web")])));
        state
    }

    fn goal_check(&self, state: &ClusterState) -> bool {
        state.live_pods_matching(&labels(&[("app", "web")])).len() >= 2
            && state
                .services
                .get("web")
                .map(|s| s.status.endpoints.len() >= 2)
                .unwrap_or(false)
            && state.commands_used.contains("create")
    }
}

#[test]
fn lesson_goal_flips_once_the_cluster_matches() {
    let mut sim = Simulation::new(Box::new(EndpointGoal));
    assert!(!sim.goal_reached());

    sim.run_command("create deployment web --image=nginx --replicas=2")
        .unwrap();
    sim.run_ticks(2);
    assert!(sim.goal_reached());
}

/// Broken image, diagnose, fix, verify: the loop lessons are built around.
#[test]
fn diagnose_and_fix_a_crashlooping_deployment() {
    use common::sim_with_rules;
    use kubesim::models::FailureMode;
    use kubesim::FailureRules;

    let mut rules = FailureRules::new();
    rules.insert("shop:v2".to_string(), FailureMode::CrashLoopBackOff);
    let mut sim = sim_with_rules(ClusterState::with_nodes(2, 5), rules);

    sim.run_command("create deployment shop --image=shop:v2 --replicas=2")
        .unwrap();
    sim.run_ticks(2);

    // Pods exist but crashloop; the controllers do not replace them behind
    // the learner's back.
    let state = sim.state();
    assert_eq!(state.pods.len(), 2);
    assert!(state
        .pods
        .values()
        .all(|p| p.status.phase == PodPhase::CrashLoopBackOff));

    let pod = state.pods.values().next().unwrap().name.clone();
    let logs = sim.run_command(&format!("logs {}", pod)).unwrap();
    assert!(logs.contains("back-off"));

    sim.run_command("set-image deployment/shop shop=shop:v3")
        .unwrap();
    sim.run_ticks(6);

    let state = sim.state();
    assert_eq!(running_pods(state), 2);
    assert!(state.pods.values().all(|p| p.spec.image == "shop:v3"));
    assert_eq!(state.replicasets.len(), 1);
}
