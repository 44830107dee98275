mod common;

use common::{basic_replicaset, live_pods, sim_with};
use kubesim::models::PodPhase;
use kubesim::ClusterState;

#[test]
fn replicaset_creates_pods_up_to_desired() {
    let mut state = ClusterState::with_nodes(2, 5);
    let rs = basic_replicaset("web", 3, "nginx");
    state.replicasets.insert("web".to_string(), rs);

    let mut sim = sim_with(state);
    sim.tick();

    let state = sim.state();
    assert_eq!(live_pods(state), 3);
    assert!(state
        .pods
        .values()
        .all(|p| p.status.phase == PodPhase::Running));
    assert_eq!(state.replicasets["web"].status.replicas, 3);
}

#[test]
fn replicaset_converges_within_one_tick_of_scale_change() {
    let mut state = ClusterState::with_nodes(2, 5);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 3, "nginx"));
    let mut sim = sim_with(state);
    sim.tick();

    sim.state_mut()
        .replicasets
        .get_mut("web")
        .unwrap()
        .spec
        .replicas = 5;
    sim.tick();
    assert_eq!(live_pods(sim.state()), 5);

    sim.state_mut()
        .replicasets
        .get_mut("web")
        .unwrap()
        .spec
        .replicas = 1;
    sim.tick();
    assert_eq!(live_pods(sim.state()), 1);

    // Terminating pods are gone one tick later.
    sim.tick();
    assert_eq!(sim.state().pods.len(), 1);
}

#[test]
fn scale_down_deletes_newest_pods_first() {
    let mut state = ClusterState::with_nodes(2, 10);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 2, "nginx"));
    let mut sim = sim_with(state);
    sim.tick();

    let original: Vec<String> = sim.state().pods.keys().cloned().collect();

    sim.state_mut()
        .replicasets
        .get_mut("web")
        .unwrap()
        .spec
        .replicas = 3;
    sim.tick();

    sim.state_mut()
        .replicasets
        .get_mut("web")
        .unwrap()
        .spec
        .replicas = 2;
    sim.run_ticks(2);

    // The late-added pod was the one removed.
    let survivors: Vec<String> = sim.state().pods.keys().cloned().collect();
    assert_eq!(survivors, original);
}

#[test]
fn removing_matching_label_orphans_pod_without_deleting_it() {
    let mut state = ClusterState::with_nodes(2, 10);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 2, "nginx"));
    let mut sim = sim_with(state);
    sim.tick();

    let orphan = sim.state().pods.keys().next().unwrap().clone();
    sim.run_command(&format!("label pod {} app-", orphan)).unwrap();
    sim.tick();

    let state = sim.state();
    // Orphan still exists and still runs, and the set backfilled it.
    assert!(state.pods.contains_key(&orphan));
    assert_eq!(state.pods[&orphan].status.phase, PodPhase::Running);
    assert_eq!(state.pods.len(), 3);
    assert_eq!(state.replicasets["web"].status.replicas, 2);
}

#[test]
fn failure_rules_preset_pod_status_at_creation() {
    use kubesim::models::FailureMode;
    use kubesim::FailureRules;

    let mut state = ClusterState::with_nodes(1, 10);
    state
        .replicasets
        .insert("bad".to_string(), basic_replicaset("bad", 1, "broken:v1"));
    let mut rules = FailureRules::new();
    rules.insert("broken:v1".to_string(), FailureMode::ImagePullError);

    let mut sim = common::sim_with_rules(state, rules);
    sim.run_ticks(2);

    let pod = sim.state().pods.values().next().unwrap();
    assert_eq!(pod.status.phase, PodPhase::Pending);
    assert_eq!(pod.status.reason.as_deref(), Some("ImagePullError"));
    // The scheduler leaves fault-injected pods alone.
    assert!(pod.spec.node_name.is_none());
}
