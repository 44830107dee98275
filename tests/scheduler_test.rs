mod common;

use common::{basic_replicaset, pods_on_node, sim_with};
use kubesim::models::{
    labels, Node, Pod, PodPhase, PodSpec, Taint, TaintEffect, Toleration,
};
use kubesim::ClusterState;

#[test]
fn full_node_leaves_excess_pods_pending() {
    let mut state = ClusterState::with_nodes(1, 2);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 3, "nginx"));
    let mut sim = sim_with(state);
    sim.run_ticks(3);

    let state = sim.state();
    let pending: Vec<&Pod> = state
        .pods
        .values()
        .filter(|p| p.status.phase == PodPhase::Pending)
        .collect();
    assert_eq!(pending.len(), 1);
    let stuck = pending[0];
    assert_eq!(stuck.status.reason.as_deref(), Some("Unschedulable"));

    // The scheduling failure is reported once, not every tick.
    let warnings = state
        .events_for("Pod", &stuck.name)
        .iter()
        .filter(|e| e.reason == "FailedScheduling")
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn freed_capacity_unblocks_a_pending_pod() {
    let mut state = ClusterState::with_nodes(1, 2);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 3, "nginx"));
    let mut sim = sim_with(state);
    sim.run_ticks(2);

    sim.state_mut().nodes.get_mut("node-1").unwrap().capacity = 3;
    sim.tick();

    assert!(sim
        .state()
        .pods
        .values()
        .all(|p| p.status.phase == PodPhase::Running && p.status.reason.is_none()));
}

#[test]
fn ties_break_toward_the_smallest_node_name() {
    let mut sim = sim_with(ClusterState::with_nodes(2, 5));
    sim.run_command("create pod solo --image=nginx").unwrap();
    sim.tick();

    let pod = &sim.state().pods["solo"];
    assert_eq!(pod.spec.node_name.as_deref(), Some("node-1"));
}

#[test]
fn pods_land_on_the_node_with_most_free_capacity() {
    let mut state = ClusterState::with_nodes(2, 5);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 3, "nginx"));
    let mut sim = sim_with(state);
    sim.tick();

    // 2 on node-1, 1 on node-2 after alternating by free capacity.
    assert_eq!(pods_on_node(sim.state(), "node-1").len(), 2);
    assert_eq!(pods_on_node(sim.state(), "node-2").len(), 1);

    // The next pod goes to the emptier node.
    sim.run_command("create pod extra --image=nginx").unwrap();
    sim.tick();
    assert_eq!(
        sim.state().pods["extra"].spec.node_name.as_deref(),
        Some("node-2")
    );
}

#[test]
fn untolerated_taints_exclude_a_node() {
    let mut state = ClusterState::new();
    state.nodes.insert(
        "node-1".to_string(),
        Node::new("node-1", 4).with_taint(Taint::new("dedicated", "db", TaintEffect::NoSchedule)),
    );

    let plain = Pod::new(
        "plain".to_string(),
        labels(&[("app", "plain")]),
        PodSpec {
            image: "nginx".to_string(),
            ..PodSpec::default()
        },
        0,
    );
    let tolerant = Pod::new(
        "tolerant".to_string(),
        labels(&[("app", "tolerant")]),
        PodSpec {
            image: "nginx".to_string(),
            tolerations: vec![Toleration::equal("dedicated", "db")],
            ..PodSpec::default()
        },
        0,
    );
    state.pods.insert("plain".to_string(), plain);
    state.pods.insert("tolerant".to_string(), tolerant);

    let mut sim = sim_with(state);
    sim.tick();

    let state = sim.state();
    assert_eq!(state.pods["plain"].status.phase, PodPhase::Pending);
    assert_eq!(
        state.pods["plain"].status.reason.as_deref(),
        Some("Unschedulable")
    );
    assert_eq!(
        state.pods["tolerant"].spec.node_name.as_deref(),
        Some("node-1")
    );
}

#[test]
fn cordoned_node_receives_no_new_pods() {
    let mut sim = sim_with(ClusterState::with_nodes(2, 5));
    sim.run_command("cordon node-2").unwrap();
    sim.run_command("create pod solo --image=nginx").unwrap();
    sim.tick();

    assert_eq!(
        sim.state().pods["solo"].spec.node_name.as_deref(),
        Some("node-1")
    );
}
