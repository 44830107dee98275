mod common;

use common::{pods_on_node, sim_with};
use kubesim::models::{
    labels, DaemonSet, DaemonSetSpec, Node, OwnerKind, PodSpec, PodTemplate, Taint, TaintEffect,
    Toleration,
};
use kubesim::ClusterState;

fn agent_daemonset(tolerations: Vec<Toleration>) -> DaemonSet {
    let selector = labels(&[("app", "agent")]);
    DaemonSet::new(
        "agent",
        DaemonSetSpec {
            selector: selector.clone(),
            template: PodTemplate {
                labels: selector,
                spec: PodSpec {
                    image: "agent:v1".to_string(),
                    tolerations,
                    ..PodSpec::default()
                },
            },
        },
    )
}

#[test]
fn one_pod_lands_on_every_ready_node() {
    let mut sim = sim_with(ClusterState::with_nodes(3, 4));
    sim.run_command("create daemonset agent --image=agent:v1")
        .unwrap();
    sim.tick();

    let state = sim.state();
    for node in ["node-1", "node-2", "node-3"] {
        assert_eq!(pods_on_node(state, node).len(), 1, "missing pod on {}", node);
    }
    let ds = &state.daemonsets["agent"];
    assert_eq!(ds.status.desired, 3);
    assert_eq!(ds.status.current, 3);
    assert_eq!(ds.status.ready, 3);
}

#[test]
fn cordon_removes_and_uncordon_restores_coverage() {
    let mut sim = sim_with(ClusterState::with_nodes(3, 4));
    sim.run_command("create daemonset agent --image=agent:v1")
        .unwrap();
    sim.tick();

    sim.run_command("cordon node-3").unwrap();
    sim.run_ticks(2);

    let state = sim.state();
    assert!(pods_on_node(state, "node-3").is_empty());
    assert_eq!(state.daemonsets["agent"].status.desired, 2);
    assert_eq!(state.daemonsets["agent"].status.current, 2);

    sim.run_command("uncordon node-3").unwrap();
    sim.tick();

    let state = sim.state();
    assert_eq!(pods_on_node(state, "node-3").len(), 1);
    assert_eq!(state.daemonsets["agent"].status.desired, 3);
    assert_eq!(state.daemonsets["agent"].status.current, 3);
}

#[test]
fn tainted_node_is_covered_only_with_a_toleration() {
    let mut state = ClusterState::new();
    state.nodes.insert("node-1".to_string(), Node::new("node-1", 4));
    state.nodes.insert(
        "node-2".to_string(),
        Node::new("node-2", 4).with_taint(Taint::new("dedicated", "db", TaintEffect::NoSchedule)),
    );
    state
        .daemonsets
        .insert("agent".to_string(), agent_daemonset(Vec::new()));

    let mut sim = sim_with(state);
    sim.tick();
    assert_eq!(sim.state().daemonsets["agent"].status.desired, 1);
    assert!(pods_on_node(sim.state(), "node-2").is_empty());

    sim.state_mut()
        .daemonsets
        .get_mut("agent")
        .unwrap()
        .spec
        .template
        .spec
        .tolerations = vec![Toleration::exists("dedicated")];
    sim.tick();

    assert_eq!(sim.state().daemonsets["agent"].status.desired, 2);
    assert_eq!(pods_on_node(sim.state(), "node-2").len(), 1);
}

#[test]
fn drain_leaves_daemonset_pods_in_place() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 4));
    sim.run_command("create daemonset agent --image=agent:v1")
        .unwrap();
    sim.run_command("create pod lonely --image=nginx").unwrap();
    sim.tick();

    sim.run_command("drain node-1").unwrap();
    sim.run_ticks(2);

    let state = sim.state();
    assert!(!state.pods.contains_key("lonely"));
    let survivors = pods_on_node(state, "node-1");
    assert_eq!(survivors.len(), 1);
    assert!(state.pods[&survivors[0]].owned_by(OwnerKind::DaemonSet, "agent"));
    assert!(!state.nodes["node-1"].draining);
    assert!(state
        .events_for("Node", "node-1")
        .iter()
        .any(|e| e.reason == "Drained"));
}
