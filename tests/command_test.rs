mod common;

use common::{basic_replicaset, sim_with, sim_with_rules};
use kubesim::models::{FailureMode, PodPhase};
use kubesim::{ClusterState, FailureRules, SimError};

#[test]
fn unknown_verbs_are_rejected() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    assert!(matches!(
        sim.run_command("frobnicate foo"),
        Err(SimError::UnknownVerb(_))
    ));
}

#[test]
fn missing_target_fails_cleanly_and_leaves_a_trace() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    let err = sim.run_command("delete pod ghost").unwrap_err();
    assert!(matches!(err, SimError::NotFound { .. }));

    let state = sim.state();
    assert!(state
        .events_for("Pod", "ghost")
        .iter()
        .any(|e| e.reason == "NotFound"));
    // Failed commands do not count as used.
    assert!(!state.commands_used.contains("delete"));
}

#[test]
fn successful_verbs_are_tracked_for_goal_checks() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    sim.run_command("create pod web --image=nginx").unwrap();
    sim.run_command("get pods").unwrap();
    let used = &sim.state().commands_used;
    assert!(used.contains("create"));
    assert!(used.contains("get"));
    assert!(!used.contains("scale"));
}

#[test]
fn duplicate_create_is_an_error() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    sim.run_command("create pod web --image=nginx").unwrap();
    assert!(matches!(
        sim.run_command("create pod web --image=nginx"),
        Err(SimError::AlreadyExists { .. })
    ));
}

#[test]
fn get_prints_kubectl_shaped_tables() {
    let mut sim = sim_with(ClusterState::with_nodes(2, 5));
    sim.run_command("create pod web --image=nginx").unwrap();
    sim.tick();

    let pods = sim.run_command("get pods").unwrap();
    assert!(pods.contains("NAME"));
    assert!(pods.contains("web"));
    assert!(pods.contains("Running"));

    let nodes = sim.run_command("get nodes").unwrap();
    assert!(nodes.contains("node-1"));
    assert!(nodes.contains("Ready"));

    assert!(matches!(
        sim.run_command("get pods nope"),
        Err(SimError::NotFound { .. })
    ));
}

#[test]
fn apply_creates_then_configures() {
    let mut sim = sim_with(ClusterState::with_nodes(2, 5));
    let first = sim
        .run_command("apply\nkind: deployment\nname: web\nimage: nginx:1.0\nreplicas: 2\n---\nkind: service\nname: web-svc\nselector:\n  app: web\n")
        .unwrap();
    assert!(first.contains("deployment/web created"));
    assert!(first.contains("service/web-svc created"));

    let second = sim
        .run_command("apply\nkind: deployment\nname: web\nreplicas: 3\n")
        .unwrap();
    assert!(second.contains("deployment/web configured"));
    assert_eq!(sim.state().deployments["web"].spec.replicas, 3);
    assert!(sim.state().commands_used.contains("apply"));
}

#[test]
fn apply_without_a_body_is_invalid() {
    let mut sim = sim_with(ClusterState::new());
    assert!(matches!(
        sim.run_command("apply"),
        Err(SimError::InvalidCommand(_))
    ));
}

#[test]
fn label_adds_and_removes_keys() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    sim.run_command("create pod web --image=nginx").unwrap();

    sim.run_command("label pod web tier=frontend").unwrap();
    assert_eq!(
        sim.state().pods["web"].labels.get("tier").map(|s| s.as_str()),
        Some("frontend")
    );

    sim.run_command("label pod web tier-").unwrap();
    assert!(!sim.state().pods["web"].labels.contains_key("tier"));
}

#[test]
fn patching_a_broken_image_revives_the_pod() {
    let mut state = ClusterState::with_nodes(1, 5);
    state
        .replicasets
        .insert("web".to_string(), basic_replicaset("web", 1, "broken:v1"));
    let mut rules = FailureRules::new();
    rules.insert("broken:v1".to_string(), FailureMode::ImagePullError);
    let mut sim = sim_with_rules(state, rules);
    sim.tick();

    let pod_name = sim.state().pods.keys().next().unwrap().clone();
    assert_eq!(sim.state().pods[&pod_name].status.phase, PodPhase::Pending);

    sim.run_command(&format!("patch pod/{} --image=nginx:1.25", pod_name))
        .unwrap();
    sim.tick();

    let pod = &sim.state().pods[&pod_name];
    assert_eq!(pod.status.phase, PodPhase::Running);
    assert!(pod.spec.failure_mode.is_none());
    assert_eq!(pod.spec.image, "nginx:1.25");
    assert!(pod.spec.node_name.is_some());
}

#[test]
fn node_flags_follow_cordon_drain_uncordon() {
    let mut sim = sim_with(ClusterState::with_nodes(2, 5));

    sim.run_command("cordon node-1").unwrap();
    {
        let node = &sim.state().nodes["node-1"];
        assert!(node.unschedulable);
        assert!(!node.ready);
    }

    sim.run_command("uncordon node-1").unwrap();
    {
        let node = &sim.state().nodes["node-1"];
        assert!(!node.unschedulable);
        assert!(node.ready);
    }

    sim.run_command("drain node-2").unwrap();
    {
        let node = &sim.state().nodes["node-2"];
        assert!(node.unschedulable);
        assert!(node.draining);
        assert!(node.ready, "draining keeps the node Ready");
    }
}

#[test]
fn describe_includes_status_and_events() {
    let mut sim = sim_with(ClusterState::with_nodes(1, 5));
    sim.run_command("create pod web --image=nginx").unwrap();
    sim.tick();

    let out = sim.run_command("describe pod web").unwrap();
    assert!(out.contains("Name:     web"));
    assert!(out.contains("node-1"));
    assert!(out.contains("Events:"));
    assert!(out.contains("Scheduled"));
}

#[test]
fn logs_reflect_the_pod_phase() {
    let mut state = ClusterState::with_nodes(1, 5);
    state
        .replicasets
        .insert("bad".to_string(), basic_replicaset("bad", 1, "broken:v1"));
    let mut rules = FailureRules::new();
    rules.insert("broken:v1".to_string(), FailureMode::ImagePullError);
    let mut sim = sim_with_rules(state, rules);
    sim.run_command("create pod ok --image=nginx").unwrap();
    sim.tick();

    let healthy = sim.run_command("logs ok").unwrap();
    assert!(healthy.contains("nominal"));

    let broken = sim.state().pods.keys().find(|n| n.starts_with("bad-")).unwrap().clone();
    let stuck = sim.run_command(&format!("logs {}", broken)).unwrap();
    assert!(stuck.contains("cannot be pulled"));
}
