mod common;

use common::sim_with;
use kubesim::models::{labels, Pod, PodPhase, PodSpec, Probe, Service};
use kubesim::ClusterState;

fn probed_pod(name: &str, spec: PodSpec) -> Pod {
    Pod::new(name.to_string(), labels(&[("app", "web")]), spec, 0)
}

#[test]
fn readiness_probe_delays_endpoint_membership() {
    let mut state = ClusterState::with_nodes(1, 5);
    state.pods.insert(
        "slow".to_string(),
        probed_pod(
            "slow",
            PodSpec {
                image: "nginx".to_string(),
                readiness_probe: Some(Probe {
                    ready_after_ticks: 2,
                }),
                ..PodSpec::default()
            },
        ),
    );
    state
        .services
        .insert("web".to_string(), Service::new("web", labels(&[("app", "web")])));

    let mut sim = sim_with(state);

    // Scheduled on tick 1 but not ready until the probe passes.
    sim.tick();
    assert_eq!(sim.state().pods["slow"].status.phase, PodPhase::Running);
    assert!(!sim.state().pods["slow"].status.ready);
    assert!(sim.state().services["web"].status.endpoints.is_empty());

    sim.tick();
    assert!(!sim.state().pods["slow"].status.ready);
    assert!(sim.state().services["web"].status.endpoints.is_empty());

    sim.tick();
    assert!(sim.state().pods["slow"].status.ready);
    assert_eq!(
        sim.state().services["web"].status.endpoints,
        vec!["slow".to_string()]
    );
}

#[test]
fn liveness_probe_kills_a_pod_that_never_becomes_ready() {
    let mut state = ClusterState::with_nodes(1, 5);
    state.pods.insert(
        "wedged".to_string(),
        probed_pod(
            "wedged",
            PodSpec {
                image: "nginx".to_string(),
                readiness_probe: Some(Probe {
                    ready_after_ticks: 10,
                }),
                liveness_probe: Some(Probe {
                    ready_after_ticks: 0,
                }),
                ..PodSpec::default()
            },
        ),
    );

    let mut sim = sim_with(state);
    sim.run_ticks(4);

    let pod = &sim.state().pods["wedged"];
    assert_eq!(pod.status.phase, PodPhase::CrashLoopBackOff);
    assert_eq!(pod.status.restart_count, 1);
    assert!(sim
        .state()
        .events_for("Pod", "wedged")
        .iter()
        .any(|e| e.reason == "Unhealthy"));

    // Already killed; the count does not keep climbing.
    sim.run_ticks(3);
    assert_eq!(sim.state().pods["wedged"].status.restart_count, 1);
}

#[test]
fn startup_probe_holds_the_liveness_probe_off() {
    let mut state = ClusterState::with_nodes(1, 5);
    state.pods.insert(
        "starter".to_string(),
        probed_pod(
            "starter",
            PodSpec {
                image: "nginx".to_string(),
                readiness_probe: Some(Probe {
                    ready_after_ticks: 4,
                }),
                liveness_probe: Some(Probe {
                    ready_after_ticks: 0,
                }),
                startup_probe: Some(Probe {
                    ready_after_ticks: 5,
                }),
                ..PodSpec::default()
            },
        ),
    );

    let mut sim = sim_with(state);
    sim.run_ticks(6);

    let pod = &sim.state().pods["starter"];
    assert_eq!(pod.status.phase, PodPhase::Running);
    assert!(pod.status.ready);
    assert_eq!(pod.status.restart_count, 0);
}
