mod common;

use common::sim_with;
use kubesim::models::{
    PersistentVolume, PersistentVolumeClaim, PvPhase, PvcPhase, StorageClass,
};
use kubesim::ClusterState;

#[test]
fn claim_binds_to_a_matching_preprovisioned_volume() {
    let mut state = ClusterState::new();
    state.persistent_volumes.insert(
        "pv-static".to_string(),
        PersistentVolume::new("pv-static", 10, None),
    );
    state.persistent_volume_claims.insert(
        "data".to_string(),
        PersistentVolumeClaim::new("data", 5, None),
    );

    let mut sim = sim_with(state);
    sim.tick();

    let state = sim.state();
    let claim = &state.persistent_volume_claims["data"];
    assert_eq!(claim.phase, PvcPhase::Bound);
    assert_eq!(claim.volume_name.as_deref(), Some("pv-static"));
    let pv = &state.persistent_volumes["pv-static"];
    assert_eq!(pv.phase, PvPhase::Bound);
    assert_eq!(pv.claim_ref.as_deref(), Some("data"));
}

#[test]
fn undersized_volume_is_not_bound() {
    let mut state = ClusterState::new();
    state.persistent_volumes.insert(
        "pv-small".to_string(),
        PersistentVolume::new("pv-small", 1, None),
    );
    state.persistent_volume_claims.insert(
        "data".to_string(),
        PersistentVolumeClaim::new("data", 5, None),
    );

    let mut sim = sim_with(state);
    sim.run_ticks(3);

    let state = sim.state();
    assert_eq!(state.persistent_volume_claims["data"].phase, PvcPhase::Pending);
    assert_eq!(state.persistent_volumes["pv-small"].phase, PvPhase::Available);
    // Reported once, not every tick.
    let warnings = state
        .events_for("PersistentVolumeClaim", "data")
        .iter()
        .filter(|e| e.reason == "FailedBinding")
        .count();
    assert_eq!(warnings, 1);
}

#[test]
fn storage_classes_must_match_for_static_binding() {
    let mut state = ClusterState::new();
    state.persistent_volumes.insert(
        "pv-fast".to_string(),
        PersistentVolume::new("pv-fast", 10, Some("fast".to_string())),
    );
    state.persistent_volume_claims.insert(
        "plain".to_string(),
        PersistentVolumeClaim::new("plain", 5, None),
    );
    state.persistent_volume_claims.insert(
        "speedy".to_string(),
        PersistentVolumeClaim::new("speedy", 5, Some("fast".to_string())),
    );

    let mut sim = sim_with(state);
    sim.tick();

    let state = sim.state();
    assert_eq!(state.persistent_volume_claims["plain"].phase, PvcPhase::Pending);
    assert_eq!(state.persistent_volume_claims["speedy"].phase, PvcPhase::Bound);
    assert_eq!(
        state.persistent_volume_claims["speedy"].volume_name.as_deref(),
        Some("pv-fast")
    );
}

#[test]
fn storage_class_provisions_a_volume_on_demand() {
    let mut state = ClusterState::new();
    state.storage_classes.insert(
        "standard".to_string(),
        StorageClass::new("standard", "sim.io/standard"),
    );
    state.persistent_volume_claims.insert(
        "data".to_string(),
        PersistentVolumeClaim::new("data", 8, Some("standard".to_string())),
    );

    let mut sim = sim_with(state);
    sim.tick();

    let state = sim.state();
    let claim = &state.persistent_volume_claims["data"];
    assert_eq!(claim.phase, PvcPhase::Bound);
    assert_eq!(claim.volume_name.as_deref(), Some("pv-data"));
    let pv = &state.persistent_volumes["pv-data"];
    assert_eq!(pv.phase, PvPhase::Bound);
    assert_eq!(pv.capacity_gi, 8);
    assert!(state
        .events_for("PersistentVolumeClaim", "data")
        .iter()
        .any(|e| e.reason == "Provisioned"));
}

#[test]
fn applied_manifests_provision_end_to_end() {
    let mut sim = sim_with(ClusterState::new());
    let output = sim
        .run_command(
            "apply\nkind: storageclass\nname: standard\nprovisioner: sim.io/standard\n---\nkind: pvc\nname: logs\nsize_gi: 2\nstorage_class: standard\n",
        )
        .unwrap();
    assert!(output.contains("storageclass/standard created"));
    assert!(output.contains("persistentvolumeclaim/logs created"));

    sim.tick();
    assert_eq!(
        sim.state().persistent_volume_claims["logs"].phase,
        PvcPhase::Bound
    );
    assert_eq!(
        sim.state().persistent_volumes["pv-logs"].capacity_gi,
        2
    );
}
