use std::fmt::Write;

use crate::error::SimError;
use crate::models::{Pod, PodPhase};
use crate::state::ClusterState;

/// Read-only verbs: get, describe, logs, get-events. All output is plain
/// text for the lesson UI to render verbatim.

fn phase_str(pod: &Pod) -> String {
    if pod.is_terminating() {
        return "Terminating".to_string();
    }
    match (&pod.status.phase, &pod.status.reason) {
        // Show the sharper reason where one exists, as kubectl does.
        (PodPhase::Pending, Some(reason)) => reason.clone(),
        (phase, _) => format!("{:?}", phase),
    }
}

pub fn get(state: &ClusterState, args: &[&str]) -> Result<String, SimError> {
    let kind = super::canonical_kind(args.first().ok_or_else(|| {
        SimError::InvalidCommand("get needs a resource kind".to_string())
    })?)?;
    let filter = args.get(1).map(|s| s.to_string());

    if let Some(name) = &filter {
        ensure_exists(state, kind, name)?;
    }

    let mut out = String::new();
    match kind {
        "Pod" => {
            let _ = writeln!(out, "{:<24} {:>5} {:<18} {:>8} {:<10}", "NAME", "READY", "STATUS", "RESTARTS", "NODE");
            for pod in state.pods.values() {
                if filter.as_deref().map(|f| f != pod.name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<24} {:>5} {:<18} {:>8} {:<10}",
                    pod.name,
                    if pod.status.ready { "1/1" } else { "0/1" },
                    phase_str(pod),
                    pod.status.restart_count,
                    pod.spec.node_name.as_deref().unwrap_or("<none>"),
                );
            }
        }
        "Node" => {
            let _ = writeln!(out, "{:<12} {:<28} {:>9}", "NAME", "STATUS", "PODS/CAP");
            for node in state.nodes.values() {
                if filter.as_deref().map(|f| f != node.name).unwrap_or(false) {
                    continue;
                }
                let mut status = if node.ready { "Ready" } else { "NotReady" }.to_string();
                if node.unschedulable {
                    status.push_str(",SchedulingDisabled");
                }
                let _ = writeln!(
                    out,
                    "{:<12} {:<28} {:>5}/{}",
                    node.name, status, node.allocated_pods, node.capacity
                );
            }
        }
        "Deployment" => {
            let _ = writeln!(out, "{:<20} {:>7} {:>10} {:>9}", "NAME", "READY", "UP-TO-DATE", "AVAILABLE");
            for d in state.deployments.values() {
                if filter.as_deref().map(|f| f != d.name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<20} {:>4}/{:<2} {:>10} {:>9}",
                    d.name,
                    d.status.ready_replicas,
                    d.spec.replicas,
                    d.status.updated_replicas,
                    if d.status.is_available() { "True" } else { "False" },
                );
            }
        }
        "ReplicaSet" => {
            let _ = writeln!(out, "{:<32} {:>7} {:>7} {:>5}", "NAME", "DESIRED", "CURRENT", "READY");
            for rs in state.replicasets.values() {
                if filter.as_deref().map(|f| f != rs.name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<32} {:>7} {:>7} {:>5}",
                    rs.name, rs.spec.replicas, rs.status.replicas, rs.status.ready_replicas
                );
            }
        }
        "Service" => {
            let _ = writeln!(out, "{:<20} {:<28} ENDPOINTS", "NAME", "SELECTOR");
            for svc in state.services.values() {
                if filter.as_deref().map(|f| f != svc.name).unwrap_or(false) {
                    continue;
                }
                let selector: Vec<String> = svc
                    .spec
                    .selector
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                let _ = writeln!(
                    out,
                    "{:<20} {:<28} {}",
                    svc.name,
                    selector.join(","),
                    svc.status.endpoints.join(",")
                );
            }
        }
        "Job" => {
            let _ = writeln!(out, "{:<20} {:<9} {:>11} {:>6}", "NAME", "STATUS", "COMPLETIONS", "FAILED");
            for job in state.jobs.values() {
                if filter.as_deref().map(|f| f != job.name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<20} {:<9} {:>8}/{:<2} {:>6}",
                    job.name,
                    format!("{:?}", job.status.phase),
                    job.status.succeeded,
                    job.spec.completions,
                    job.status.failed,
                );
            }
        }
        "PersistentVolumeClaim" => {
            let _ = writeln!(out, "{:<20} {:<8} {:<16} {:>5}", "NAME", "STATUS", "VOLUME", "SIZE");
            for pvc in state.persistent_volume_claims.values() {
                if filter.as_deref().map(|f| f != pvc.name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:<20} {:<8} {:<16} {:>4}G",
                    pvc.name,
                    format!("{:?}", pvc.phase),
                    pvc.volume_name.as_deref().unwrap_or("<none>"),
                    pvc.request_gi,
                );
            }
        }
        "Event" => return get_events(state, &args[1..]),
        _ => {
            for name in names_of(state, kind) {
                if filter.as_deref().map(|f| f != name).unwrap_or(false) {
                    continue;
                }
                let _ = writeln!(out, "{}/{}", kind.to_lowercase(), name);
            }
        }
    }
    Ok(out.trim_end().to_string())
}

pub fn describe(state: &ClusterState, args: &[&str]) -> Result<String, SimError> {
    if args.len() < 2 {
        return Err(SimError::InvalidCommand(
            "describe needs a resource kind and a name".to_string(),
        ));
    }
    let kind = super::canonical_kind(args[0])?;
    let name = args[1];
    ensure_exists(state, kind, name)?;

    let mut out = String::new();
    match kind {
        "Pod" => {
            let pod = &state.pods[name];
            let _ = writeln!(out, "Name:     {}", pod.name);
            let _ = writeln!(out, "Node:     {}", pod.spec.node_name.as_deref().unwrap_or("<none>"));
            let _ = writeln!(out, "Status:   {}", phase_str(pod));
            let _ = writeln!(out, "Ready:    {}", pod.status.ready);
            let _ = writeln!(out, "Restarts: {}", pod.status.restart_count);
            let _ = writeln!(out, "Image:    {}", pod.spec.image);
            let labels: Vec<String> = pod.labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            let _ = writeln!(out, "Labels:   {}", labels.join(","));
            if let Some(msg) = &pod.status.message {
                let _ = writeln!(out, "Message:  {}", msg);
            }
        }
        "Node" => {
            let node = &state.nodes[name];
            let _ = writeln!(out, "Name:          {}", node.name);
            let _ = writeln!(out, "Ready:         {}", node.ready);
            let _ = writeln!(out, "Unschedulable: {}", node.unschedulable);
            let _ = writeln!(out, "Capacity:      {} pods", node.capacity);
            let _ = writeln!(out, "Allocated:     {} pods", node.allocated_pods);
            for taint in &node.taints {
                let _ = writeln!(out, "Taint:         {}={}:{:?}", taint.key, taint.value, taint.effect);
            }
        }
        "Deployment" => {
            let d = &state.deployments[name];
            let _ = writeln!(out, "Name:     {}", d.name);
            let _ = writeln!(out, "Replicas: {} desired | {} ready | {} updated", d.spec.replicas, d.status.ready_replicas, d.status.updated_replicas);
            let _ = writeln!(out, "Image:    {}", d.spec.template.spec.image);
            for c in &d.status.conditions {
                let _ = writeln!(
                    out,
                    "Condition: {}={} ({}) {}",
                    c.condition_type,
                    if c.status { "True" } else { "False" },
                    c.reason,
                    c.message
                );
            }
        }
        "Service" => {
            let svc = &state.services[name];
            let selector: Vec<String> = svc.spec.selector.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            let _ = writeln!(out, "Name:      {}", svc.name);
            let _ = writeln!(out, "Selector:  {}", selector.join(","));
            let _ = writeln!(out, "Endpoints: {}", svc.status.endpoints.join(","));
        }
        "Job" => {
            let job = &state.jobs[name];
            let _ = writeln!(out, "Name:        {}", job.name);
            let _ = writeln!(out, "Status:      {:?}", job.status.phase);
            let _ = writeln!(out, "Completions: {}/{}", job.status.succeeded, job.spec.completions);
            let _ = writeln!(out, "Failed:      {} (backoffLimit {})", job.status.failed, job.spec.backoff_limit);
        }
        "PodDisruptionBudget" => {
            let pdb = &state.pdbs[name];
            let _ = writeln!(out, "Name:            {}", pdb.name);
            if let Some(max) = pdb.spec.max_unavailable {
                let _ = writeln!(out, "Max unavailable: {}", max);
            }
            if let Some(min) = pdb.spec.min_available {
                let _ = writeln!(out, "Min available:   {}", min);
            }
            let _ = writeln!(out, "Blocked:         {}", pdb.status.disruptions_blocked);
        }
        _ => {
            let _ = writeln!(out, "Name: {}", name);
        }
    }

    let events = state.events_for(kind, name);
    if !events.is_empty() {
        let _ = writeln!(out, "Events:");
        for e in events {
            let _ = writeln!(
                out,
                "  tick {:>3}  {:<7?} {:<20} {}",
                e.tick, e.event_type, e.reason, e.message
            );
        }
    }
    Ok(out.trim_end().to_string())
}

pub fn logs(state: &ClusterState, args: &[&str]) -> Result<String, SimError> {
    let name = args
        .first()
        .ok_or_else(|| SimError::InvalidCommand("logs needs a pod name".to_string()))?;
    let pod = state
        .pods
        .get(*name)
        .ok_or_else(|| SimError::not_found("Pod", name))?;

    let lines = match (&pod.status.phase, pod.status.reason.as_deref()) {
        (PodPhase::Pending, Some("ImagePullError")) => format!(
            "Error from server: container in pod {} is waiting to start: image \"{}\" cannot be pulled",
            pod.name, pod.spec.image
        ),
        (PodPhase::Pending, _) => format!("Error from server: pod {} has not started yet", pod.name),
        (PodPhase::CrashLoopBackOff, _) => format!(
            "panic: fatal error on startup\nback-off restarting failed container in pod {}",
            pod.name
        ),
        (PodPhase::OomKilled, _) => {
            format!("out of memory: killed process running in pod {}", pod.name)
        }
        (PodPhase::Failed, _) => format!(
            "container exited: {}",
            pod.status.message.as_deref().unwrap_or("unknown failure")
        ),
        _ => format!("{} listening, all systems nominal", pod.spec.image),
    };
    Ok(lines)
}

pub fn get_events(state: &ClusterState, args: &[&str]) -> Result<String, SimError> {
    let kind = match args.first() {
        Some(k) => Some(super::canonical_kind(k)?),
        None => None,
    };
    let name = args.get(1).map(|s| s.to_string());

    let mut out = String::new();
    for e in &state.events {
        if kind.map(|k| e.object_kind != k).unwrap_or(false) {
            continue;
        }
        if name.as_deref().map(|n| e.object_name != n).unwrap_or(false) {
            continue;
        }
        let _ = writeln!(
            out,
            "tick {:>3}  {:<7?} {:<22} {}/{}: {}",
            e.tick,
            e.event_type,
            e.reason,
            e.object_kind.to_lowercase(),
            e.object_name,
            e.message
        );
    }
    Ok(out.trim_end().to_string())
}

fn names_of(state: &ClusterState, kind: &str) -> Vec<String> {
    match kind {
        "Namespace" => state.namespaces.keys().cloned().collect(),
        "ConfigMap" => state.configmaps.keys().cloned().collect(),
        "DaemonSet" => state.daemonsets.keys().cloned().collect(),
        "CronJob" => state.cronjobs.keys().cloned().collect(),
        "StatefulSet" => state.statefulsets.keys().cloned().collect(),
        "HorizontalPodAutoscaler" => state.hpas.keys().cloned().collect(),
        "PersistentVolume" => state.persistent_volumes.keys().cloned().collect(),
        "StorageClass" => state.storage_classes.keys().cloned().collect(),
        "PodDisruptionBudget" => state.pdbs.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

fn ensure_exists(state: &ClusterState, kind: &str, name: &str) -> Result<(), SimError> {
    let exists = match kind {
        "Pod" => state.pods.contains_key(name),
        "Node" => state.nodes.contains_key(name),
        "Deployment" => state.deployments.contains_key(name),
        "ReplicaSet" => state.replicasets.contains_key(name),
        "Service" => state.services.contains_key(name),
        "DaemonSet" => state.daemonsets.contains_key(name),
        "Job" => state.jobs.contains_key(name),
        "CronJob" => state.cronjobs.contains_key(name),
        "StatefulSet" => state.statefulsets.contains_key(name),
        "HorizontalPodAutoscaler" => state.hpas.contains_key(name),
        "Namespace" => state.namespaces.contains_key(name),
        "ConfigMap" => state.configmaps.contains_key(name),
        "PersistentVolumeClaim" => state.persistent_volume_claims.contains_key(name),
        "PersistentVolume" => state.persistent_volumes.contains_key(name),
        "StorageClass" => state.storage_classes.contains_key(name),
        "PodDisruptionBudget" => state.pdbs.contains_key(name),
        "Event" => true,
        _ => false,
    };
    if exists {
        Ok(())
    } else {
        Err(SimError::not_found(kind, name))
    }
}
