use tracing::{info, warn};

use crate::models::{EventType, Job, JobPhase, OwnerKind, OwnerRef, PodPhase};
use crate::state::{ClusterState, FailureRules};

/// Jobs run pods to completion; CronJobs mint Jobs on a tick schedule.
/// CronJobs are handled first so a Job due this tick starts this tick.
pub struct JobController;

impl JobController {
    pub fn new() -> Self {
        JobController
    }

    pub fn reconcile(&self, state: &mut ClusterState, rules: &FailureRules) {
        self.reconcile_cronjobs(state);
        let names: Vec<String> = state.jobs.keys().cloned().collect();
        for job_name in names {
            self.reconcile_job(state, &job_name, rules);
        }
    }

    fn reconcile_cronjobs(&self, state: &mut ClusterState) {
        let tick = state.tick;
        let names: Vec<String> = state.cronjobs.keys().cloned().collect();
        for cj_name in names {
            let (due, spec) = match state.cronjobs.get(&cj_name) {
                Some(cj) => {
                    let since = cj
                        .status
                        .last_scheduled_tick
                        .unwrap_or(cj.tick_created);
                    (tick >= since + cj.spec.every_ticks, cj.spec.job_template.clone())
                }
                None => continue,
            };
            if !due {
                continue;
            }
            let job_name = format!("{}-{}", cj_name, tick);
            if state.jobs.contains_key(&job_name) {
                continue;
            }
            let mut job = Job::new(&job_name, spec);
            job.labels
                .insert("cronjob".to_string(), cj_name.clone());
            info!("cronjob {} spawned job {}", cj_name, job_name);
            state.record_event(
                EventType::Normal,
                "SuccessfulCreate",
                "CronJob",
                &cj_name,
                format!("created job {}", job_name),
            );
            state.jobs.insert(job_name, job);
            if let Some(cj) = state.cronjobs.get_mut(&cj_name) {
                cj.status.last_scheduled_tick = Some(tick);
                cj.status.jobs_created += 1;
            }
        }
    }

    fn reconcile_job(&self, state: &mut ClusterState, job_name: &str, rules: &FailureRules) {
        let (uid, completions, parallelism, backoff_limit, template, finished) =
            match state.jobs.get(job_name) {
                Some(j) => (
                    j.uid.clone(),
                    j.spec.completions,
                    j.spec.parallelism,
                    j.spec.backoff_limit,
                    j.spec.template.clone(),
                    j.is_finished(),
                ),
                None => return,
            };
        if finished {
            return;
        }

        // Count each finished pod exactly once: counting marks it
        // terminating, and terminating pods are skipped here.
        let succeeded_pods: Vec<String> = state
            .pods
            .values()
            .filter(|p| {
                p.owned_by(OwnerKind::Job, job_name)
                    && !p.is_terminating()
                    && p.status.phase == PodPhase::Succeeded
            })
            .map(|p| p.name.clone())
            .collect();
        for pod_name in succeeded_pods {
            state.mark_pod_terminating(&pod_name);
            if let Some(job) = state.jobs.get_mut(job_name) {
                job.status.succeeded += 1;
            }
            state.record_event(
                EventType::Normal,
                "Completed",
                "Job",
                job_name,
                format!("pod {} succeeded", pod_name),
            );
        }

        let failed_pods: Vec<String> = state
            .pods
            .values()
            .filter(|p| {
                p.owned_by(OwnerKind::Job, job_name)
                    && !p.is_terminating()
                    && p.status.phase == PodPhase::Failed
            })
            .map(|p| p.name.clone())
            .collect();
        for pod_name in failed_pods {
            state.mark_pod_terminating(&pod_name);
            if let Some(job) = state.jobs.get_mut(job_name) {
                job.status.failed += 1;
            }
            warn!("job {} pod {} failed", job_name, pod_name);
            state.record_event(
                EventType::Warning,
                "FailedPod",
                "Job",
                job_name,
                format!("pod {} failed", pod_name),
            );
        }

        let (succeeded, failed) = match state.jobs.get(job_name) {
            Some(j) => (j.status.succeeded, j.status.failed),
            None => return,
        };

        if succeeded >= completions {
            self.finish(state, job_name, JobPhase::Complete);
            state.record_event(
                EventType::Normal,
                "Completed",
                "Job",
                job_name,
                format!("job completed: {} of {} succeeded", succeeded, completions),
            );
            return;
        }
        if failed > backoff_limit {
            self.finish(state, job_name, JobPhase::Failed);
            state.record_event(
                EventType::Warning,
                "BackoffLimitExceeded",
                "Job",
                job_name,
                format!("job failed: {} pod failures exceed backoffLimit {}", failed, backoff_limit),
            );
            return;
        }

        // Top up to parallelism, never overshooting remaining completions.
        let active = state
            .pods
            .values()
            .filter(|p| p.is_live() && p.owned_by(OwnerKind::Job, job_name))
            .count() as u32;
        let remaining = completions - succeeded;
        let want = parallelism.min(remaining);
        let need = want.saturating_sub(active);
        for _ in 0..need {
            let mut template = template.clone();
            template
                .labels
                .insert("job-name".to_string(), job_name.to_string());
            let owner = OwnerRef {
                kind: OwnerKind::Job,
                name: job_name.to_string(),
                uid: uid.clone(),
            };
            let pod_name = state.spawn_pod(job_name, &template, Some(owner), rules);
            info!("job {} created pod {}", job_name, pod_name);
            if let Some(job) = state.jobs.get_mut(job_name) {
                job.status.pods_created += 1;
            }
        }

        if let Some(job) = state.jobs.get_mut(job_name) {
            job.status.active = active + need;
        }
    }

    fn finish(&self, state: &mut ClusterState, job_name: &str, phase: JobPhase) {
        let leftovers: Vec<String> = state
            .pods
            .values()
            .filter(|p| p.is_live() && p.owned_by(OwnerKind::Job, job_name))
            .map(|p| p.name.clone())
            .collect();
        for pod_name in leftovers {
            state.mark_pod_terminating(&pod_name);
        }
        if let Some(job) = state.jobs.get_mut(job_name) {
            job.status.phase = phase;
            job.status.active = 0;
        }
    }
}

impl Default for JobController {
    fn default() -> Self {
        Self::new()
    }
}
