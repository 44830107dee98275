use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::labels::Labels;
use super::pod::PodTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Running,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub completions: u32,
    pub parallelism: u32,
    /// Failed pods beyond this count mark the whole Job Failed.
    pub backoff_limit: u32,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub phase: JobPhase,
    pub succeeded: u32,
    pub failed: u32,
    pub active: u32,
    /// Total pods ever created for this Job, also used to name them.
    pub pods_created: u32,
}

impl Default for JobStatus {
    fn default() -> Self {
        Self {
            phase: JobPhase::Running,
            succeeded: 0,
            failed: 0,
            active: 0,
            pods_created: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
    pub spec: JobSpec,
    pub status: JobStatus,
}

impl Job {
    pub fn new(name: &str, spec: JobSpec) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
            spec,
            status: JobStatus::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status.phase, JobPhase::Complete | JobPhase::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJobSpec {
    /// Fire a Job every N ticks. Simulated stand-in for a cron expression.
    pub every_ticks: u64,
    pub job_template: JobSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronJobStatus {
    pub last_scheduled_tick: Option<u64>,
    pub jobs_created: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronJob {
    pub uid: String,
    pub name: String,
    pub labels: Labels,
    pub creation_timestamp: DateTime<Utc>,
    /// Tick the CronJob entered the cluster; schedules count from here.
    pub tick_created: u64,
    pub spec: CronJobSpec,
    pub status: CronJobStatus,
}

impl CronJob {
    pub fn new(name: &str, spec: CronJobSpec, tick: u64) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            labels: Labels::new(),
            creation_timestamp: Utc::now(),
            tick_created: tick,
            spec,
            status: CronJobStatus::default(),
        }
    }
}
