use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scheduler::job::{JobStatus, JobSummary};
use crate::scheduler::tally::StatusTally;

/// Aggregate job counts at a cycle boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Number of completed scheduling cycles
    pub cycle: u64,
    pub total: usize,
    pub remaining: usize,
    pub tally: StatusTally,
}

impl StatusSnapshot {
    pub fn count(&self, status: JobStatus) -> usize {
        self.tally.get(status)
    }

    pub fn pending(&self) -> usize {
        self.count(JobStatus::Pending)
    }

    pub fn running(&self) -> usize {
        self.count(JobStatus::Running)
    }

    pub fn complete(&self) -> usize {
        self.count(JobStatus::Complete)
    }

    pub fn error(&self) -> usize {
        self.count(JobStatus::Error)
    }
}

impl std::fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} jobs remaining (pending={} running={} complete={} error={})",
            self.remaining,
            self.total,
            self.pending(),
            self.running(),
            self.complete(),
            self.error()
        )
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub queue: String,
    pub concurrency: usize,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub status: StatusSnapshot,
    pub jobs: Vec<JobSummary>,
}

impl RunReport {
    /// True only when every job finished and none of them failed
    pub fn is_success(&self) -> bool {
        self.status.remaining == 0 && self.status.error() == 0
    }

    pub fn failed_jobs(&self) -> impl Iterator<Item = &JobSummary> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Error)
    }

    pub fn job(&self, id: &str) -> Option<&JobSummary> {
        self.jobs.iter().find(|j| j.id == id)
    }
}
