use std::collections::BTreeMap;

use crate::error::{Result, RunnerError};
use crate::scheduler::job::{Job, JobStatus};

const DEFAULT_MAX_JOBS: usize = 10_000;

/// Named set of jobs keyed by job id.
///
/// Iteration is always in ascending id order, which is also the order the
/// runner admits pending jobs in.
#[derive(Debug)]
pub struct JobQueue {
    name: String,
    jobs: BTreeMap<String, Job>,
    max_jobs: usize,
}

impl JobQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_MAX_JOBS)
    }

    pub fn with_capacity(name: impl Into<String>, max_jobs: usize) -> Self {
        Self {
            name: name.into(),
            jobs: BTreeMap::new(),
            max_jobs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a job. Fails if the id is already taken or the queue is at capacity.
    pub fn add(&mut self, job: Job) -> Result<()> {
        if self.jobs.contains_key(job.id()) {
            return Err(RunnerError::DuplicateJob(job.id().to_string()));
        }
        if self.jobs.len() >= self.max_jobs {
            return Err(RunnerError::QueueFull(self.max_jobs));
        }
        self.jobs.insert(job.id().to_string(), job);
        Ok(())
    }

    /// Get a job by ID
    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Like [`get`](Self::get), but a missing job is an error
    pub fn require(&self, id: &str) -> Result<&Job> {
        self.get(id)
            .ok_or_else(|| RunnerError::JobNotFound(id.to_string()))
    }

    /// All jobs in ascending id order. Each call starts a fresh traversal.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Job> {
        self.jobs.values_mut()
    }

    /// Job ids in ascending order
    pub fn ids(&self) -> Vec<&str> {
        self.jobs.keys().map(String::as_str).collect()
    }

    /// Number of jobs currently in `status`
    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.values().filter(|j| j.status() == status).count()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Returns true if the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.max_jobs
    }
}

impl std::fmt::Display for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Queue:{},{} jobs", self.name, self.jobs.len())
    }
}
