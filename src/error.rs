use chrono::NaiveDate;
use thiserror::Error;

use crate::scheduler::JobStatus;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Duplicate job id: {0}")]
    DuplicateJob(String),

    #[error("Job queue is full ({0} jobs)")]
    QueueFull(usize),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid transition for job {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Status tally has no {0} jobs to move")]
    TallyUnderflow(JobStatus),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid job spec '{0}', expected ID=COMMAND")]
    InvalidJobSpec(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
