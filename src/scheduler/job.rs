use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};
use crate::scheduler::clock::Clock;
use crate::worker::{
    ExitCode, ProcessHandle, ProcessLauncher, LAUNCH_FAILURE_CODE, WAIT_FAILURE_CODE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Running,
    Complete,
    Error,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Complete,
        JobStatus::Error,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }

    /// Terminal status for a process exit code
    pub fn from_exit_code(code: ExitCode) -> Self {
        if code == 0 {
            JobStatus::Complete
        } else {
            JobStatus::Error
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Complete => write!(f, "Complete"),
            JobStatus::Error => write!(f, "Error"),
        }
    }
}

/// Why a job ended in [`JobStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process could not be created
    LaunchFailure,
    /// The process was started but its exit could not be observed
    WaitFailure,
    /// The command ran and returned a nonzero exit code
    CommandFailure,
}

/// Result of a non-blocking completion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Running,
    Exited(ExitCode),
}

#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    command: String,
    status: JobStatus,
    handle: Option<ProcessHandle>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    exit_code: Option<ExitCode>,
}

impl Job {
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            status: JobStatus::Pending,
            handle: None,
            started_at: None,
            ended_at: None,
            exit_code: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn handle(&self) -> Option<ProcessHandle> {
        self.handle
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn exit_code(&self) -> Option<ExitCode> {
        self.exit_code
    }

    /// Time between start and end, available once the job is terminal
    pub fn elapsed(&self) -> Option<Duration> {
        Some(self.ended_at? - self.started_at?)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.exit_code? {
            0 => None,
            LAUNCH_FAILURE_CODE => Some(FailureKind::LaunchFailure),
            WAIT_FAILURE_CODE => Some(FailureKind::WaitFailure),
            _ => Some(FailureKind::CommandFailure),
        }
    }

    /// Launch the job's command. Moves `Pending -> Running`, or straight to
    /// `Error` with [`LAUNCH_FAILURE_CODE`] if the process cannot be created.
    ///
    /// Returns the job's new status.
    pub fn start<L>(&mut self, launcher: &mut L, clock: &dyn Clock) -> Result<JobStatus>
    where
        L: ProcessLauncher + ?Sized,
    {
        self.expect_status(JobStatus::Pending, JobStatus::Running)?;

        let now = clock.now();
        self.started_at = Some(now);

        match launcher.launch(&self.id, &self.command) {
            Ok(handle) => {
                tracing::info!(job_id = %self.id, pid = handle.pid(), "Job started");
                self.handle = Some(handle);
                self.status = JobStatus::Running;
            }
            Err(e) => {
                tracing::error!(
                    job_id = %self.id,
                    command = %self.command,
                    error = %e,
                    "Job process could not be launched"
                );
                self.ended_at = Some(now);
                self.exit_code = Some(LAUNCH_FAILURE_CODE);
                self.status = JobStatus::Error;
            }
        }

        Ok(self.status)
    }

    /// Check whether the job's process has exited. Never blocks.
    pub fn poll<L>(&mut self, launcher: &mut L) -> Result<PollStatus>
    where
        L: ProcessLauncher + ?Sized,
    {
        let handle = match (self.status, self.handle) {
            (JobStatus::Running, Some(handle)) => handle,
            _ => {
                return Err(RunnerError::InvalidTransition {
                    job_id: self.id.clone(),
                    from: self.status,
                    to: JobStatus::Complete,
                })
            }
        };

        match launcher.try_wait(handle) {
            Ok(Some(code)) => Ok(PollStatus::Exited(code)),
            Ok(None) => {
                tracing::debug!(job_id = %self.id, pid = handle.pid(), "Job still running");
                Ok(PollStatus::Running)
            }
            Err(e) => {
                tracing::error!(
                    job_id = %self.id,
                    pid = handle.pid(),
                    error = %e,
                    "Failed to check job process"
                );
                Ok(PollStatus::Exited(WAIT_FAILURE_CODE))
            }
        }
    }

    /// Record the job's exit. Moves `Running -> Complete` for code 0 and
    /// `Running -> Error` otherwise.
    pub fn finish(&mut self, exit_code: ExitCode, clock: &dyn Clock) -> Result<JobStatus> {
        let status = JobStatus::from_exit_code(exit_code);
        self.expect_status(JobStatus::Running, status)?;

        self.status = status;
        self.exit_code = Some(exit_code);
        self.ended_at = Some(clock.now());
        self.handle = None;

        if status == JobStatus::Complete {
            tracing::info!(job_id = %self.id, exit_code, "Job completed");
        } else {
            tracing::warn!(job_id = %self.id, exit_code, "Job failed");
        }

        Ok(status)
    }

    /// One-line report of the job's status and run time
    pub fn describe(&self) -> String {
        let secs = self.elapsed().map(|d| d.num_seconds()).unwrap_or(0);
        format!(
            "Job: {:<20}Status: {:<15}ExecTime(secs): {:<12}",
            self.id,
            self.status.to_string(),
            secs
        )
    }

    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id.clone(),
            command: self.command.clone(),
            status: self.status,
            exit_code: self.exit_code,
            failure: self.failure_kind(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            elapsed_ms: self.elapsed().map(|d| d.num_milliseconds()),
        }
    }

    fn expect_status(&self, expected: JobStatus, to: JobStatus) -> Result<()> {
        if self.status != expected {
            return Err(RunnerError::InvalidTransition {
                job_id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Final record of a job, retrievable after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub command: String,
    pub status: JobStatus,
    pub exit_code: Option<ExitCode>,
    pub failure: Option<FailureKind>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_ms: Option<i64>,
}
