use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::scheduler::clock::{Clock, SystemClock};
use crate::scheduler::job::{JobStatus, JobSummary, PollStatus};
use crate::scheduler::queue::JobQueue;
use crate::scheduler::report::{RunReport, StatusSnapshot};
use crate::scheduler::tally::StatusTally;
use crate::worker::ProcessLauncher;

/// Runs every job in a [`JobQueue`] with bounded concurrency.
///
/// The runner owns the queue for its whole lifetime. Each scheduling cycle
/// reaps finished jobs, then admits pending jobs in ascending id order until
/// the concurrency limit is reached. Between cycles the runner sleeps for the
/// configured poll interval.
pub struct QueueRunner<L> {
    queue: JobQueue,
    launcher: L,
    config: RunnerConfig,
    clock: Box<dyn Clock>,
    tally: StatusTally,
    cycle: u64,
    snapshot_tx: watch::Sender<StatusSnapshot>,
}

impl<L: ProcessLauncher> QueueRunner<L> {
    /// Bind a runner to `queue`. Every job in the queue must still be pending.
    pub fn new(queue: JobQueue, launcher: L, config: RunnerConfig) -> Result<Self> {
        config.validate()?;

        if let Some(job) = queue.iter().find(|j| j.status() != JobStatus::Pending) {
            return Err(RunnerError::InvalidTransition {
                job_id: job.id().to_string(),
                from: job.status(),
                to: JobStatus::Running,
            });
        }

        let tally = StatusTally::new(queue.len());
        let (snapshot_tx, _) = watch::channel(StatusSnapshot {
            cycle: 0,
            total: tally.total(),
            remaining: tally.remaining(),
            tally,
        });

        Ok(Self {
            queue,
            launcher,
            config,
            clock: Box::new(SystemClock),
            tally,
            cycle: 0,
            snapshot_tx,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Run cycles until every job is `Complete` or `Error`.
    ///
    /// Job failures are recorded, never returned. An `Err` here means the
    /// runner's own bookkeeping was violated.
    pub async fn run(&mut self) -> Result<RunReport> {
        tracing::info!(
            queue = %self.queue.name(),
            jobs = self.tally.remaining(),
            concurrency = self.config.concurrency,
            "Beginning execution"
        );

        let started_at = self.clock.now();

        while self.remaining() > 0 {
            self.log_status();
            self.cycle()?;
            if self.remaining() > 0 {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        let ended_at = self.clock.now();
        self.log_status();

        let report = self.build_report(started_at, ended_at);
        tracing::info!(
            queue = %self.queue.name(),
            jobs = self.tally.total(),
            complete = report.status.complete(),
            error = report.status.error(),
            elapsed_secs = (ended_at - started_at).num_seconds(),
            "Completed execution"
        );

        Ok(report)
    }

    /// Run one scheduling cycle (reap, then admit) without sleeping.
    pub fn cycle(&mut self) -> Result<StatusSnapshot> {
        self.reap()?;
        self.admit()?;
        self.cycle += 1;

        let snapshot = self.snapshot();
        self.snapshot_tx.send_replace(snapshot);
        Ok(snapshot)
    }

    /// Poll every running job and finalize the ones that exited.
    fn reap(&mut self) -> Result<usize> {
        tracing::debug!(running = self.running(), "Checking running jobs");

        let clock: &dyn Clock = &*self.clock;
        let mut reaped = 0;

        for job in self.queue.iter_mut() {
            if job.status() != JobStatus::Running {
                continue;
            }
            if let PollStatus::Exited(code) = job.poll(&mut self.launcher)? {
                let status = job.finish(code, clock)?;
                self.tally.transition(JobStatus::Running, status)?;
                reaped += 1;
            }
        }

        Ok(reaped)
    }

    /// Start pending jobs, lowest id first, until the limit is reached.
    ///
    /// A job whose process cannot be launched goes straight to `Error` and
    /// does not take a slot.
    fn admit(&mut self) -> Result<usize> {
        let limit = self.config.concurrency;
        let clock: &dyn Clock = &*self.clock;
        let mut started = 0;

        for job in self.queue.iter_mut() {
            if self.tally.get(JobStatus::Running) >= limit {
                break;
            }
            if job.status() != JobStatus::Pending {
                continue;
            }
            let status = job.start(&mut self.launcher, clock)?;
            self.tally.transition(JobStatus::Pending, status)?;
            if status == JobStatus::Running {
                started += 1;
            }
        }

        if self.tally.get(JobStatus::Running) >= limit {
            tracing::debug!(limit, "At maximum capacity");
        }

        Ok(started)
    }

    /// Log aggregate counts, one line per status
    pub fn log_status(&self) {
        tracing::info!(
            concurrency = self.config.concurrency,
            remaining = self.remaining(),
            total = self.tally.total(),
            "Queue status"
        );
        for (status, count) in self.tally.iter() {
            tracing::info!("{:>20}{:>8}", status.to_string(), count);
        }
    }

    /// Log the one-line description of every job
    pub fn log_job_details(&self) {
        for job in self.queue.iter() {
            tracing::info!("{}", job.describe());
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            cycle: self.cycle,
            total: self.tally.total(),
            remaining: self.tally.remaining(),
            tally: self.tally,
        }
    }

    /// Receive the snapshot published at the end of every cycle
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn job_summaries(&self) -> Vec<JobSummary> {
        self.queue.iter().map(|j| j.summary()).collect()
    }

    fn build_report(&self, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> RunReport {
        RunReport {
            queue: self.queue.name().to_string(),
            concurrency: self.config.concurrency,
            started_at,
            ended_at,
            elapsed_ms: (ended_at - started_at).num_milliseconds(),
            status: self.snapshot(),
            jobs: self.job_summaries(),
        }
    }
}

impl<L> QueueRunner<L> {
    pub fn tally(&self) -> &StatusTally {
        &self.tally
    }

    /// Jobs not yet `Complete` or `Error`
    pub fn remaining(&self) -> usize {
        self.tally.remaining()
    }

    pub fn running(&self) -> usize {
        self.tally.get(JobStatus::Running)
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn into_queue(self) -> JobQueue {
        self.queue
    }
}

impl<L> std::fmt::Display for QueueRunner<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "QueueRunner: {} threads, {}/{} jobs remaining",
            self.config.concurrency,
            self.tally.remaining(),
            self.tally.total()
        )
    }
}
