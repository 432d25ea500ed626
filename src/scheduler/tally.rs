use serde::{Serialize, Serializer};

use crate::error::{Result, RunnerError};
use crate::scheduler::job::JobStatus;

/// Number of jobs in each status.
///
/// Counts only change through [`transition`](StatusTally::transition), so the
/// sum always equals the number of jobs the tally was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTally {
    counts: [usize; 4],
}

impl StatusTally {
    /// Tally for `total` jobs, all pending
    pub fn new(total: usize) -> Self {
        let mut tally = Self::default();
        tally.counts[Self::slot(JobStatus::Pending)] = total;
        tally
    }

    pub fn get(&self, status: JobStatus) -> usize {
        self.counts[Self::slot(status)]
    }

    /// Move one job from `from` to `to`.
    pub fn transition(&mut self, from: JobStatus, to: JobStatus) -> Result<()> {
        let from_slot = Self::slot(from);
        if self.counts[from_slot] == 0 {
            return Err(RunnerError::TallyUnderflow(from));
        }
        self.counts[from_slot] -= 1;
        self.counts[Self::slot(to)] += 1;
        Ok(())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Jobs that have not reached a terminal status
    pub fn remaining(&self) -> usize {
        self.get(JobStatus::Pending) + self.get(JobStatus::Running)
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobStatus, usize)> + '_ {
        JobStatus::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    fn slot(status: JobStatus) -> usize {
        match status {
            JobStatus::Pending => 0,
            JobStatus::Running => 1,
            JobStatus::Complete => 2,
            JobStatus::Error => 3,
        }
    }
}

impl Serialize for StatusTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(status, n)| (status.to_string(), n)))
    }
}
