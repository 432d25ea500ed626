//! Job lifecycle and the scheduling loop.
//!
//! # Components
//!
//! - [`Job`]: One shell command plus its status, process handle and timing
//! - [`JobQueue`]: Jobs keyed by id, iterated in ascending id order
//! - [`StatusTally`]: Per-status job counts
//! - [`QueueRunner`]: Admission control and completion polling
//!
//! # Job Lifecycle
//!
//! ```text
//! Pending --start--> Running --finish(0)--> Complete
//!    |                  |
//!    |                  +----finish(n)--> Error
//!    +--launch failed---------------------> Error
//! ```
//!
//! Only the runner drives these transitions. Calling them out of order is an
//! error, never a silent no-op.
//!
//! # Scheduling Cycle
//!
//! 1. **Reap**: poll each running job without blocking and finalize exited ones
//! 2. **Admit**: start pending jobs, lowest id first, while below the limit
//! 3. **Idle**: sleep for the poll interval if any job is still unfinished
//!
//! A job that never exits keeps the run going forever; there is no timeout.

pub mod clock;
pub mod job;
pub mod queue;
pub mod report;
pub mod runner;
pub mod tally;

pub use clock::{Clock, SystemClock};
pub use job::{FailureKind, Job, JobStatus, JobSummary, PollStatus};
pub use queue::JobQueue;
pub use report::{RunReport, StatusSnapshot};
pub use runner::QueueRunner;
pub use tally::StatusTally;
