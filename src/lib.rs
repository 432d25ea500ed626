pub mod config;
pub mod error;
pub mod plan;
pub mod scheduler;
pub mod worker;

pub use config::{RunnerConfig, ShellConfig};
pub use error::{Result, RunnerError};
pub use scheduler::{Job, JobQueue, JobStatus, QueueRunner, RunReport};
pub use worker::{ProcessLauncher, ShellLauncher};
