//! Process execution for jobs.
//!
//! This module handles the OS side of running a job:
//! - **Launching**: Spawns `sh -c <command>` without waiting for it
//! - **Polling**: Non-blocking checks for process exit
//! - **Exit decoding**: Turns raw wait statuses into exit codes
//!
//! # Components
//!
//! - [`ProcessLauncher`]: The seam between the scheduler and the OS. Tests
//!   substitute a scripted implementation.
//! - [`ShellLauncher`]: Native implementation on top of `tokio::process`
//! - [`exit`]: Wait status decoding and the reserved failure codes
//!
//! # Reserved Exit Codes
//!
//! Shell commands can only exit with 0..=255 (or 128 + signal), so negative
//! codes are free for the scheduler's own failures:
//! - [`LAUNCH_FAILURE_CODE`]: the shell process could not be created
//! - [`WAIT_FAILURE_CODE`]: the launcher could not query the process

pub mod exit;
pub mod launcher;

pub use exit::{decode_exit_status, ExitCode, LAUNCH_FAILURE_CODE, WAIT_FAILURE_CODE};
pub use launcher::{ProcessHandle, ProcessLauncher, ShellLauncher};
