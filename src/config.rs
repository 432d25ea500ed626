use std::time::Duration;

use crate::error::{Result, RunnerError};

/// Shell used to interpret job command lines.
///
/// Every job runs as `<program> <flag> <command>`, so the command string may
/// contain pipes, redirects and anything else the shell understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Path or name of the shell binary
    pub program: String,
    /// Flag telling the shell to read the command from the next argument
    pub flag: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "sh".to_string(),
            flag: "-c".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of jobs running at once
    pub concurrency: usize,
    /// Idle time between scheduling cycles
    pub poll_interval: Duration,
    pub shell: ShellConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval: Duration::from_secs(3),
            shell: ShellConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Default::default()
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_shell(mut self, program: impl Into<String>) -> Self {
        self.shell.program = program.into();
        self
    }

    /// Reject settings the scheduling loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(RunnerError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.shell.program.trim().is_empty() {
            return Err(RunnerError::InvalidConfig(
                "shell program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
