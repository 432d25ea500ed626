use std::collections::HashMap;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, Command};

use crate::config::ShellConfig;
use crate::worker::exit::{exit_code_of, ExitCode};

/// Opaque reference to a process started by a [`ProcessLauncher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    slot: u64,
    pid: u32,
}

impl ProcessHandle {
    pub fn new(slot: u64, pid: u32) -> Self {
        Self { slot, pid }
    }

    /// Launcher-local key, unique for the launcher's lifetime
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// OS process id (or a synthetic id for fake launchers)
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Starts job commands and checks on them without blocking.
pub trait ProcessLauncher {
    /// Start `command` and return a handle to it. Must not wait for it to finish.
    fn launch(&mut self, job_id: &str, command: &str) -> io::Result<ProcessHandle>;

    /// Return `Some(exit_code)` once the process has exited, `None` while it is
    /// still running.
    fn try_wait(&mut self, handle: ProcessHandle) -> io::Result<Option<ExitCode>>;
}

/// Runs each command as `sh -c <command>` through `tokio::process`.
///
/// Must be used from within a tokio runtime. Child output is inherited from the
/// parent process.
#[derive(Debug)]
pub struct ShellLauncher {
    shell: ShellConfig,
    children: HashMap<u64, Child>,
    next_slot: u64,
}

impl Default for ShellLauncher {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl ShellLauncher {
    pub fn new(shell: ShellConfig) -> Self {
        Self {
            shell,
            children: HashMap::new(),
            next_slot: 0,
        }
    }

    /// Number of launched processes that have not been reaped yet
    pub fn in_flight(&self) -> usize {
        self.children.len()
    }
}

impl ProcessLauncher for ShellLauncher {
    fn launch(&mut self, job_id: &str, command: &str) -> io::Result<ProcessHandle> {
        tracing::info!(job_id, command, shell = %self.shell.program, "Launching job process");

        let child = Command::new(&self.shell.program)
            .arg(&self.shell.flag)
            .arg(command)
            .stdin(Stdio::null())
            .spawn()?;

        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("process exited before its pid was read"))?;

        let slot = self.next_slot;
        self.next_slot += 1;
        self.children.insert(slot, child);

        Ok(ProcessHandle::new(slot, pid))
    }

    fn try_wait(&mut self, handle: ProcessHandle) -> io::Result<Option<ExitCode>> {
        let child = self.children.get_mut(&handle.slot()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no process for handle {}", handle.slot()),
            )
        })?;

        match child.try_wait()? {
            Some(status) => {
                self.children.remove(&handle.slot());
                Ok(Some(exit_code_of(status)))
            }
            None => Ok(None),
        }
    }
}
