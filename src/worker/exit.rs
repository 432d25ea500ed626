//! Exit status decoding.
//!
//! A POSIX wait status is a 16-bit word: the low 7 bits hold the terminating
//! signal (0 when the process exited normally) and the high byte holds the
//! value the program passed to `exit`.

/// Exit code of a finished job process.
pub type ExitCode = i32;

/// Recorded when the job's process could not be created at all.
pub const LAUNCH_FAILURE_CODE: ExitCode = -1;

/// Recorded when the launcher lost track of a running process.
pub const WAIT_FAILURE_CODE: ExitCode = -2;

/// Offset added to the signal number for signal-terminated processes,
/// matching the shell's `$?` convention.
const SIGNAL_EXIT_BASE: ExitCode = 128;

/// Extract the program's return value from a raw wait status.
///
/// Processes killed by a signal report `128 + signal`.
pub fn decode_exit_status(raw: i32) -> ExitCode {
    let signal = raw & 0x7f;
    if signal == 0 {
        (raw >> 8) & 0xff
    } else {
        SIGNAL_EXIT_BASE + signal
    }
}

/// Exit code of a [`std::process::ExitStatus`] returned by the OS.
#[cfg(unix)]
pub fn exit_code_of(status: std::process::ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    decode_exit_status(status.into_raw())
}

#[cfg(not(unix))]
pub fn exit_code_of(status: std::process::ExitStatus) -> ExitCode {
    status.code().unwrap_or(WAIT_FAILURE_CODE)
}
