//! Process launcher
//!
//! Starts one child process with its standard input and output bound to
//! given [`StreamEndpoint`]s. Endpoints are passed by value: whatever
//! channel half the caller hands over is owned by the launch and the
//! parent's copy is closed as soon as the child has been created.

use crate::command::Command;
use nix::sys::signal::Signal;
use std::fmt;
use std::fs::File;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command as Process, ExitStatus};
use thiserror::Error;

/// Status reported when the program cannot be found.
pub const STATUS_NOT_FOUND: i32 = 127;

/// Status reported when the program exists but cannot be executed.
pub const STATUS_NOT_EXECUTABLE: i32 = 126;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to create pipe: {0}")]
    Channel(#[source] nix::Error),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Where a child's standard input or output is connected.
#[derive(Debug, Default)]
pub enum StreamEndpoint {
    /// Whatever the shell itself was started with.
    #[default]
    Inherited,
    /// One half of an anonymous channel (or any other owned descriptor).
    Channel(OwnedFd),
}

impl From<OwnedFd> for StreamEndpoint {
    fn from(fd: OwnedFd) -> Self {
        StreamEndpoint::Channel(fd)
    }
}

impl From<File> for StreamEndpoint {
    fn from(file: File) -> Self {
        StreamEndpoint::Channel(OwnedFd::from(file))
    }
}

/// Create an anonymous channel, returning `(read half, write half)`.
///
/// Both halves are close-on-exec, so only the child a half is explicitly
/// handed to ever sees it.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "illumos",
    target_os = "solaris"
))]
pub fn channel() -> Result<(OwnedFd, OwnedFd), LaunchError> {
    use nix::fcntl::OFlag;
    nix::unistd::pipe2(OFlag::O_CLOEXEC).map_err(LaunchError::Channel)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "illumos",
    target_os = "solaris"
)))]
pub fn channel() -> Result<(OwnedFd, OwnedFd), LaunchError> {
    use std::os::fd::AsRawFd;

    let (reader, writer) = nix::unistd::pipe().map_err(LaunchError::Channel)?;
    for fd in [&reader, &writer] {
        // No pipe2 here, so there is a window before FD_CLOEXEC is set.
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
            return Err(LaunchError::Channel(nix::Error::last()));
        }
    }
    Ok((reader, writer))
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
    /// The program image never loaded (not found, not executable).
    NotStarted(i32),
}

impl Termination {
    /// Shell-style status code: signals map to 128 + signal number.
    pub fn code(self) -> i32 {
        match self {
            Termination::Exited(code) | Termination::NotStarted(code) => code,
            Termination::Signaled(signal) => 128 + signal,
        }
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Termination::Exited(code),
            (None, Some(signal)) => Termination::Signaled(signal),
            (None, None) => Termination::Exited(1),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Termination::Exited(code) => write!(f, "exited with {}", code),
            Termination::Signaled(signal) => match Signal::try_from(signal) {
                Ok(sig) => write!(f, "killed by {}", sig.as_str()),
                Err(_) => write!(f, "killed by signal {}", signal),
            },
            Termination::NotStarted(code) => write!(f, "failed to start (status {})", code),
        }
    }
}

/// A launched stage that has not been waited on yet.
#[derive(Debug)]
pub enum Stage {
    Running { program: String, child: Child },
    /// Exec failed; the failure was already reported on stderr.
    Failed(i32),
}

impl Stage {
    pub fn id(&self) -> Option<u32> {
        match self {
            Stage::Running { child, .. } => Some(child.id()),
            Stage::Failed(_) => None,
        }
    }

    /// Block until the child terminates.
    pub fn wait(self) -> Result<Termination, LaunchError> {
        match self {
            Stage::Running { program, mut child } => child
                .wait()
                .map(Termination::from)
                .map_err(|source| LaunchError::Wait { program, source }),
            Stage::Failed(code) => Ok(Termination::NotStarted(code)),
        }
    }
}

/// Start `command` without waiting for it.
///
/// Inherited endpoints are left alone; channel endpoints become the child's
/// stdin/stdout and the parent's copies are closed before this returns.
pub fn spawn(
    command: &Command,
    input: StreamEndpoint,
    output: StreamEndpoint,
) -> Result<Stage, LaunchError> {
    let mut process = Process::new(command.program());
    process.args(command.args());
    if let StreamEndpoint::Channel(fd) = input {
        process.stdin(fd);
    }
    if let StreamEndpoint::Channel(fd) = output {
        process.stdout(fd);
    }

    let spawned = process.spawn();
    // The Command owns the endpoint halves until it is dropped.
    drop(process);

    match spawned {
        Ok(child) => Ok(Stage::Running {
            program: command.program().to_string(),
            child,
        }),
        Err(err) => exec_failure(command.program(), err).map(Stage::Failed),
    }
}

/// Start `command` and block until it exits, returning its status code.
pub fn launch(
    command: &Command,
    input: StreamEndpoint,
    output: StreamEndpoint,
) -> Result<i32, LaunchError> {
    Ok(spawn(command, input, output)?.wait()?.code())
}

/// Sort a spawn error into "no process could be created" (an error for the
/// caller) and "the program would not run" (a status, as if the child had
/// exited with it).
fn exec_failure(program: &str, err: io::Error) -> Result<i32, LaunchError> {
    match err.raw_os_error() {
        Some(libc::EAGAIN) | Some(libc::ENOMEM) => Err(LaunchError::Spawn {
            program: program.to_string(),
            source: err,
        }),
        _ if err.kind() == io::ErrorKind::NotFound => {
            if program.contains('/') {
                eprintln!("bashlite: {}: No such file or directory", program);
            } else {
                eprintln!("bashlite: {}: command not found", program);
            }
            Ok(STATUS_NOT_FOUND)
        }
        _ => {
            eprintln!("bashlite: {}: {}", program, err);
            Ok(STATUS_NOT_EXECUTABLE)
        }
    }
}
