// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime supervision: pid file, liveness probes, termination.
//!
//! The pid file is the single-instance guard for one runtime directory.
//! Acquisition replaces a stale file but refuses to displace a live
//! process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Lifecycle failures surfaced to the CLI with a dedicated error class;
/// never silently retried.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("process already running with pid {pid}")]
    AlreadyRunning { pid: i32 },

    #[error("invalid pid file contents in {path}")]
    InvalidPidFile { path: PathBuf },

    #[error("timed out waiting for pid file {path}")]
    HandshakeTimeout { path: PathBuf },

    #[error("timed out waiting for pid {pid} to stop")]
    StopTimeout { pid: i32 },

    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LifecycleError + '_ {
    move |source| LifecycleError::Io { path: path.to_path_buf(), source }
}

/// Write `pid` (default: the current process) to the pid file.
///
/// An existing file naming a live process is a conflict; a stale file is
/// removed first. Contents are the decimal pid plus a trailing newline.
pub fn acquire_pid_file(path: &Path, pid: Option<i32>) -> Result<i32, LifecycleError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }
    let current = pid.unwrap_or_else(|| std::process::id() as i32);

    if let Some(existing) = read_pid_file(path)? {
        if is_process_running(existing) {
            return Err(LifecycleError::AlreadyRunning { pid: existing });
        }
        tracing::warn!(path = %path.display(), stale_pid = existing, "removing stale pid file");
        std::fs::remove_file(path).map_err(io_error(path))?;
    }

    std::fs::write(path, format!("{current}\n")).map_err(io_error(path))?;
    Ok(current)
}

/// The recorded pid, or `None` when the file is absent or empty.
/// Non-numeric contents are a lifecycle error.
pub fn read_pid_file(path: &Path) -> Result<Option<i32>, LifecycleError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(LifecycleError::Io { path: path.to_path_buf(), source }),
    };
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| LifecycleError::InvalidPidFile { path: path.to_path_buf() })
}

/// Remove the pid file if present.
pub fn release_pid_file(path: &Path) -> Result<(), LifecycleError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LifecycleError::Io { path: path.to_path_buf(), source }),
    }
}

/// Whether the OS reports `pid` alive. A permission-denied probe counts
/// as alive: the process exists, it just is not ours.
pub fn is_process_running(pid: i32) -> bool {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Ask `pid` to terminate (SIGTERM).
pub fn stop_process(pid: i32) -> Result<(), LifecycleError> {
    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|errno| LifecycleError::Signal {
        pid,
        source: std::io::Error::from_raw_os_error(errno as i32),
    })
}

/// Poll until the pid file records `expected_pid` (daemonization
/// handshake), failing after `timeout`.
pub async fn wait_for_pid_file(
    path: &Path,
    expected_pid: i32,
    timeout: Duration,
) -> Result<(), LifecycleError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if read_pid_file(path)? == Some(expected_pid) {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(LifecycleError::HandshakeTimeout { path: path.to_path_buf() });
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Poll until `pid` disappears, failing after `timeout`.
pub async fn wait_for_exit(pid: i32, timeout: Duration) -> Result<(), LifecycleError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if !is_process_running(pid) {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(LifecycleError::StopTimeout { pid });
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
