// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet start` - daemonize a `fleet run` child.

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use fleet_daemon::supervisor;

use crate::config::Config;

/// How long the parent waits for the child to write the pid file.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn start(config: &Config, poll_interval: f64) -> Result<()> {
    let pid_path = config.pid_file_path();

    // Preflight: refuse a live orchestrator, clear a stale file.
    if let Some(existing) = supervisor::read_pid_file(&pid_path)? {
        if supervisor::is_process_running(existing) {
            bail!("orchestrator already running with pid {existing}");
        }
        supervisor::release_pid_file(&pid_path)?;
    }

    std::fs::create_dir_all(&config.runtime_dir)
        .with_context(|| format!("failed to create {}", config.runtime_dir.display()))?;
    let log_path = config.log_file_path();
    let log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;
    let log_stderr = log.try_clone().context("failed to clone log handle")?;

    let exe = std::env::current_exe().context("failed to resolve own binary")?;
    let child = Command::new(exe)
        .arg("--database")
        .arg(config.database())
        .arg("--runtime-dir")
        .arg(&config.runtime_dir)
        .arg("run")
        .arg("--poll-interval")
        .arg(poll_interval.to_string())
        .arg("--pid-file")
        .arg(&pid_path)
        .stdin(Stdio::null())
        .stdout(log)
        .stderr(log_stderr)
        // New process group: the child outlives this CLI and ignores its
        // terminal's job-control signals.
        .process_group(0)
        .spawn()
        .context("failed to spawn orchestrator child")?;

    let child_pid = child.id() as i32;
    supervisor::wait_for_pid_file(&pid_path, child_pid, HANDSHAKE_TIMEOUT).await?;

    println!("started orchestrator pid {child_pid} (log: {})", log_path.display());
    Ok(())
}
