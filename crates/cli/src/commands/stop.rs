// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet stop` - terminate the background orchestrator.

use std::time::Duration;

use anyhow::{bail, Result};

use fleet_daemon::supervisor;

use crate::config::Config;

/// How long to wait for the process to disappear after SIGTERM.
const STOP_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn stop(config: &Config) -> Result<()> {
    let pid_path = config.pid_file_path();

    let Some(pid) = supervisor::read_pid_file(&pid_path)? else {
        bail!("orchestrator is not running");
    };

    if !supervisor::is_process_running(pid) {
        supervisor::release_pid_file(&pid_path)?;
        bail!("orchestrator pid file was stale and has been removed");
    }

    supervisor::stop_process(pid)?;
    supervisor::wait_for_exit(pid, STOP_TIMEOUT).await?;
    supervisor::release_pid_file(&pid_path)?;

    println!("stopped orchestrator pid {pid}");
    Ok(())
}
