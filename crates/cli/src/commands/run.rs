// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet run` - foreground orchestrator loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};

use fleet_daemon::runner::AgentRunner;
use fleet_daemon::service::OrchestratorService;
use fleet_daemon::supervisor;
use fleet_store::{FifoQueue, SqliteStore};

use crate::config::Config;

pub async fn run(config: &Config, poll_interval: f64, pid_file: Option<PathBuf>) -> Result<()> {
    init_logging();

    let store = Arc::new(SqliteStore::open(config.database())?);
    let queue = FifoQueue::new(store.clone());
    let runner = match agent_command_override() {
        Some(command) => AgentRunner::with_command(store.clone(), command),
        None => AgentRunner::new(store.clone()),
    };
    let service = OrchestratorService::new(
        store,
        queue,
        runner,
        Duration::from_secs_f64(poll_interval),
    );

    // The pid file is only written when explicitly requested; `fleet start`
    // passes one, a bare foreground run does not.
    let pid_written = match &pid_file {
        Some(path) => {
            supervisor::acquire_pid_file(path, None)?;
            true
        }
        None => false,
    };

    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let stop = service.stop_token();
    let signal_task = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::info!("received SIGINT"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        }
        stop.cancel();
    });

    let result = service.run().await;

    // Dropping the signal streams restores default delivery before the
    // pid file goes away.
    signal_task.abort();
    if pid_written {
        if let Some(path) = &pid_file {
            supervisor::release_pid_file(path)?;
        }
    }
    result?;
    Ok(())
}

/// Base agent command override from `FLEET_AGENT_COMMAND`
/// (whitespace-separated argv). The default is the codex invocation.
fn agent_command_override() -> Option<Vec<String>> {
    let raw = std::env::var("FLEET_AGENT_COMMAND").ok()?;
    let command: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
    if command.is_empty() {
        return None;
    }
    Some(command)
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
