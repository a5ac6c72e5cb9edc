// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet status` - lifecycle overview plus recent tasks.

use anyhow::Result;

use fleet_daemon::supervisor;
use fleet_store::SqliteStore;

use crate::config::Config;
use crate::table::{Column, Table};

pub fn status(config: &Config, limit: usize) -> Result<()> {
    let pid_path = config.pid_file_path();
    let pid = supervisor::read_pid_file(&pid_path)?;
    let running = pid.is_some_and(supervisor::is_process_running);

    let mut out = std::io::stdout().lock();
    let mut lifecycle = Table::new(vec![Column::left("FIELD"), Column::left("VALUE")]);
    lifecycle.row(vec!["Database".to_string(), config.database().display().to_string()]);
    lifecycle.row(vec!["Runtime Dir".to_string(), config.runtime_dir.display().to_string()]);
    lifecycle.row(vec!["PID File".to_string(), pid_path.display().to_string()]);
    lifecycle.row(vec!["Running".to_string(), if running { "yes" } else { "no" }.to_string()]);
    lifecycle.row(vec![
        "PID".to_string(),
        pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
    ]);
    lifecycle.render(&mut out);

    let store = SqliteStore::open(config.database())?;
    let tasks = store.list_tasks(limit)?;

    println!();
    if tasks.is_empty() {
        println!("No tasks queued yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::left("TASK"),
        Column::left("STATUS"),
        Column::left("QUEUED"),
        Column::left("KIND"),
    ]);
    for task in &tasks {
        table.row(vec![
            task.id.clone(),
            task.status.to_string(),
            task.queued_at.clone(),
            task.kind.clone(),
        ]);
    }
    table.render(&mut out);
    Ok(())
}
