// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet events` - render the event log for a task's executions.

use anyhow::{bail, Result};

use fleet_store::SqliteStore;

use crate::config::Config;
use crate::table::{Column, Table};

pub fn events(config: &Config, task_id: &str, tail: usize) -> Result<()> {
    let store = SqliteStore::open(config.database())?;
    let Some(history) = store.get_task_history(task_id)? else {
        bail!("task {task_id} not found");
    };

    let task = &history.task;
    println!("task {}", task.id);
    println!("  status: {}", task.status);
    println!("  kind: {}", task.kind);
    println!("  queued: {}", task.queued_at);

    if history.executions.is_empty() {
        println!();
        println!("No executions yet.");
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for item in &history.executions {
        let execution = &item.execution;
        println!();
        println!("execution {}", execution.id);
        println!(
            "  status: {}  process_id: {}  exit_code: {}",
            execution.status,
            execution.process_id.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            execution.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
        );

        if item.events.is_empty() {
            println!("  (no events)");
            continue;
        }

        let skipped = item.events.len().saturating_sub(tail);
        if skipped > 0 {
            println!("  ... {skipped} earlier event(s) omitted");
        }

        let mut table = Table::new(vec![
            Column::right("SEQ"),
            Column::left("SOURCE"),
            Column::left("TYPE"),
            Column::left("PAYLOAD").with_max(100),
        ]);
        for event in item.events.iter().skip(skipped) {
            table.row(vec![
                event.sequence_number.to_string(),
                event.source.to_string(),
                event.event_type.clone(),
                event.payload.clone(),
            ]);
        }
        table.render(&mut out);
    }
    Ok(())
}
