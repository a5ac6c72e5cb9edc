// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema definition and forward migrations.
//!
//! `initialize_schema` is idempotent: tables and indexes use `IF NOT
//! EXISTS`, column additions are guarded by `PRAGMA table_info`, and
//! backfills only touch NULL cells.

use rusqlite::Connection;

const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS tasks (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        payload TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('queued', 'running', 'succeeded', 'failed', 'canceled')),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        queued_at TEXT NOT NULL,
        started_at TEXT,
        finished_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS executions (
        id TEXT PRIMARY KEY,
        task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        agent_name TEXT NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('queued', 'running', 'succeeded', 'failed', 'canceled')),
        process_id INTEGER,
        exit_code INTEGER,
        created_at TEXT NOT NULL,
        started_at TEXT,
        finished_at TEXT
    )",
    "CREATE TABLE IF NOT EXISTS execution_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        execution_id TEXT NOT NULL REFERENCES executions(id) ON DELETE CASCADE,
        sequence_number INTEGER NOT NULL,
        source TEXT NOT NULL,
        event_type TEXT NOT NULL,
        payload TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_status_queued_at ON tasks(status, queued_at, id)",
    "CREATE INDEX IF NOT EXISTS idx_executions_task_id ON executions(task_id)",
    "CREATE INDEX IF NOT EXISTS idx_execution_events_execution_id ON execution_events(execution_id, id)",
];

/// Columns added after the first released schema. Nullable so existing
/// rows remain valid; values are backfilled below.
const MIGRATION_COLUMNS: &[(&str, &[(&str, &str)])] = &[
    ("executions", &[("process_id", "INTEGER"), ("exit_code", "INTEGER")]),
    ("execution_events", &[("sequence_number", "INTEGER"), ("source", "TEXT")]),
];

/// Create tables and indexes, apply column migrations, backfill migrated
/// columns. Safe to re-run against any prior schema version.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    ensure_columns(conn)?;
    backfill_execution_events(conn)?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, rusqlite::Error> {
    let mut statement = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = statement
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn ensure_columns(conn: &Connection) -> Result<(), rusqlite::Error> {
    for (table, columns) in MIGRATION_COLUMNS {
        let existing = table_columns(conn, table)?;
        for (name, column_type) in *columns {
            if !existing.iter().any(|c| c == name) {
                tracing::info!(table, column = name, "adding migrated column");
                conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {name} {column_type}"), [])?;
            }
        }
    }
    Ok(())
}

fn backfill_execution_events(conn: &Connection) -> Result<(), rusqlite::Error> {
    let columns = table_columns(conn, "execution_events")?;
    if columns.iter().any(|c| c == "sequence_number") {
        conn.execute(
            "WITH numbered AS (
                SELECT id, ROW_NUMBER() OVER (PARTITION BY execution_id ORDER BY id ASC) AS seq
                FROM execution_events
            )
            UPDATE execution_events
            SET sequence_number = (
                SELECT seq
                FROM numbered
                WHERE numbered.id = execution_events.id
            )
            WHERE sequence_number IS NULL",
            [],
        )?;
    }
    if columns.iter().any(|c| c == "source") {
        // Legacy rows predate stream classification; they were all JSON.
        conn.execute(
            "UPDATE execution_events SET source = 'json' WHERE source IS NULL",
            [],
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
