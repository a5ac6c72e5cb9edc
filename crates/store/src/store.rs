// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed store: the exclusive owner of all persisted entities.
//!
//! Every mutator is a short serialized transaction; other components hold
//! transient snapshots of the row types in `fleet-core`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use fleet_core::model::{ExecutionHistory, UnknownSource};
use fleet_core::status::UnknownStatus;
use fleet_core::{
    new_id, utc_now, EventSource, Execution, ExecutionEvent, Task, TaskHistory, TaskStatus,
};

/// Store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("execution not found: {0}")]
    ExecutionNotFound(String),

    #[error("corrupt row: {0}")]
    CorruptStatus(#[from] UnknownStatus),

    #[error("corrupt row: {0}")]
    CorruptSource(#[from] UnknownSource),
}

/// Handle to the single-file database.
///
/// The connection is serialized behind a mutex; separate processes (CLI
/// enqueue vs. orchestrator) each hold their own `SqliteStore` against the
/// same file and rely on SQLite locking plus the busy timeout.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl SqliteStore {
    /// Open the database file, creating the parent directory if absent,
    /// and bring the schema forward. Idempotent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize()?;
        Ok(store)
    }

    /// Apply schema and forward migrations. Safe to call repeatedly.
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        crate::schema::initialize_schema(&conn)?;
        Ok(())
    }

    // --- Task operations ---

    /// Insert a new queued task, stamping all three base timestamps to the
    /// same instant, and return the freshly read row.
    pub fn enqueue_task(&self, kind: &str, payload: &str) -> Result<Task, StoreError> {
        let task_id = new_id();
        let timestamp = utc_now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO tasks (
                id, kind, payload, status, created_at, updated_at, queued_at, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?5, NULL, NULL)",
            params![task_id, kind, payload, TaskStatus::Queued.as_str(), timestamp],
        )?;
        read_task(&conn, &task_id)?.ok_or(StoreError::TaskNotFound(task_id))
    }

    /// Claim the oldest queued task, transitioning it `queued → running`
    /// inside an immediate transaction. Returns `None` when nothing is
    /// queued.
    ///
    /// Arrival order: smallest `queued_at`, tie-broken by smallest `id`.
    /// A concurrent dequeue never observes the same task twice.
    pub fn dequeue_next_task(&self) -> Result<Option<Task>, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let candidate: Option<String> = tx
            .query_row(
                "SELECT id
                 FROM tasks
                 WHERE status = ?1
                 ORDER BY queued_at ASC, id ASC
                 LIMIT 1",
                params![TaskStatus::Queued.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(task_id) = candidate else {
            return Ok(None);
        };

        let started_at = utc_now();
        tx.execute(
            "UPDATE tasks
             SET status = ?1, updated_at = ?2, started_at = ?2
             WHERE id = ?3",
            params![TaskStatus::Running.as_str(), started_at, task_id],
        )?;
        let task = read_task(&tx, &task_id)?.ok_or_else(|| StoreError::TaskNotFound(task_id))?;
        tx.commit()?;
        Ok(Some(task))
    }

    pub fn mark_task_succeeded(&self, task_id: &str) -> Result<Task, StoreError> {
        self.update_task_status(task_id, TaskStatus::Succeeded)
    }

    pub fn mark_task_failed(&self, task_id: &str) -> Result<Task, StoreError> {
        self.update_task_status(task_id, TaskStatus::Failed)
    }

    pub fn mark_task_canceled(&self, task_id: &str) -> Result<Task, StoreError> {
        self.update_task_status(task_id, TaskStatus::Canceled)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock();
        read_task(&conn, task_id)
    }

    /// Most recent tasks first.
    pub fn list_tasks(&self, limit: usize) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT id, kind, payload, status, created_at, updated_at, queued_at, started_at, finished_at
             FROM tasks
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = statement.query_map(params![limit as i64], task_from_row)?;
        collect_tasks(rows)
    }

    fn update_task_status(&self, task_id: &str, status: TaskStatus) -> Result<Task, StoreError> {
        let timestamp = utc_now();
        let finished_at = status.is_terminal().then(|| timestamp.clone());
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE tasks
             SET status = ?1, updated_at = ?2, finished_at = COALESCE(?3, finished_at)
             WHERE id = ?4",
            params![status.as_str(), timestamp, finished_at, task_id],
        )?;
        read_task(&conn, task_id)?.ok_or_else(|| StoreError::TaskNotFound(task_id.to_string()))
    }

    // --- Execution operations ---

    pub fn create_execution(
        &self,
        task_id: &str,
        agent_name: &str,
    ) -> Result<Execution, StoreError> {
        let execution_id = new_id();
        let timestamp = utc_now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO executions (
                id, task_id, agent_name, status, process_id, exit_code, created_at, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, NULL, NULL)",
            params![execution_id, task_id, agent_name, TaskStatus::Queued.as_str(), timestamp],
        )?;
        read_execution(&conn, &execution_id)?.ok_or(StoreError::ExecutionNotFound(execution_id))
    }

    /// Stamp the execution running with the spawned child's pid. Clears any
    /// previous `finished_at` so a re-run of the row is internally
    /// consistent.
    pub fn mark_execution_running(
        &self,
        execution_id: &str,
        process_id: Option<i64>,
    ) -> Result<Execution, StoreError> {
        let timestamp = utc_now();
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE executions
             SET status = ?1, process_id = ?2, started_at = ?3, finished_at = NULL
             WHERE id = ?4",
            params![TaskStatus::Running.as_str(), process_id, timestamp, execution_id],
        )?;
        read_execution(&conn, execution_id)?
            .ok_or_else(|| StoreError::ExecutionNotFound(execution_id.to_string()))
    }

    pub fn mark_execution_succeeded(
        &self,
        execution_id: &str,
        exit_code: i64,
    ) -> Result<Execution, StoreError> {
        self.finish_execution(execution_id, TaskStatus::Succeeded, Some(exit_code))
    }

    /// `exit_code` is `None` for orchestrator-side failures where the child
    /// never reached process exit.
    pub fn mark_execution_failed(
        &self,
        execution_id: &str,
        exit_code: Option<i64>,
    ) -> Result<Execution, StoreError> {
        self.finish_execution(execution_id, TaskStatus::Failed, exit_code)
    }

    pub fn get_execution(&self, execution_id: &str) -> Result<Option<Execution>, StoreError> {
        let conn = self.conn.lock();
        read_execution(&conn, execution_id)
    }

    pub fn list_executions_for_task(&self, task_id: &str) -> Result<Vec<Execution>, StoreError> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT id, task_id, agent_name, status, process_id, exit_code, created_at, started_at, finished_at
             FROM executions
             WHERE task_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = statement.query_map(params![task_id], execution_from_row)?;
        collect_executions(rows)
    }

    fn finish_execution(
        &self,
        execution_id: &str,
        status: TaskStatus,
        exit_code: Option<i64>,
    ) -> Result<Execution, StoreError> {
        let timestamp = utc_now();
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE executions
             SET status = ?1, exit_code = ?2, finished_at = ?3
             WHERE id = ?4",
            params![status.as_str(), exit_code, timestamp, execution_id],
        )?;
        read_execution(&conn, execution_id)?
            .ok_or_else(|| StoreError::ExecutionNotFound(execution_id.to_string()))
    }

    // --- Event operations ---

    pub fn append_execution_event(
        &self,
        execution_id: &str,
        sequence_number: i64,
        source: EventSource,
        event_type: &str,
        payload: &str,
    ) -> Result<ExecutionEvent, StoreError> {
        let timestamp = utc_now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO execution_events (
                execution_id, sequence_number, source, event_type, payload, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![execution_id, sequence_number, source.as_str(), event_type, payload, timestamp],
        )?;
        let event_id = conn.last_insert_rowid();
        let event = conn.query_row(
            "SELECT id, execution_id, sequence_number, source, event_type, payload, created_at
             FROM execution_events
             WHERE id = ?1",
            params![event_id],
            event_from_row,
        )??;
        Ok(event)
    }

    pub fn list_execution_events(
        &self,
        execution_id: &str,
    ) -> Result<Vec<ExecutionEvent>, StoreError> {
        let conn = self.conn.lock();
        let mut statement = conn.prepare(
            "SELECT id, execution_id, sequence_number, source, event_type, payload, created_at
             FROM execution_events
             WHERE execution_id = ?1
             ORDER BY sequence_number ASC, id ASC",
        )?;
        let rows = statement.query_map(params![execution_id], event_from_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row??);
        }
        Ok(events)
    }

    /// The task plus, per execution, its ordered event log. `None` when the
    /// task does not exist.
    pub fn get_task_history(&self, task_id: &str) -> Result<Option<TaskHistory>, StoreError> {
        let Some(task) = self.get_task(task_id)? else {
            return Ok(None);
        };
        let mut executions = Vec::new();
        for execution in self.list_executions_for_task(task_id)? {
            let events = self.list_execution_events(&execution.id)?;
            executions.push(ExecutionHistory { execution, events });
        }
        Ok(Some(TaskHistory { task, executions }))
    }
}

// --- Row mapping ---
//
// Status and source columns come back as intermediate strings; parsing into
// the core enums happens outside the rusqlite closure so corrupt rows
// surface as StoreError rather than a panicking conversion.

struct TaskRow(Task, String);
struct ExecutionRow(Execution, String);

fn task_from_row(row: &Row<'_>) -> Result<TaskRow, rusqlite::Error> {
    Ok(TaskRow(
        Task {
            id: row.get(0)?,
            kind: row.get(1)?,
            payload: row.get(2)?,
            status: TaskStatus::Queued,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            queued_at: row.get(6)?,
            started_at: row.get(7)?,
            finished_at: row.get(8)?,
        },
        row.get(3)?,
    ))
}

fn execution_from_row(row: &Row<'_>) -> Result<ExecutionRow, rusqlite::Error> {
    Ok(ExecutionRow(
        Execution {
            id: row.get(0)?,
            task_id: row.get(1)?,
            agent_name: row.get(2)?,
            status: TaskStatus::Queued,
            process_id: row.get(4)?,
            exit_code: row.get(5)?,
            created_at: row.get(6)?,
            started_at: row.get(7)?,
            finished_at: row.get(8)?,
        },
        row.get(3)?,
    ))
}

fn event_from_row(row: &Row<'_>) -> Result<Result<ExecutionEvent, StoreError>, rusqlite::Error> {
    let source: String = row.get(3)?;
    let event = ExecutionEvent {
        id: row.get(0)?,
        execution_id: row.get(1)?,
        sequence_number: row.get(2)?,
        source: EventSource::Stdout,
        event_type: row.get(4)?,
        payload: row.get(5)?,
        created_at: row.get(6)?,
    };
    Ok(source
        .parse::<EventSource>()
        .map(|parsed| ExecutionEvent { source: parsed, ..event })
        .map_err(StoreError::from))
}

fn finish_task(row: TaskRow) -> Result<Task, StoreError> {
    let TaskRow(task, status) = row;
    Ok(Task { status: status.parse()?, ..task })
}

fn finish_execution_row(row: ExecutionRow) -> Result<Execution, StoreError> {
    let ExecutionRow(execution, status) = row;
    Ok(Execution { status: status.parse()?, ..execution })
}

fn read_task(conn: &Connection, task_id: &str) -> Result<Option<Task>, StoreError> {
    conn.query_row(
        "SELECT id, kind, payload, status, created_at, updated_at, queued_at, started_at, finished_at
         FROM tasks
         WHERE id = ?1",
        params![task_id],
        task_from_row,
    )
    .optional()?
    .map(finish_task)
    .transpose()
}

fn read_execution(conn: &Connection, execution_id: &str) -> Result<Option<Execution>, StoreError> {
    conn.query_row(
        "SELECT id, task_id, agent_name, status, process_id, exit_code, created_at, started_at, finished_at
         FROM executions
         WHERE id = ?1",
        params![execution_id],
        execution_from_row,
    )
    .optional()?
    .map(finish_execution_row)
    .transpose()
}

fn collect_tasks(
    rows: impl Iterator<Item = Result<TaskRow, rusqlite::Error>>,
) -> Result<Vec<Task>, StoreError> {
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(finish_task(row?)?);
    }
    Ok(tasks)
}

fn collect_executions(
    rows: impl Iterator<Item = Result<ExecutionRow, rusqlite::Error>>,
) -> Result<Vec<Execution>, StoreError> {
    let mut executions = Vec::new();
    for row in rows {
        executions.push(finish_execution_row(row?)?);
    }
    Ok(executions)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
