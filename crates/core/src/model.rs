// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent entity snapshots: tasks, executions, execution events.

use serde::{Deserialize, Serialize};

use crate::status::TaskStatus;

/// An enqueued unit of work.
///
/// Timestamps are ISO-8601 UTC strings from [`crate::time::utc_now`].
/// `queued_at == created_at` at birth; `started_at` is stamped when the
/// task first transitions to running; `finished_at` iff terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Agent selector; currently always `"codex"`.
    pub kind: String,
    /// Opaque JSON-encoded [`crate::payload::TaskPayload`].
    pub payload: String,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
    pub queued_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// One subprocess attempt against one task.
///
/// `process_id` is set once the child is spawned; `exit_code` only when the
/// child actually exited (orchestrator-side failures finish with a null
/// exit code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub task_id: String,
    pub agent_name: String,
    pub status: TaskStatus,
    pub process_id: Option<i64>,
    pub exit_code: Option<i64>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// Where an event line came from, after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Stdout,
    Stderr,
    Json,
    System,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Stdout => "stdout",
            EventSource::Stderr => "stderr",
            EventSource::Json => "json",
            EventSource::System => "system",
        }
    }
}

impl std::fmt::Display for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(EventSource::Stdout),
            "stderr" => Ok(EventSource::Stderr),
            "json" => Ok(EventSource::Json),
            "system" => Ok(EventSource::System),
            other => Err(UnknownSource(other.to_string())),
        }
    }
}

/// An event source string outside the four-value enum.
#[derive(Debug, thiserror::Error)]
#[error("unknown event source: {0:?}")]
pub struct UnknownSource(pub String);

/// One classified line of subprocess output.
///
/// Within an execution, `sequence_number` is a contiguous `1..=N` sequence
/// in the order the runner's consumer observed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Autoincrement row id (insertion order within the table).
    pub id: i64,
    pub execution_id: String,
    pub sequence_number: i64,
    pub source: EventSource,
    /// Normalized token, e.g. `task_started`, `raw_text`, `orchestrator_error`.
    pub event_type: String,
    /// Canonical string form: sorted-key JSON for `json`, the trimmed line
    /// otherwise.
    pub payload: String,
    pub created_at: String,
}

/// A task together with its executions and their ordered event logs.
#[derive(Debug, Clone, Serialize)]
pub struct TaskHistory {
    pub task: Task,
    pub executions: Vec<ExecutionHistory>,
}

/// One execution plus its events ordered by sequence number.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionHistory {
    pub execution: Execution,
    pub events: Vec<ExecutionEvent>,
}
