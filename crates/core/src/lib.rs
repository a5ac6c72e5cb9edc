// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core domain types for the agent-fleet orchestrator.
//!
//! Value types only: statuses, tasks, executions, events, and the task
//! payload contract. All persistence lives in `fleet-store`; components
//! outside the store hold transient snapshots of these types.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod model;
pub mod payload;
pub mod status;
pub mod time;

pub use model::{EventSource, Execution, ExecutionEvent, ExecutionHistory, Task, TaskHistory};
pub use payload::{GithubIssue, InputMode, TaskPayload};
pub use status::TaskStatus;
pub use time::utc_now;

/// Generate a fresh opaque identifier (UUID v4, lowercase hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
