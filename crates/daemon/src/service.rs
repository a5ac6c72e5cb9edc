// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch loop: poll the queue, run one task at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fleet_core::{EventSource, Task, TaskPayload};
use fleet_prompt::{PromptBuilder, PromptError};
use fleet_store::{FifoQueue, SqliteStore, StoreError};

use crate::runner::{AgentRunner, RunnerError};

/// Default wait between queue polls when nothing is queued.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything that can go wrong orchestrator-side around a single
/// dispatch. Captured, persisted as an `orchestrator_error` event, and
/// turned into a failed execution + task rather than propagated.
#[derive(Debug, thiserror::Error)]
enum DispatchError {
    #[error("invalid task payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("working_dir does not exist: {0}")]
    MissingWorkingDir(PathBuf),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Single-threaded dispatcher with a cooperative stop flag.
///
/// `stop()` only takes effect between tasks; an in-flight dispatch runs
/// to completion and the child process is never interrupted here.
pub struct OrchestratorService {
    store: Arc<SqliteStore>,
    queue: FifoQueue,
    runner: AgentRunner,
    prompt: PromptBuilder,
    poll_interval: Duration,
    stop: CancellationToken,
}

impl OrchestratorService {
    pub fn new(
        store: Arc<SqliteStore>,
        queue: FifoQueue,
        runner: AgentRunner,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            queue,
            runner,
            prompt: PromptBuilder::new(),
            poll_interval,
            stop: CancellationToken::new(),
        }
    }

    /// Token shared with signal handlers; cancelling it stops the loop at
    /// its next wake point.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Dispatch loop. Returns when stopped; store errors on the poll path
    /// propagate.
    pub async fn run(&self) -> Result<(), StoreError> {
        tracing::info!(poll_interval = ?self.poll_interval, "orchestrator loop started");
        while !self.stop.is_cancelled() {
            match self.queue.dequeue()? {
                Some(task) => self.dispatch(task).await?,
                None => {
                    tokio::select! {
                        _ = self.stop.cancelled() => {}
                        _ = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }
        tracing::info!("orchestrator loop stopped");
        Ok(())
    }

    /// Run one claimed task end to end and finalize its status.
    pub(crate) async fn dispatch(&self, task: Task) -> Result<(), StoreError> {
        tracing::info!(task_id = %task.id, kind = %task.kind, "dispatching task");
        let execution = self.store.create_execution(&task.id, &task.kind)?;

        match self.try_run(&execution.id, &task).await {
            Ok(exit_code) => {
                if exit_code == 0 {
                    self.store.mark_task_succeeded(&task.id)?;
                } else {
                    self.store.mark_task_failed(&task.id)?;
                }
            }
            Err(error) => {
                tracing::warn!(task_id = %task.id, %error, "dispatch failed orchestrator-side");
                self.store.append_execution_event(
                    &execution.id,
                    1,
                    EventSource::System,
                    "orchestrator_error",
                    &error.to_string(),
                )?;
                self.store.mark_execution_failed(&execution.id, None)?;
                self.store.mark_task_failed(&task.id)?;
            }
        }
        Ok(())
    }

    async fn try_run(&self, execution_id: &str, task: &Task) -> Result<i64, DispatchError> {
        let payload = TaskPayload::from_json(&task.payload)?;
        let working_dir = Path::new(&payload.working_dir);
        if !working_dir.is_dir() {
            return Err(DispatchError::MissingWorkingDir(working_dir.to_path_buf()));
        }

        let prompt = self.prompt.build(
            &payload.task_type,
            payload.input_mode,
            &payload.instruction,
            payload.github_issue.as_ref(),
            working_dir,
        )?;

        let outcome = self.runner.run(execution_id, &prompt, working_dir).await?;
        Ok(outcome.exit_code)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
