// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent subprocess execution and stream capture.
//!
//! Two reader tasks (one per pipe) feed a single bounded channel; the
//! consumer assigns sequence numbers in pop order, so interleaved
//! stdout/stderr lines are totally ordered by arrival at the merge point,
//! not by stream.

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use fleet_core::EventSource;
use fleet_store::{SqliteStore, StoreError};

use crate::classify::{classify_line, RawSource};

/// Default agent invocation; the prompt is appended as the final
/// positional argument.
pub const DEFAULT_AGENT_COMMAND: &[&str] = &["codex", "exec", "--json"];

/// Bound on in-flight captured lines between readers and the consumer.
const STREAM_QUEUE_DEPTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("agent command is empty")]
    EmptyCommand,

    #[error("failed to spawn agent {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent {0} pipe was not captured")]
    MissingPipe(&'static str),

    #[error("failed waiting for agent exit: {0}")]
    Wait(#[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-run line counters, keyed by each event's final source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub json_events: u64,
    pub stdout_lines: u64,
    pub stderr_lines: u64,
}

/// Result of one completed agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: i64,
    pub summary: RunSummary,
}

enum StreamItem {
    Line(RawSource, String),
    Eof,
}

/// Runs the configured agent command and persists its output as events.
pub struct AgentRunner {
    store: Arc<SqliteStore>,
    command: Vec<String>,
}

impl AgentRunner {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self::with_command(
            store,
            DEFAULT_AGENT_COMMAND.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Override the base command (tests use fake agent scripts).
    pub fn with_command(store: Arc<SqliteStore>, command: Vec<String>) -> Self {
        Self { store, command }
    }

    /// Spawn the agent in `working_dir`, stream its output into events for
    /// `execution_id`, and finalize the execution row from the exit code.
    pub async fn run(
        &self,
        execution_id: &str,
        prompt: &str,
        working_dir: &Path,
    ) -> Result<RunOutcome, RunnerError> {
        let (program, args) = self.build_invocation(prompt, working_dir)?;

        let mut child = Command::new(&program)
            .args(&args)
            .current_dir(working_dir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|source| RunnerError::Spawn { command: program.clone(), source })?;

        let process_id = child.id().map(i64::from);
        self.store.mark_execution_running(execution_id, process_id)?;
        tracing::info!(execution_id, ?process_id, "agent spawned");

        let stdout = child.stdout.take().ok_or(RunnerError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(RunnerError::MissingPipe("stderr"))?;

        let (tx, mut rx) = mpsc::channel::<StreamItem>(STREAM_QUEUE_DEPTH);
        tokio::spawn(pump_stream(stdout, RawSource::Stdout, tx.clone()));
        tokio::spawn(pump_stream(stderr, RawSource::Stderr, tx));

        let mut summary = RunSummary::default();
        let mut sequence_number: i64 = 0;
        let mut finished_readers = 0;
        while finished_readers < 2 {
            match rx.recv().await {
                Some(StreamItem::Eof) | None => finished_readers += 1,
                Some(StreamItem::Line(origin, line)) => {
                    sequence_number += 1;
                    let (source, event_type, payload) = classify_line(&line).into_event(origin);
                    match source {
                        EventSource::Json => summary.json_events += 1,
                        EventSource::Stderr => summary.stderr_lines += 1,
                        EventSource::Stdout | EventSource::System => summary.stdout_lines += 1,
                    }
                    self.store.append_execution_event(
                        execution_id,
                        sequence_number,
                        source,
                        &event_type,
                        &payload,
                    )?;
                }
            }
        }

        let status = child.wait().await.map_err(RunnerError::Wait)?;
        let exit_code = exit_code_of(status);
        if exit_code == 0 {
            self.store.mark_execution_succeeded(execution_id, exit_code)?;
        } else {
            self.store.mark_execution_failed(execution_id, Some(exit_code))?;
        }
        tracing::info!(execution_id, exit_code, ?summary, "agent finished");

        Ok(RunOutcome { exit_code, summary })
    }

    /// Assemble `(program, args)`. `--skip-git-repo-check` is injected
    /// before the prompt when the binary is `codex` and the working
    /// directory is not a git worktree; codex refuses bare directories
    /// otherwise.
    fn build_invocation(
        &self,
        prompt: &str,
        working_dir: &Path,
    ) -> Result<(String, Vec<String>), RunnerError> {
        let Some((program, base_args)) = self.command.split_first() else {
            return Err(RunnerError::EmptyCommand);
        };
        let mut args: Vec<String> = base_args.to_vec();
        let binary_name = Path::new(program).file_name().and_then(|n| n.to_str());
        if binary_name == Some("codex") && !fleet_prompt::git::is_inside_work_tree(working_dir) {
            args.push("--skip-git-repo-check".to_string());
        }
        args.push(prompt.to_string());
        Ok((program.clone(), args))
    }
}

/// Read one pipe line by line (lossy UTF-8) into the shared channel.
///
/// The end-of-stream sentinel is sent on every exit path, including read
/// errors, so the consumer always sees exactly one per reader.
async fn pump_stream<R: AsyncRead + Unpin>(
    stream: R,
    source: RawSource,
    tx: mpsc::Sender<StreamItem>,
) {
    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buffer);
                let line = text.trim_end_matches('\n').trim_end_matches('\r');
                if tx.send(StreamItem::Line(source, line.to_string())).await.is_err() {
                    break;
                }
            }
            Err(error) => {
                tracing::warn!(?source, %error, "agent stream read failed");
                break;
            }
        }
    }
    let _ = tx.send(StreamItem::Eof).await;
}

fn exit_code_of(status: std::process::ExitStatus) -> i64 {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => i64::from(code),
        // Killed by a signal: report the negated signal number.
        None => status.signal().map(|s| i64::from(-s)).unwrap_or(-1),
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
