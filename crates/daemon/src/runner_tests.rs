// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fleet_core::{EventSource, TaskStatus};
use fleet_store::SqliteStore;

use super::*;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/usr/bin/env bash\n{body}\n")).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

fn fixture(dir: &Path) -> (Arc<SqliteStore>, String) {
    let store = Arc::new(SqliteStore::open(dir.join("runner.db")).unwrap());
    let task = store.enqueue_task("codex", "{}").unwrap();
    let execution = store.create_execution(&task.id, "codex").unwrap();
    (store, execution.id)
}

#[tokio::test]
async fn persists_json_and_raw_events_with_contiguous_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-codex",
        "printf '%s\\n' '{\"type\":\"Task.Started\",\"step\":1}'\n\
         printf '%s\\n' 'plain stdout line'\n\
         printf '%s\\n' 'stderr raw line' >&2",
    );
    let (store, execution_id) = fixture(dir.path());
    let runner =
        AgentRunner::with_command(store.clone(), vec![script.display().to_string()]);

    let outcome = runner.run(&execution_id, "ignored", dir.path()).await.unwrap();

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(
        outcome.summary,
        RunSummary { json_events: 1, stdout_lines: 1, stderr_lines: 1 }
    );

    let stored = store.get_execution(&execution_id).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Succeeded);
    assert_eq!(stored.exit_code, Some(0));
    assert!(stored.process_id.is_some());

    let events = store.list_execution_events(&execution_id).unwrap();
    let sequences: Vec<i64> = events.iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert!(events
        .iter()
        .any(|e| e.source == EventSource::Json && e.event_type == "task_started"));
    assert!(events.iter().any(|e| e.source == EventSource::Stdout
        && e.event_type == "raw_text"
        && e.payload == "plain stdout line"));
    assert!(events.iter().any(|e| e.source == EventSource::Stderr
        && e.event_type == "raw_text"
        && e.payload == "stderr raw line"));
}

#[tokio::test]
async fn json_payloads_are_canonicalized_with_sorted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-codex",
        "printf '%s\\n' '{\"z\":1,\"a\":2,\"type\":\"Step\"}'",
    );
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(store.clone(), vec![script.display().to_string()]);

    runner.run(&execution_id, "ignored", dir.path()).await.unwrap();

    let events = store.list_execution_events(&execution_id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload, r#"{"a":2,"type":"Step","z":1}"#);
}

#[tokio::test]
async fn adds_skip_git_repo_check_outside_a_worktree() {
    let dir = tempfile::tempdir().unwrap();
    // Echoes its arguments so the injected flag shows up as an event.
    let script = write_script(dir.path(), "codex", "printf '%s\\n' \"$*\"");
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(
        store.clone(),
        vec![script.display().to_string(), "exec".to_string(), "--json".to_string()],
    );

    runner.run(&execution_id, "do work", dir.path()).await.unwrap();

    let events = store.list_execution_events(&execution_id).unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].payload.contains("--skip-git-repo-check"));
    // Injected before the prompt, which stays the final argument.
    assert!(events[0].payload.ends_with("do work"));
    let flag_at = events[0].payload.find("--skip-git-repo-check").unwrap();
    let prompt_at = events[0].payload.find("do work").unwrap();
    assert!(flag_at < prompt_at);
}

#[tokio::test]
async fn no_injection_for_non_codex_binaries() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "other-agent", "printf '%s\\n' \"$*\"");
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(store.clone(), vec![script.display().to_string()]);

    runner.run(&execution_id, "do work", dir.path()).await.unwrap();

    let events = store.list_execution_events(&execution_id).unwrap();
    assert!(!events[0].payload.contains("--skip-git-repo-check"));
}

#[tokio::test]
async fn nonzero_exit_marks_execution_failed_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "fake-codex", "printf 'boom\\n' >&2\nexit 3");
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(store.clone(), vec![script.display().to_string()]);

    let outcome = runner.run(&execution_id, "ignored", dir.path()).await.unwrap();

    assert_eq!(outcome.exit_code, 3);
    assert_eq!(outcome.summary.stderr_lines, 1);
    let stored = store.get_execution(&execution_id).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.exit_code, Some(3));
    assert!(stored.finished_at.is_some());
}

#[tokio::test]
async fn spawn_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(
        store,
        vec![dir.path().join("does-not-exist").display().to_string()],
    );

    let err = runner.run(&execution_id, "ignored", dir.path()).await.unwrap_err();
    assert!(matches!(err, RunnerError::Spawn { .. }));
}

#[tokio::test]
async fn many_interleaved_lines_stay_contiguous() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "fake-codex",
        "for i in $(seq 1 50); do\n\
           printf '%s\\n' \"out $i\"\n\
           printf '%s\\n' \"err $i\" >&2\n\
         done",
    );
    let (store, execution_id) = fixture(dir.path());
    let runner = AgentRunner::with_command(store.clone(), vec![script.display().to_string()]);

    let outcome = runner.run(&execution_id, "ignored", dir.path()).await.unwrap();

    assert_eq!(outcome.summary.stdout_lines, 50);
    assert_eq!(outcome.summary.stderr_lines, 50);
    let events = store.list_execution_events(&execution_id).unwrap();
    let sequences: Vec<i64> = events.iter().map(|e| e.sequence_number).collect();
    assert_eq!(sequences, (1..=100).collect::<Vec<i64>>());
}
