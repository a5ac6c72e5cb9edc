// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event log rendering specs.

use crate::prelude::*;

fn enqueue_task(temp: &Project, work: &str) -> String {
    let output = temp
        .fleet()
        .args(["enqueue", "--working-dir", work, "--instruction", "Implement x"])
        .passes();
    let stdout = output.stdout_str();
    stdout
        .trim()
        .strip_prefix("queued task ")
        .unwrap_or_else(|| panic!("unexpected enqueue output: {stdout}"))
        .to_string()
}

#[test]
fn events_for_unknown_task_fails() {
    let temp = Project::empty();
    temp.fleet()
        .args(["events", "--task-id", "no-such-task"])
        .fails()
        .stderr_has("not found");
}

#[test]
fn events_for_fresh_task_shows_no_executions() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    let task_id = enqueue_task(&temp, &work);

    let output = temp.fleet().args(["events", "--task-id", &task_id]).passes();
    output.stdout_has(&format!("task {task_id}"));
    output.stdout_has("status: queued");
    output.stdout_has("No executions yet.");
}

#[test]
fn history_is_a_hidden_alias_for_events() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    let task_id = enqueue_task(&temp, &work);

    temp.fleet()
        .args(["history", "--task-id", &task_id])
        .passes()
        .stdout_has(&format!("task {task_id}"));

    // Hidden: the alias does not show up in help.
    let help = temp.fleet().args(["--help"]).passes();
    let stdout = help.stdout_str();
    assert!(!stdout.contains("history"), "{stdout}");
}
