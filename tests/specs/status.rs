// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status specs: lifecycle table and recent-task listing.

use crate::prelude::*;

#[test]
fn status_without_daemon_or_tasks() {
    let temp = Project::empty();

    let output = temp.fleet().args(["status"]).passes();
    let stdout = output.stdout_str();
    let running_line = stdout
        .lines()
        .find(|l| l.starts_with("Running"))
        .unwrap_or_else(|| panic!("no Running line:\n{stdout}"));
    assert!(running_line.ends_with("no"));
    output.stdout_has("No tasks queued yet.");
}

#[test]
fn status_lists_enqueued_tasks_newest_first() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    for instruction in ["first", "second"] {
        temp.fleet()
            .args(["enqueue", "--working-dir", &work, "--instruction", instruction])
            .passes();
    }

    let output = temp.fleet().args(["status"]).passes();
    let stdout = output.stdout_str();
    assert!(stdout.matches("queued").count() >= 2, "{stdout}");
    output.stdout_has("TASK");
    output.stdout_has("codex");
}

#[test]
fn status_limit_bounds_the_listing() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    for i in 0..3 {
        temp.fleet()
            .args(["enqueue", "--working-dir", &work, "--instruction", &format!("task {i}")])
            .passes();
    }

    let output = temp.fleet().args(["status", "--limit", "1"]).passes();
    let stdout = output.stdout_str();
    let data_rows = stdout.lines().filter(|l| l.contains("codex")).count();
    assert_eq!(data_rows, 1, "{stdout}");
}
