// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Enqueue specs: payload validation and queue round trips.

use crate::prelude::*;

#[test]
fn enqueue_plain_task_prints_task_id() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    let output = temp
        .fleet()
        .args(["enqueue", "--working-dir", &work, "--instruction", "Implement x"])
        .passes();
    output.stdout_has("queued task ");

    // Default database lands in the project directory.
    assert!(temp.path().join("agent_fleet.db").exists());
}

#[test]
fn enqueue_respects_database_flag() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    let db = temp.path().join("custom").join("fleet.db");

    temp.fleet()
        .args([
            "--database",
            &db.display().to_string(),
            "enqueue",
            "--working-dir",
            &work,
            "--instruction",
            "Implement x",
        ])
        .passes();

    assert!(db.exists());
}

#[test]
fn enqueue_rejects_mixed_input_modes() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    temp.fleet()
        .args([
            "enqueue",
            "--working-dir",
            &work,
            "--instruction",
            "Do x",
            "--github-issue-url",
            "https://github.com/acme/repo/issues/7",
            "--github-issue-title",
            "Fix",
        ])
        .fails()
        .stderr_has("not a mix");
}

#[test]
fn enqueue_rejects_missing_input() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    temp.fleet()
        .args(["enqueue", "--working-dir", &work])
        .fails()
        .stderr_has("--instruction");
}

#[test]
fn enqueue_issue_mode_requires_url_and_text() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    temp.fleet()
        .args([
            "enqueue",
            "--working-dir",
            &work,
            "--github-issue-title",
            "Fix race condition",
        ])
        .fails()
        .stderr_has("--github-issue-url");

    temp.fleet()
        .args([
            "enqueue",
            "--working-dir",
            &work,
            "--github-issue-url",
            "https://github.com/acme/repo/issues/7",
        ])
        .fails()
        .stderr_has("--github-issue-title or --github-issue-body");
}

#[test]
fn enqueue_accepts_full_issue_record() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    temp.fleet()
        .args([
            "enqueue",
            "--working-dir",
            &work,
            "--github-issue-url",
            "https://github.com/acme/repo/issues/7",
            "--github-issue-title",
            "Fix race condition",
            "--github-issue-body",
            "Lock around queue consumer",
            "--github-issue-number",
            "7",
        ])
        .passes()
        .stdout_has("queued task ");
}

#[test]
fn enqueue_rejects_unknown_task_type() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");

    temp.fleet()
        .args([
            "enqueue",
            "--working-dir",
            &work,
            "--instruction",
            "Do x",
            "--task-type",
            "bug_fix",
        ])
        .fails()
        .stderr_has("feature_implementation");
}
