// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemonization lifecycle specs.
//!
//! These spawn a real background orchestrator; serialized so pid files
//! and child processes never cross between specs.

use serial_test::serial;

use crate::prelude::*;

const SPEC_WAIT_MAX_MS: u64 = 15_000;

fn read_pid(temp: &Project) -> String {
    std::fs::read_to_string(temp.path().join("runtime/orchestrator.pid"))
        .expect("pid file")
        .trim()
        .to_string()
}

#[test]
#[serial]
fn start_processes_queued_task_and_stop_shuts_down() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    let agent = temp.script(
        "fake-agent",
        "printf '%s\\n' '{\"type\":\"Task.Started\",\"step\":1}'\n\
         printf '%s\\n' 'plain stdout line'",
    );

    let enqueue = temp
        .fleet()
        .args(["enqueue", "--working-dir", &work, "--instruction", "Implement x"])
        .passes();
    let task_id = enqueue
        .stdout_str()
        .trim()
        .strip_prefix("queued task ")
        .expect("task id")
        .to_string();

    temp.fleet()
        .env("FLEET_AGENT_COMMAND", &agent)
        .args(["start", "--poll-interval", "0.05"])
        .passes()
        .stdout_has("started orchestrator pid ");
    assert!(temp.path().join("runtime/orchestrator.pid").exists());
    assert!(temp.path().join("runtime/orchestrator.log").exists());

    let succeeded = wait_for(SPEC_WAIT_MAX_MS, || {
        let output = temp.fleet().args(["status"]).passes();
        output.stdout_str().contains("succeeded")
    });
    assert!(succeeded, "task never reached succeeded");

    let events = temp.fleet().args(["events", "--task-id", &task_id]).passes();
    events.stdout_has("task_started");
    events.stdout_has("plain stdout line");
    events.stdout_has("exit_code: 0");

    let pid = read_pid(&temp);
    temp.fleet().args(["stop"]).passes().stdout_has(&format!("stopped orchestrator pid {pid}"));
    assert!(!temp.path().join("runtime/orchestrator.pid").exists());
}

#[test]
#[serial]
fn second_start_fails_while_running() {
    let temp = Project::empty();

    temp.fleet().args(["start", "--poll-interval", "0.5"]).passes();
    temp.fleet()
        .args(["start", "--poll-interval", "0.5"])
        .fails()
        .stderr_has("already running");
    temp.fleet().args(["stop"]).passes();
}

#[test]
#[serial]
fn status_reports_running_daemon() {
    let temp = Project::empty();
    temp.fleet().args(["start", "--poll-interval", "0.5"]).passes();

    let output = temp.fleet().args(["status"]).passes();
    let stdout = output.stdout_str();
    let running_line = stdout
        .lines()
        .find(|l| l.starts_with("Running"))
        .unwrap_or_else(|| panic!("no Running line:\n{stdout}"));
    assert!(running_line.ends_with("yes"), "{stdout}");

    temp.fleet().args(["stop"]).passes();
}

#[test]
#[serial]
fn stop_without_daemon_fails() {
    let temp = Project::empty();
    temp.fleet().args(["stop"]).fails().stderr_has("not running");
}

#[test]
#[serial]
fn stop_clears_stale_pid_file() {
    let temp = Project::empty();
    std::fs::create_dir_all(temp.path().join("runtime")).expect("mkdir runtime");
    std::fs::write(temp.path().join("runtime/orchestrator.pid"), "999999\n").expect("pid file");

    temp.fleet().args(["stop"]).fails().stderr_has("stale");
    assert!(!temp.path().join("runtime/orchestrator.pid").exists());
}

#[test]
#[serial]
fn orchestrator_records_error_for_missing_working_dir() {
    let temp = Project::empty();
    let work = temp.mkdir("checkout");
    let enqueue = temp
        .fleet()
        .args(["enqueue", "--working-dir", &work, "--instruction", "Implement x"])
        .passes();
    let task_id = enqueue
        .stdout_str()
        .trim()
        .strip_prefix("queued task ")
        .expect("task id")
        .to_string();
    // Remove the directory after enqueue so dispatch hits the validation.
    std::fs::remove_dir_all(temp.path().join("checkout")).expect("rm work dir");

    temp.fleet().args(["start", "--poll-interval", "0.05"]).passes();

    let failed = wait_for(SPEC_WAIT_MAX_MS, || {
        let output = temp.fleet().args(["status"]).passes();
        output.stdout_str().contains("failed")
    });
    assert!(failed, "task never reached failed");

    let events = temp.fleet().args(["events", "--task-id", &task_id]).passes();
    events.stdout_has("orchestrator_error");
    events.stdout_has("working_dir does not exist");
    events.stdout_has("exit_code: -");

    temp.fleet().args(["stop"]).passes();
}
