// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_plain_task() {
    let payload = TaskPayload {
        working_dir: "/srv/checkout".to_string(),
        task_type: "feature_implementation".to_string(),
        input_mode: InputMode::PlainTask,
        instruction: "Implement x".to_string(),
        github_issue: None,
    };

    let encoded = payload.to_json().unwrap();
    let decoded = TaskPayload::from_json(&encoded).unwrap();
    assert_eq!(decoded.working_dir, "/srv/checkout");
    assert_eq!(decoded.input_mode, InputMode::PlainTask);
    assert_eq!(decoded.instruction, "Implement x");
    assert!(decoded.github_issue.is_none());
}

#[test]
fn decodes_github_issue_payload() {
    let decoded = TaskPayload::from_json(
        r#"{
            "working_dir": "/srv/checkout",
            "task_type": "feature_implementation",
            "input_mode": "github_issue",
            "instruction": "",
            "github_issue": {
                "url": "https://github.com/acme/repo/issues/7",
                "title": "Fix race condition",
                "body": "Lock around queue consumer",
                "number": 7
            }
        }"#,
    )
    .unwrap();

    assert_eq!(decoded.input_mode, InputMode::GithubIssue);
    let issue = decoded.github_issue.unwrap();
    assert_eq!(issue.url, "https://github.com/acme/repo/issues/7");
    assert_eq!(issue.number, Some(7));
}

#[test]
fn defaults_missing_mode_and_type() {
    let decoded = TaskPayload::from_json(r#"{"working_dir": "/tmp/w"}"#).unwrap();
    assert_eq!(decoded.task_type, "feature_implementation");
    assert_eq!(decoded.input_mode, InputMode::PlainTask);
    assert_eq!(decoded.instruction, "");
}

#[test]
fn rejects_payload_without_working_dir() {
    assert!(TaskPayload::from_json(r#"{"instruction": "x"}"#).is_err());
}
