// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON contract stored in `tasks.payload`.

use serde::{Deserialize, Serialize};

/// How the task's work description was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    PlainTask,
    GithubIssue,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::PlainTask => "plain_task",
            InputMode::GithubIssue => "github_issue",
        }
    }
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hosted-issue record referenced by a task.
///
/// Field presence is best-effort: the prompt builder omits empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubIssue {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub number: Option<i64>,
}

/// The decoded form of `tasks.payload`.
///
/// Unknown fields are tolerated so older orchestrators can read payloads
/// written by newer CLIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    pub working_dir: String,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default = "default_input_mode")]
    pub input_mode: InputMode,
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub github_issue: Option<GithubIssue>,
}

fn default_task_type() -> String {
    "feature_implementation".to_string()
}

fn default_input_mode() -> InputMode {
    InputMode::PlainTask
}

impl TaskPayload {
    /// Decode a payload string as stored in `tasks.payload`.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Encode for storage in `tasks.payload`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
