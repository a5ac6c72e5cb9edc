// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of task types a prompt template exists for.

/// Kind of work a task describes. Closed enum; extending it means adding
/// a template alongside the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    FeatureImplementation,
}

impl TaskType {
    pub const ALL: [TaskType; 1] = [TaskType::FeatureImplementation];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::FeatureImplementation => "feature_implementation",
        }
    }

    /// Valid values, comma-separated, for error messages and CLI help.
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize a raw task-type string (lowercase, trimmed) into the closed
/// enum. Unknown values report the valid set.
pub fn normalize_task_type(raw: &str) -> Result<TaskType, UnknownTaskType> {
    let value = raw.trim().to_lowercase();
    match value.as_str() {
        "feature_implementation" => Ok(TaskType::FeatureImplementation),
        _ => Err(UnknownTaskType { given: raw.to_string(), available: TaskType::available() }),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown task_type: {given:?}. available: {available}")]
pub struct UnknownTaskType {
    pub given: String,
    pub available: String,
}

#[cfg(test)]
#[path = "task_type_tests.rs"]
mod tests;
