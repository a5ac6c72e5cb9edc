// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt composition from task payload fields and working-dir git state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fleet_core::{GithubIssue, InputMode};

use crate::task_type::{normalize_task_type, TaskType, UnknownTaskType};
use crate::git;
use crate::template::{render_template, TemplateError};

/// Built-in template, used when no template directory override is given.
const FEATURE_IMPLEMENTATION_TEMPLATE: &str =
    include_str!("../templates/feature_implementation.md");

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error(transparent)]
    UnknownTaskType(#[from] UnknownTaskType),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plain_task requires a non-empty instruction")]
    EmptyInstruction,

    #[error("github_issue input mode requires an issue record")]
    MissingIssue,
}

/// Prompt builder with an optional template directory override.
///
/// With an override, templates are read from `<dir>/<task_type>.md`;
/// otherwise the built-in template text is used.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    templates_dir: Option<PathBuf>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates_dir(dir: impl Into<PathBuf>) -> Self {
        Self { templates_dir: Some(dir.into()) }
    }

    /// Compose the prompt for one task.
    ///
    /// Pure apart from git probing: the same payload against the same git
    /// state renders the same string.
    pub fn build(
        &self,
        task_type: &str,
        input_mode: InputMode,
        instruction: &str,
        github_issue: Option<&GithubIssue>,
        working_dir: &Path,
    ) -> Result<String, PromptError> {
        let task_type = normalize_task_type(task_type)?;
        let template_text = self.template_text(task_type)?;

        let task_block = match input_mode {
            InputMode::PlainTask => plain_task_block(instruction)?,
            InputMode::GithubIssue => {
                github_issue_block(github_issue.ok_or(PromptError::MissingIssue)?)
            }
        };

        let mut context: HashMap<String, String> = HashMap::new();
        context.insert("working_dir".to_string(), working_dir.display().to_string());
        context.insert("task_block".to_string(), task_block);
        context.insert("commit_block".to_string(), String::new());
        context.insert("push_block".to_string(), String::new());
        context.insert("pull_request_block".to_string(), String::new());

        if git::is_inside_work_tree(working_dir) {
            context.insert(
                "commit_block".to_string(),
                "- Before finishing, create a commit with all of your changes.".to_string(),
            );
            if git::has_remote(working_dir) {
                context.insert(
                    "push_block".to_string(),
                    "- Push your branch to the configured remote.".to_string(),
                );
                if git::suggests_pull_request_workflow(working_dir) {
                    context.insert(
                        "pull_request_block".to_string(),
                        "- Create a pull request/merge request for the change.".to_string(),
                    );
                }
            }
        }

        let rendered = render_template(&template_text, &context)?;
        tracing::debug!(task_type = %task_type, %input_mode, "prompt composed");
        Ok(normalize_output(&rendered))
    }

    fn template_text(&self, task_type: TaskType) -> Result<String, PromptError> {
        match &self.templates_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.md", task_type.as_str()));
                std::fs::read_to_string(&path)
                    .map_err(|source| PromptError::TemplateRead { path, source })
            }
            None => Ok(builtin_template(task_type).to_string()),
        }
    }
}

/// Compose a prompt with the built-in templates.
pub fn build_prompt(
    task_type: &str,
    input_mode: InputMode,
    instruction: &str,
    github_issue: Option<&GithubIssue>,
    working_dir: &Path,
) -> Result<String, PromptError> {
    PromptBuilder::new().build(task_type, input_mode, instruction, github_issue, working_dir)
}

fn builtin_template(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::FeatureImplementation => FEATURE_IMPLEMENTATION_TEMPLATE,
    }
}

fn plain_task_block(instruction: &str) -> Result<String, PromptError> {
    let trimmed = instruction.trim();
    if trimmed.is_empty() {
        return Err(PromptError::EmptyInstruction);
    }
    Ok(format!("Task request:\n{trimmed}"))
}

fn github_issue_block(issue: &GithubIssue) -> String {
    let mut lines = vec!["Task request: resolve the referenced hosted issue.".to_string()];
    if !issue.url.trim().is_empty() {
        lines.push(format!("Issue URL: {}", issue.url.trim()));
    }
    if let Some(number) = issue.number {
        lines.push(format!("Issue number: {number}"));
    }
    if !issue.title.trim().is_empty() {
        lines.push(format!("Issue title: {}", issue.title.trim()));
    }
    if !issue.body.trim().is_empty() {
        lines.push(format!("Issue body:\n{}", issue.body.trim()));
    }
    lines.push(String::new());
    lines.push(
        "Treat the issue description as the complete task specification. \
         Implement exactly the change the issue requests and nothing more."
            .to_string(),
    );
    lines.join("\n")
}

/// Normalize rendered output: trim trailing whitespace per line, collapse
/// blank-line runs, strip leading/trailing blanks, end with one newline.
fn normalize_output(rendered: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for raw in rendered.lines() {
        let line = raw.trim_end();
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
        previous_blank = blank;
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
