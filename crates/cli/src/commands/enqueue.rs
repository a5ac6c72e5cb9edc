// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet enqueue` - queue a task.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use fleet_core::{GithubIssue, InputMode, TaskPayload};
use fleet_prompt::normalize_task_type;
use fleet_store::{FifoQueue, SqliteStore};

use crate::config::Config;

/// Agent selector recorded as `tasks.kind`.
const TASK_KIND: &str = "codex";

#[derive(Args)]
pub struct EnqueueArgs {
    /// Directory the agent will work in
    #[arg(long = "working-dir")]
    pub working_dir: PathBuf,

    /// Plain task instruction
    #[arg(long)]
    pub instruction: Option<String>,

    /// Hosted issue URL
    #[arg(long = "github-issue-url")]
    pub github_issue_url: Option<String>,

    /// Hosted issue title
    #[arg(long = "github-issue-title")]
    pub github_issue_title: Option<String>,

    /// Hosted issue body
    #[arg(long = "github-issue-body")]
    pub github_issue_body: Option<String>,

    /// Hosted issue number
    #[arg(long = "github-issue-number")]
    pub github_issue_number: Option<i64>,

    /// Fetch the issue record from this repository (owner/repo) via `gh`
    #[arg(long = "github-repo", requires = "github_issue")]
    pub github_repo: Option<String>,

    /// Issue number to fetch with --github-repo
    #[arg(long = "github-issue", requires = "github_repo")]
    pub github_issue: Option<i64>,

    /// Kind of work the task describes
    #[arg(long = "task-type", default_value = "feature_implementation")]
    pub task_type: String,
}

pub fn enqueue(config: &Config, args: EnqueueArgs) -> Result<()> {
    let payload = build_enqueue_payload(args)?;
    let encoded = payload.to_json().context("failed to encode task payload")?;

    let store = Arc::new(SqliteStore::open(config.database())?);
    let queue = FifoQueue::new(store);
    let task = queue.enqueue(TASK_KIND, &encoded)?;

    println!("queued task {}", task.id);
    Ok(())
}

/// Validate the flag combination and produce the payload.
///
/// Exactly one input mode must be selected: `--instruction`, the explicit
/// `--github-issue-*` fields, or a `--github-repo`/`--github-issue` fetch.
pub fn build_enqueue_payload(args: EnqueueArgs) -> Result<TaskPayload> {
    let task_type = normalize_task_type(&args.task_type)?.as_str().to_string();

    let has_instruction = args.instruction.as_deref().is_some_and(|i| !i.trim().is_empty());
    let has_explicit_issue = args.github_issue_url.is_some()
        || args.github_issue_title.is_some()
        || args.github_issue_body.is_some()
        || args.github_issue_number.is_some();
    let has_fetch = args.github_repo.is_some();

    let modes = [has_instruction, has_explicit_issue, has_fetch];
    if modes.iter().filter(|m| **m).count() > 1 {
        bail!("provide either --instruction, --github-issue-* fields, or --github-repo/--github-issue, not a mix");
    }

    if has_instruction {
        let instruction = args.instruction.unwrap_or_default().trim().to_string();
        return Ok(TaskPayload {
            working_dir: args.working_dir.display().to_string(),
            task_type,
            input_mode: InputMode::PlainTask,
            instruction,
            github_issue: None,
        });
    }

    let issue = if has_fetch {
        let repo = args.github_repo.unwrap_or_default();
        let number = args
            .github_issue
            .ok_or_else(|| anyhow!("--github-repo requires --github-issue"))?;
        fetch_github_issue(&repo, number)?
    } else if has_explicit_issue {
        let url = args
            .github_issue_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| anyhow!("github issue mode requires --github-issue-url"))?
            .to_string();
        let title = args.github_issue_title.unwrap_or_default();
        let body = args.github_issue_body.unwrap_or_default();
        if title.trim().is_empty() && body.trim().is_empty() {
            bail!("github issue mode requires at least --github-issue-title or --github-issue-body");
        }
        GithubIssue { url, title, body, number: args.github_issue_number }
    } else {
        bail!("provide --instruction or a github issue (explicit fields or --github-repo/--github-issue)");
    };

    Ok(TaskPayload {
        working_dir: args.working_dir.display().to_string(),
        task_type,
        input_mode: InputMode::GithubIssue,
        instruction: String::new(),
        github_issue: Some(issue),
    })
}

/// Fetch an issue record through the GitHub CLI.
fn fetch_github_issue(repo: &str, number: i64) -> Result<GithubIssue> {
    let output = Command::new("gh")
        .args([
            "issue",
            "view",
            &number.to_string(),
            "--repo",
            repo,
            "--json",
            "number,title,body,url",
        ])
        .output()
        .context("failed to invoke gh")?;
    if !output.status.success() {
        bail!(
            "gh issue view failed for {repo}#{number}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    let issue: GithubIssue = serde_json::from_slice(&output.stdout)
        .context("unexpected gh issue view output")?;
    Ok(issue)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
