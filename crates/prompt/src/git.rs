// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git state probing for prompt policy blocks.
//!
//! All probes shell out to the host `git` binary with the working
//! directory as cwd. A non-zero exit (or a missing `git`) means the
//! feature is absent, never an error.

use std::path::Path;
use std::process::Command;

/// True when `dir` is inside a git worktree.
pub fn is_inside_work_tree(dir: &Path) -> bool {
    run_git(dir, &["rev-parse", "--is-inside-work-tree"])
        .map(|out| out == "true")
        .unwrap_or(false)
}

/// True when at least one remote is configured.
pub fn has_remote(dir: &Path) -> bool {
    run_git(dir, &["remote"]).is_some()
}

/// URL of the first configured remote, if any.
pub fn first_remote_url(dir: &Path) -> Option<String> {
    let remotes = run_git(dir, &["remote"])?;
    let first = remotes.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    run_git(dir, &["remote", "get-url", first])
}

/// True when the first remote points at a host with a pull/merge-request
/// workflow.
pub fn suggests_pull_request_workflow(dir: &Path) -> bool {
    first_remote_url(dir)
        .map(|url| url.contains("github.com") || url.contains("gitlab.com"))
        .unwrap_or(false)
}

fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).current_dir(dir).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
