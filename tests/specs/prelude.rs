// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs.
//!
//! Each spec gets a throwaway project directory; the binary runs with
//! that directory as cwd so the default `agent_fleet.db` / `runtime`
//! paths land inside it.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;

/// A scratch project directory for one spec.
pub struct Project {
    dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A `fleet` invocation rooted in this project.
    pub fn fleet(&self) -> Command {
        let mut cmd = Command::cargo_bin("fleet").expect("fleet binary");
        cmd.current_dir(self.path());
        cmd
    }

    /// Create a subdirectory and return its absolute path as a string.
    pub fn mkdir(&self, name: &str) -> String {
        let path = self.path().join(name);
        std::fs::create_dir_all(&path).expect("mkdir");
        path.display().to_string()
    }

    /// Write an executable fake-agent script and return its path.
    pub fn script(&self, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = self.path().join(name);
        std::fs::write(&path, format!("#!/usr/bin/env bash\n{body}\n")).expect("write script");
        let mut permissions = std::fs::metadata(&path).expect("stat").permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("chmod");
        path.display().to_string()
    }
}

/// Assertion helpers over finished commands.
pub trait RunSpec {
    fn passes(&mut self) -> Output;
    fn fails(&mut self) -> Output;
}

impl RunSpec for Command {
    fn passes(&mut self) -> Output {
        let output = self.output().expect("spawn fleet");
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        output
    }

    fn fails(&mut self) -> Output {
        let output = self.output().expect("spawn fleet");
        assert!(
            !output.status.success(),
            "expected failure, got success\nstdout: {}",
            String::from_utf8_lossy(&output.stdout),
        );
        output
    }
}

pub trait OutputSpec {
    fn stdout_str(&self) -> String;
    fn stderr_str(&self) -> String;
    fn stdout_has(&self, needle: &str) -> &Self;
    fn stderr_has(&self, needle: &str) -> &Self;
}

impl OutputSpec for Output {
    fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    fn stdout_has(&self, needle: &str) -> &Self {
        let stdout = self.stdout_str();
        assert!(stdout.contains(needle), "stdout missing {needle:?}:\n{stdout}");
        self
    }

    fn stderr_has(&self, needle: &str) -> &Self {
        let stderr = self.stderr_str();
        assert!(stderr.contains(needle), "stderr missing {needle:?}:\n{stderr}");
        self
    }
}

/// Poll `probe` until it returns true or `max_ms` elapses.
#[allow(dead_code)]
pub fn wait_for(max_ms: u64, mut probe: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + std::time::Duration::from_millis(max_ms);
    while std::time::Instant::now() < deadline {
        if probe() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    false
}
