// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn supervisor_paths_live_under_runtime_dir() {
    let config = Config::new("agent_fleet.db", "runtime");
    assert_eq!(config.pid_file_path(), Path::new("runtime/orchestrator.pid"));
    assert_eq!(config.log_file_path(), Path::new("runtime/orchestrator.log"));
    assert_eq!(config.database(), Path::new("agent_fleet.db"));
}
