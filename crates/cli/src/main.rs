// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fleet` - enqueue coding-agent tasks and supervise the orchestrator.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod config;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "fleet", about = "Queue coding-agent tasks and manage the orchestrator")]
struct Cli {
    /// Path to the task database
    #[arg(long, global = true, default_value = "agent_fleet.db")]
    database: PathBuf,

    /// Directory for supervisor artifacts (pid file, log)
    #[arg(long = "runtime-dir", global = true, default_value = "runtime")]
    runtime_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a task against a working directory
    Enqueue(commands::enqueue::EnqueueArgs),

    /// Run the orchestrator loop in the foreground
    Run {
        /// Seconds between queue polls when idle
        #[arg(long = "poll-interval", default_value_t = 1.0)]
        poll_interval: f64,

        /// Write a pid file for the lifetime of the loop
        #[arg(long = "pid-file")]
        pid_file: Option<PathBuf>,
    },

    /// Start the orchestrator in the background
    Start {
        /// Seconds between queue polls when idle
        #[arg(long = "poll-interval", default_value_t = 1.0)]
        poll_interval: f64,
    },

    /// Stop the background orchestrator
    Stop,

    /// Show orchestrator state and recent tasks
    Status {
        /// Number of recent tasks to list
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the event log for a task's executions
    #[command(alias = "history")]
    Events {
        /// Task to inspect
        #[arg(long = "task-id")]
        task_id: String,

        /// Events shown per execution (most recent)
        #[arg(long, default_value_t = 50)]
        tail: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::new(cli.database, cli.runtime_dir);

    let result = match cli.command {
        Command::Enqueue(args) => commands::enqueue::enqueue(&config, args),
        Command::Run { poll_interval, pid_file } => {
            commands::run::run(&config, poll_interval, pid_file).await
        }
        Command::Start { poll_interval } => commands::start::start(&config, poll_interval).await,
        Command::Stop => commands::stop::stop(&config).await,
        Command::Status { limit } => commands::status::status(&config, limit),
        Command::Events { task_id, tail } => commands::events::events(&config, &task_id, tail),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
