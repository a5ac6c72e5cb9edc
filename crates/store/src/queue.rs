// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO scheduling facade over the store.

use std::sync::Arc;

use fleet_core::Task;

use crate::store::{SqliteStore, StoreError};

/// First-in-first-out task queue.
///
/// Thin wrapper: ordering and the atomic claim live in the store's
/// dequeue query so that CLI enqueue and orchestrator dequeue can race
/// safely across processes.
#[derive(Clone)]
pub struct FifoQueue {
    store: Arc<SqliteStore>,
}

impl FifoQueue {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    pub fn enqueue(&self, kind: &str, payload: &str) -> Result<Task, StoreError> {
        self.store.enqueue_task(kind, payload)
    }

    /// Claim the task at the head of the queue, or `None` when nothing is
    /// queued. The claimed task is already transitioned to running.
    pub fn dequeue(&self) -> Result<Option<Task>, StoreError> {
        self.store.dequeue_next_task()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
