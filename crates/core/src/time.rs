// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp formatting for persisted rows.

use chrono::{SecondsFormat, Utc};

/// Current UTC time as ISO-8601 with microsecond precision and a `+00:00`
/// offset, e.g. `2026-03-01T14:05:09.123456+00:00`.
///
/// Fixed-width fields make these strings order lexicographically, which the
/// store's `ORDER BY` clauses rely on.
pub fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
