// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classification of subprocess output lines.
//!
//! Each line is tried as a JSON document. Objects carry their own event
//! type; anything else that parses is a bare JSON scalar/array; parse
//! failures stay raw text attributed to their origin stream. Persisted
//! payloads for JSON lines are the canonical re-encoding (serde_json's
//! default map is ordered, so object keys come out sorted).

use fleet_core::EventSource;
use serde_json::Value;

/// Which pipe a raw line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawSource {
    Stdout,
    Stderr,
}

impl RawSource {
    fn as_event_source(self) -> EventSource {
        match self {
            RawSource::Stdout => EventSource::Stdout,
            RawSource::Stderr => EventSource::Stderr,
        }
    }
}

/// A line after classification, before persistence.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Classified {
    /// A JSON object; `event_type` is the normalized `type`/`event_type`
    /// field, `canonical` the sorted-key re-encoding.
    Json { event_type: String, canonical: String },
    /// A JSON document that is not an object.
    JsonScalar { canonical: String },
    /// Not JSON at all.
    RawText { line: String },
}

impl Classified {
    /// The `(source, event_type, payload)` triple persisted for a line
    /// that arrived on `origin`.
    pub(crate) fn into_event(self, origin: RawSource) -> (EventSource, String, String) {
        match self {
            Classified::Json { event_type, canonical } => {
                (EventSource::Json, event_type, canonical)
            }
            Classified::JsonScalar { canonical } => {
                (EventSource::Json, "json_event".to_string(), canonical)
            }
            Classified::RawText { line } => {
                (origin.as_event_source(), "raw_text".to_string(), line)
            }
        }
    }
}

/// Classify one line with its trailing newline already removed.
pub(crate) fn classify_line(line: &str) -> Classified {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Classified::RawText { line: line.to_string() };
    };
    // Canonical form cannot fail for a Value we just parsed.
    let canonical = serde_json::to_string(&value).unwrap_or_else(|_| line.to_string());
    match &value {
        Value::Object(map) => {
            let token = type_token(map);
            Classified::Json { event_type: normalize_event_type(&token), canonical }
        }
        _ => Classified::JsonScalar { canonical },
    }
}

/// The raw event-type token of a JSON object: `type`, else `event_type`,
/// else `json_event`. Null counts as absent; non-string values are used
/// in their JSON rendering.
fn type_token(map: &serde_json::Map<String, Value>) -> String {
    for key in ["type", "event_type"] {
        match map.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
        }
    }
    "json_event".to_string()
}

/// Normalize an event-type token: lowercase, every non-alphanumeric code
/// point becomes `_`, leading/trailing `_` stripped; empty results become
/// `json_event`.
pub(crate) fn normalize_event_type(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    for character in value.to_lowercase().chars() {
        if character.is_alphanumeric() {
            normalized.push(character);
        } else {
            normalized.push('_');
        }
    }
    let trimmed = normalized.trim_matches('_');
    if trimmed.is_empty() {
        "json_event".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
