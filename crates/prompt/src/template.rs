// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{{ name }}` placeholder interpolation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Placeholder pattern: `{{ name }}` with optional inner whitespace.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}")
        .expect("constant regex pattern is valid")
});

/// Substitute every `{{ name }}` occurrence from the context map.
///
/// Placeholders with no context entry fail fast; the error names every
/// missing key so template and builder drift is caught in one pass.
pub fn render_template(
    template: &str,
    context: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut missing: Vec<String> = Vec::new();
    let rendered = PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match context.get(name) {
                Some(value) => value.clone(),
                None => {
                    if !missing.iter().any(|m| m == name) {
                        missing.push(name.to_string());
                    }
                    String::new()
                }
            }
        })
        .into_owned();

    if missing.is_empty() {
        Ok(rendered)
    } else {
        Err(TemplateError::MissingVariables { names: missing.join(", ") })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template references unknown variables: {names}")]
    MissingVariables { names: String },
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
