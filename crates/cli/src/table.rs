// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared table renderer for CLI list views.
//!
//! Consistent column alignment and truncation across `fleet status` and
//! `fleet events`.

use std::io::Write;

/// Column text alignment.
pub enum Align {
    Left,
    Right,
}

/// A column definition in a [`Table`].
pub struct Column {
    pub name: &'static str,
    pub align: Align,
    /// Maximum width (`None` = unlimited). Values exceeding this are truncated.
    pub max_width: Option<usize>,
}

impl Column {
    /// Left-aligned column.
    pub fn left(name: &'static str) -> Self {
        Self { name, align: Align::Left, max_width: None }
    }

    /// Right-aligned column.
    pub fn right(name: &'static str) -> Self {
        Self { name, align: Align::Right, max_width: None }
    }

    /// Set maximum width (values exceeding this are truncated).
    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

/// A tabular renderer that auto-computes column widths from data.
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

/// Column separator: double space.
const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render header + rows. Widths are auto-computed from data; the last
    /// column is never padded when left-aligned.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths = self.compute_widths();

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| self.cell(col.name, i, col, &widths))
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP).trim_end());

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw = row.get(i).map(|s| s.as_str()).unwrap_or("");
                    self.cell(&truncate(raw, col.max_width), i, col, &widths)
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP).trim_end());
        }
    }

    fn cell(&self, text: &str, index: usize, col: &Column, widths: &[usize]) -> String {
        let is_last = index == self.columns.len() - 1;
        if is_last && matches!(col.align, Align::Left) {
            return text.to_string();
        }
        pad(text, widths[index], &col.align)
    }

    fn compute_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let data_max = self
                    .rows
                    .iter()
                    .map(|row| {
                        let raw = row.get(i).map(|s| s.as_str()).unwrap_or("");
                        truncate(raw, col.max_width).chars().count()
                    })
                    .max()
                    .unwrap_or(0);
                data_max.max(col.name.chars().count())
            })
            .collect()
    }
}

fn pad(text: &str, width: usize, align: &Align) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let padding = " ".repeat(width - len);
    match align {
        Align::Left => format!("{text}{padding}"),
        Align::Right => format!("{padding}{text}"),
    }
}

fn truncate(text: &str, max_width: Option<usize>) -> String {
    let Some(max) = max_width else {
        return text.to_string();
    };
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
