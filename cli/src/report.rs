//! Plain-text and JSON rendering of harness results.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use vsum_core::{Results, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Rows of cells padded to the widest cell of each column.
#[derive(Debug, Default)]
pub struct TextTable {
    current: Vec<String>,
    rows: Vec<Vec<String>>,
    alignment: BTreeMap<usize, Alignment>,
}

impl TextTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alignment(&mut self, column: usize, alignment: Alignment) {
        self.alignment.insert(column, alignment);
    }

    pub fn add(&mut self, content: impl Into<String>) {
        self.current.push(content.into());
    }

    pub fn end_of_row(&mut self) {
        self.rows.push(std::mem::take(&mut self.current));
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }
}

impl fmt::Display for TextTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = widths[i];
                match self.alignment.get(&i).copied().unwrap_or_default() {
                    Alignment::Left => write!(f, "{:<width$}", cell, width = width)?,
                    Alignment::Right => write!(f, "{:>width$}", cell, width = width)?,
                }
                f.write_str("  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Human-readable time, `!!!` when the strategy was rejected.
pub fn format_time(time: Option<Duration>) -> String {
    let Some(time) = time else {
        return "!!!".to_string();
    };

    let ns = time.as_nanos();
    if ns >= 1_000_000_000 {
        format!("{:.2} s", ns as f64 / 1e9)
    } else if ns >= 1_000_000 {
        format!("{:.2} ms", ns as f64 / 1e6)
    } else if ns >= 1_000 {
        format!("{:.2} us", ns as f64 / 1e3)
    } else {
        format!("{} ns", ns)
    }
}

/// Table with the label column first and one column per strategy.
pub fn results_table() -> TextTable {
    let mut table = TextTable::new();
    table.add("");
    for strategy in Strategy::ALL {
        table.add(strategy.label());
    }
    table.end_of_row();
    table.set_alignment(0, Alignment::Right);
    table
}

pub fn add_table_row(table: &mut TextTable, label: &str, results: &Results) {
    table.add(label);
    for (_, time) in results.iter() {
        table.add(format_time(time));
    }
    table.end_of_row();
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub threads: usize,
    pub scale: f64,
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub scenario: String,
    pub title: String,
    pub vectors: usize,
    pub elements: usize,
    /// Nanoseconds per strategy key, `null` when invalid.
    pub results: BTreeMap<&'static str, Option<u64>>,
}

impl ReportRow {
    pub fn new(scenario: &str, title: &str, vectors: usize, elements: usize, results: &Results) -> Self {
        let results = results
            .iter()
            .map(|(strategy, time)| (strategy.key(), time.map(|d| d.as_nanos() as u64)))
            .collect();
        Self {
            scenario: scenario.to_string(),
            title: title.to_string(),
            vectors,
            elements,
            results,
        }
    }
}
