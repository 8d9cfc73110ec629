//! Result shaping for the presentation layer.
//!
//! Three user-visible cases, kept distinct: no SQL was produced, the SQL ran
//! and returned nothing, the SQL ran and returned rows. Execution failures
//! pass the store's error text through untouched.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::ExecutionOutcome;
use crate::synthesizer::GeneratedSql;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedResult {
    pub title: String,
    /// One-line natural-language gloss of what happened.
    pub gloss: String,
    /// Aligned text table; empty when there are no rows.
    pub table: String,
    pub row_count: usize,
}

pub struct ResultFormatter;

impl ResultFormatter {
    /// Gloss for a request that never reached the store.
    pub fn no_query(generated: &GeneratedSql) -> FormattedResult {
        FormattedResult {
            title: generated.title.clone(),
            gloss: "Could not determine a query for that question. Try naming a player, a team, or a stat.".to_string(),
            table: String::new(),
            row_count: 0,
        }
    }

    pub fn format(generated: &GeneratedSql, outcome: &ExecutionOutcome) -> FormattedResult {
        if !outcome.success {
            return FormattedResult {
                title: generated.title.clone(),
                gloss: format!(
                    "Query execution failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                ),
                table: String::new(),
                row_count: 0,
            };
        }

        if outcome.rows.is_empty() {
            return FormattedResult {
                title: generated.title.clone(),
                gloss: "The query ran but returned no rows.".to_string(),
                table: String::new(),
                row_count: 0,
            };
        }

        FormattedResult {
            title: generated.title.clone(),
            gloss: format!(
                "{} ({} row{}, {}ms)",
                generated.title,
                outcome.rows.len(),
                if outcome.rows.len() == 1 { "" } else { "s" },
                outcome.elapsed_ms
            ),
            table: Self::render_table(&outcome.columns, &outcome.rows),
            row_count: outcome.rows.len(),
        }
    }

    fn cell_text(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    fn render_table(columns: &[String], rows: &[HashMap<String, Value>]) -> String {
        let widths: Vec<usize> = columns
            .iter()
            .map(|col| {
                rows.iter()
                    .map(|row| Self::cell_text(row.get(col)).len())
                    .chain(std::iter::once(col.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header = columns
            .iter()
            .zip(&widths)
            .map(|(col, width)| format!("{:1$}", col, *width))
            .join(" | ");
        let separator = widths.iter().map(|w| "-".repeat(*w)).join("-+-");
        let body = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .zip(&widths)
                    .map(|(col, width)| format!("{:1$}", Self::cell_text(row.get(col)), *width))
                    .join(" | ")
            })
            .join("\n");

        format!("{}\n{}\n{}", header, separator, body)
    }
}
