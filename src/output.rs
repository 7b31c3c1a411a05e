//! Summary export and console preview.

use crate::data::CleaningReport;
use crate::stats::{Breakdown, CategoryCount, ColumnSummary};
use serde::Serialize;
use std::path::Path;

/// Everything a run found, as written to the summary file.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary<'a> {
    pub input: String,
    pub heatmap: Option<String>,
    pub cleaning: &'a CleaningReport,
    pub breakdowns: &'a [Breakdown],
    pub numeric_columns: &'a [ColumnSummary],
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn preview_entry(c: &CategoryCount) -> String {
    format!("{}={}", c.label, c.count)
}

/// Log the top categories of each breakdown.
pub fn log_breakdowns(breakdowns: &[Breakdown], max_rows: usize) {
    for b in breakdowns {
        let preview: Vec<String> = b
            .counts
            .iter()
            .take(max_rows)
            .map(preview_entry)
            .collect();
        let more = b.counts.len().saturating_sub(max_rows);
        let suffix = if more > 0 { format!(" (+{more} more)") } else { String::new() };

        match b.p_value {
            Some(p) => log::info!(
                "{}: {}{} | uniformity p={:.4}{}",
                b.column,
                preview.join(", "),
                suffix,
                p,
                if b.is_significant { " *" } else { "" }
            ),
            None => log::info!("{}: {}{}", b.column, preview.join(", "), suffix),
        }
    }
}
