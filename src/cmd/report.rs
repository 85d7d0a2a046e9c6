//! Table export (`clide report`).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clide::report::{self, ReportFormat, ReportTable};
use clide::ui;

use super::Session;

pub fn cmd_report(
    session: &Session<'_>,
    table: ReportTable,
    output: Option<&Path>,
    format: ReportFormat,
) -> Result<()> {
    let bank = session.bank()?;
    let rows = bank
        .read_table(table)
        .with_context(|| format!("Failed to read table '{}'", table.as_str()))?;

    if rows.is_empty() {
        ui::info(&format!("No data found for table '{}'", table.as_str()));
        return Ok(());
    }

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let content = report::render(format, table, &rows, &generated_at)
        .context("Failed to serialize report")?;

    match output {
        Some(path) => {
            std::fs::write(path, &content)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            ui::success(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", content),
    }

    session.record(
        &bank,
        "report",
        format!("Generated {} report for {}", format.as_str(), table.as_str()),
    )
}
