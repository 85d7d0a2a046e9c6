//! Session checkpoint (`clide save`).

use anyhow::Result;
use chrono::Local;
use clide::journal;
use clide::ui;

use super::Session;

pub fn cmd_save(session: &Session<'_>, message: Option<&str>) -> Result<()> {
    let details = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or("Session checkpoint");

    let bank = session.bank()?;
    let log_id = session.start(&bank, "save", details)?;

    ui::success(&format!("Session saved (trace: {})", session.trace_id));
    ui::info(&format!("Log entry #{}", log_id));

    let stories = bank.get_open_stories()?;
    let defects = bank.get_open_defects()?;
    ui::info(&format!(
        "Current state: {} open stories, {} open defects",
        stories.len(),
        defects.len()
    ));

    let now = Local::now();
    let entry = journal::save_entry(&now.format("%H:%M:%S").to_string(), details, &session.trace_id);
    let journal_path = &session.config.journal_path;
    if journal::append_entry(journal_path, &entry, now.date_naive()) {
        ui::info(&format!("Updated {}", journal_path.display()));
    } else {
        ui::warning(&format!(
            "Could not update {} (continuing anyway)",
            journal_path.display()
        ));
    }

    bank.end_action(log_id)?;
    Ok(())
}
