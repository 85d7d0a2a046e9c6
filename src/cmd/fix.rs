//! Defect triage (`clide fix`).

use anyhow::{Result, bail};
use clide::ui;

use super::Session;

pub fn cmd_fix(session: &Session<'_>, defect_id: Option<i64>, auto: bool) -> Result<()> {
    let bank = session.bank()?;

    let Some(id) = defect_id else {
        let defects = bank.get_open_defects()?;
        if defects.is_empty() {
            ui::success("No open defects!");
        } else {
            ui::info(&format!("Found {} open defects:", defects.len()));
            let rows: Vec<Vec<String>> = defects
                .iter()
                .map(|d| {
                    vec![
                        format!("#{}", d.id),
                        ui::truncate(&d.title, 50),
                        d.severity.to_string(),
                        ui::format_status(d.status.as_str()),
                    ]
                })
                .collect();
            ui::print_table("Open Defects", &["ID", "Title", "Severity", "Status"], &rows);
            ui::info("Run 'clide fix <ID>' to fix a specific defect");
        }
        return session.record(
            &bank,
            "fix",
            format!("Listed {} open defects", defects.len()),
        );
    };

    let Some(defect) = bank.get_defect(id)? else {
        bail!("Defect #{} not found", id);
    };

    ui::info(&format!("Analyzing defect #{}: {}", id, defect.title));
    ui::info(&format!("Severity: {}", defect.severity));
    ui::info(&format!("Status: {}", ui::format_status(defect.status.as_str())));
    if let Some(description) = defect.description.as_deref() {
        ui::info(&format!("Description: {}", description));
    }
    if let Some(story_id) = defect.story_id {
        ui::info(&format!("Linked story: #{}", story_id));
    }

    if auto {
        ui::warning("Auto-fix mode is not available");
        ui::info("Fix the defect manually, then mark it resolved with 'clide defect --resolve'");
    } else {
        ui::heading("Suggested fix workflow:");
        ui::info("1. Investigate the root cause");
        ui::info("2. Implement the fix in your code");
        ui::info("3. Test the fix thoroughly");
        ui::info(&format!("4. Mark as resolved: clide defect --resolve {}", id));
    }

    session.record(&bank, "fix", format!("Analyzed defect #{}", id))
}
