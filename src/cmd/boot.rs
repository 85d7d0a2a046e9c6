//! Context loading (`clide boot`).

use anyhow::Result;
use clide::memory::GLOBAL_SCOPE;
use clide::ui::{self, icons};

use super::Session;

const OPEN_WORK_LIMIT: usize = 20;
const LANDMINE_LIMIT: usize = 10;
const CRITICAL_LIMIT: usize = 50;

pub fn cmd_boot(session: &Session<'_>, summary: bool) -> Result<()> {
    ui::success("Booting Clide context...");

    let bank = session.bank()?;
    let log_id = session.start(&bank, "boot", "Loading context")?;

    let open_work = bank.open_work(OPEN_WORK_LIMIT)?;
    ui::info(&format!("Found {} open work items", open_work.len()));
    if !summary && !open_work.is_empty() {
        let rows: Vec<Vec<String>> = open_work
            .iter()
            .map(|item| {
                vec![
                    item.kind.as_str().to_string(),
                    format!("#{}", item.id),
                    ui::truncate(&item.title, 40),
                    ui::format_status(&item.status),
                    ui::format_priority(item.priority),
                ]
            })
            .collect();
        ui::print_table(
            &format!("{}Open Work", icons::WORK),
            &["Kind", "ID", "Title", "Status", "Priority"],
            &rows,
        );
    }

    let landmines = bank.recent_landmines(LANDMINE_LIMIT, None)?;
    ui::info(&format!("Found {} recent landmines", landmines.len()));
    if !summary && !landmines.is_empty() {
        let rows: Vec<Vec<String>> = landmines
            .iter()
            .map(|l| {
                vec![
                    format!("#{}", l.id),
                    ui::truncate(&l.summary, 50),
                    l.tags.clone().unwrap_or_default(),
                ]
            })
            .collect();
        ui::print_table(
            &format!("{}Recent Landmines", icons::LANDMINE),
            &["ID", "Summary", "Tags"],
            &rows,
        );
    }

    let critical = bank.critical_open_defects(CRITICAL_LIMIT)?;
    if !critical.is_empty() {
        ui::warning(&format!(
            "{} CRITICAL defects require attention!",
            critical.len()
        ));
        if !summary {
            let rows: Vec<Vec<String>> = critical
                .iter()
                .map(|d| {
                    vec![
                        format!("#{}", d.id),
                        ui::truncate(&d.title, 50),
                        ui::format_status(d.status.as_str()),
                    ]
                })
                .collect();
            ui::print_table(
                &format!("{}Critical Defects", icons::DEFECT),
                &["ID", "Title", "Status"],
                &rows,
            );
        }
    }

    let settings = bank.get_config(GLOBAL_SCOPE)?;
    if !settings.is_empty() && !summary {
        ui::info(&format!("Configuration: {} settings loaded", settings.len()));
    }

    ui::success("Context loaded successfully");
    ui::info(&format!("Session trace ID: {}", session.trace_id));

    bank.end_action(log_id)?;
    Ok(())
}
