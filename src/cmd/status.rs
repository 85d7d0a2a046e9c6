//! Project health snapshot (`clide status`).

use anyhow::Result;
use clide::memory::{DefectStatus, Severity, StoryStatus};
use clide::ui::{self, icons};

use super::Session;

const TOP_STORIES: usize = 5;
const CRITICAL_LIMIT: usize = 50;

pub fn cmd_status(session: &Session<'_>, detailed: bool) -> Result<()> {
    ui::success("Project Health Status");

    let bank = session.bank()?;
    let summary = bank.work_summary()?;

    let open_stories = summary.story_count(StoryStatus::Todo)
        + summary.story_count(StoryStatus::InProgress)
        + summary.story_count(StoryStatus::Blocked);
    let open_defects = summary.defect_count(DefectStatus::Open)
        + summary.defect_count(DefectStatus::InProgress)
        + summary.defect_count(DefectStatus::Blocked);

    let lines = vec![
        format!("{}Work Items: {} open", icons::SUMMARY, open_stories),
        format!("   - TODO: {}", summary.story_count(StoryStatus::Todo)),
        format!("   - In Progress: {}", summary.story_count(StoryStatus::InProgress)),
        format!("   - Blocked: {}", summary.story_count(StoryStatus::Blocked)),
        format!("   - Completed: {}", summary.story_count(StoryStatus::Completed)),
        String::new(),
        format!("{}Defects: {} open", icons::DEFECT, open_defects),
        format!("   - Open: {}", summary.defect_count(DefectStatus::Open)),
        format!("   - In Progress: {}", summary.defect_count(DefectStatus::InProgress)),
        format!("   - Blocked: {}", summary.defect_count(DefectStatus::Blocked)),
        String::new(),
        "By Severity (open):".to_string(),
        format!("   - Critical: {}", summary.open_defects(Severity::Critical)),
        format!("   - Major: {}", summary.open_defects(Severity::Major)),
        format!("   - Minor: {}", summary.open_defects(Severity::Minor)),
        format!("   - Trivial: {}", summary.open_defects(Severity::Trivial)),
        String::new(),
        format!("{}Landmines: {} recorded", icons::LANDMINE, summary.landmines),
    ];
    ui::panel("Project Health", &lines);

    if detailed {
        let stories = bank.get_open_stories()?;
        if stories.is_empty() {
            ui::info("No open stories");
        } else {
            let rows: Vec<Vec<String>> = stories
                .iter()
                .take(TOP_STORIES)
                .map(|s| {
                    vec![
                        format!("#{}", s.id),
                        ui::truncate(&s.title, 50),
                        ui::format_priority(s.priority),
                        ui::format_status(s.status.as_str()),
                    ]
                })
                .collect();
            ui::print_table(
                &format!("{}Top Priority Stories", icons::WORK),
                &["ID", "Title", "Priority", "Status"],
                &rows,
            );
        }

        let critical = bank.critical_open_defects(CRITICAL_LIMIT)?;
        if critical.is_empty() {
            ui::success("No critical defects!");
        } else {
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

    session.record(
        &bank,
        "status",
        format!(
            "Status check: {} stories, {} defects",
            open_stories, open_defects
        ),
    )
}
