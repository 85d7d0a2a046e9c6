//! Work item capture (`clide story`, `clide defect`, `clide landmine`).

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clide::memory::{
    Defect, DefectStatus, MemoryBank, NewDefect, NewLandmine, NewStory, Severity,
};
use clide::ui;

use super::Session;

// ── Stories ───────────────────────────────────────────────────────────

pub struct StoryArgs {
    pub title: String,
    pub description: Option<String>,
    pub priority: i64,
    pub assignee: Option<String>,
    pub labels: Option<String>,
    pub acceptance: Option<String>,
}

pub fn cmd_story(session: &Session<'_>, args: StoryArgs) -> Result<()> {
    let bank = session.bank()?;
    let id = bank
        .create_story(NewStory {
            title: args.title.clone(),
            description: args.description,
            priority: Some(args.priority),
            assignee: args.assignee.clone(),
            labels: args.labels,
            acceptance_criteria: args.acceptance,
        })
        .context("Failed to create story")?;

    ui::success(&format!("Created story #{}: {}", id, args.title));
    ui::info(&format!(
        "Priority: {}, Assignee: {}",
        ui::format_priority(args.priority),
        args.assignee.as_deref().unwrap_or("unassigned")
    ));

    session.record(
        &bank,
        "create_story",
        format!("Created story #{}: {}", id, args.title),
    )
}

// ── Defects ───────────────────────────────────────────────────────────

pub struct DefectArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: String,
    pub story_id: Option<i64>,
    pub resolve: Option<i64>,
    pub resolution: Option<String>,
    pub close: bool,
}

pub fn cmd_defect(session: &Session<'_>, args: DefectArgs) -> Result<()> {
    let bank = session.bank()?;

    if let Some(id) = args.resolve {
        let resolution = args
            .resolution
            .as_deref()
            .or(args.title.as_deref())
            .unwrap_or("Resolved");
        let status = if args.close {
            DefectStatus::Closed
        } else {
            DefectStatus::Resolved
        };

        let defect = resolve_open_defect(&bank, id, resolution, status)?;
        let verb = if args.close { "Closed" } else { "Resolved" };
        ui::success(&format!("{} defect #{}: {}", verb, id, defect.title));
        ui::info(&format!("Resolution: {}", resolution));

        return session.record(
            &bank,
            "resolve_defect",
            format!("{} defect #{}: {}", verb, id, defect.title),
        );
    }

    let Some(title) = args.title else {
        bail!("A defect TITLE is required unless --resolve is given");
    };
    let severity = Severity::from_str(&args.severity)?;

    let mut new = NewDefect::new(title.clone(), severity);
    new.description = args.description;
    new.detected_by = Some("user".to_string());
    new.story_id = args.story_id;
    let id = bank.create_defect(new).with_context(|| match args.story_id {
        Some(story) => format!("Failed to create defect (does story #{} exist?)", story),
        None => "Failed to create defect".to_string(),
    })?;

    ui::success(&format!("Created defect #{}: {}", id, title));
    ui::info(&format!("Severity: {}", severity));
    if let Some(story) = args.story_id {
        ui::info(&format!("Linked to story #{}", story));
    }

    session.record(
        &bank,
        "create_defect",
        format!("Created defect #{}: {}", id, title),
    )
}

/// Resolve or close a defect that is still open.
///
/// Every command-layer resolve path goes through here: unknown ids and
/// defects already in a terminal status are refused before the store's
/// unconditional update runs.
pub fn resolve_open_defect(
    bank: &MemoryBank,
    id: i64,
    resolution: &str,
    status: DefectStatus,
) -> Result<Defect> {
    let Some(defect) = bank.get_defect(id)? else {
        bail!("Defect #{} not found", id);
    };
    if defect.status.is_terminal() {
        bail!("Defect #{} is already {}", id, defect.status.as_str());
    }
    bank.resolve_defect(id, resolution, status)?;
    Ok(defect)
}

// ── Landmines ─────────────────────────────────────────────────────────

pub struct LandmineArgs {
    pub summary: String,
    pub cause: Option<String>,
    pub impact: Option<String>,
    pub detection: Option<String>,
    pub remediation: Option<String>,
    pub avoidance: Option<String>,
    pub tags: Option<String>,
    pub verification: Option<String>,
}

pub fn cmd_landmine(session: &Session<'_>, args: LandmineArgs) -> Result<()> {
    let bank = session.bank()?;
    let id = bank
        .create_landmine(NewLandmine {
            summary: args.summary.clone(),
            cause: args.cause,
            impact: args.impact,
            detection: args.detection,
            remediation: args.remediation,
            avoidance_rules: args.avoidance,
            tags: args.tags.clone(),
            solution_verification: args.verification,
        })
        .context("Failed to record landmine")?;

    ui::success(&format!("Recorded landmine #{}: {}", id, args.summary));
    if let Some(tags) = args.tags.as_deref() {
        ui::info(&format!("Tags: {}", tags));
    }

    session.record(
        &bank,
        "create_landmine",
        format!("Recorded landmine #{}: {}", id, args.summary),
    )
}
