use std::collections::BTreeMap;
use std::str::FromStr;

use rusqlite::{Transaction, params};
use serde::Serialize;

use super::db::MemoryBank;
use super::defects::{DEFECT_COLUMNS, DefectRow};
use super::models::{
    Defect, DefectStatus, DefectWithStory, OpenWorkItem, Severity, StoryStatus, WorkKind,
};
use crate::errors::Result;

// ── Work summary ─────────────────────────────────────────────────────

/// Counts shown by the `status` command.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct WorkSummary {
    /// Story counts keyed by status string.
    pub stories: BTreeMap<String, i64>,
    /// Defect counts keyed by status string.
    pub defects: BTreeMap<String, i64>,
    /// Open defect counts keyed by severity string.
    pub open_by_severity: BTreeMap<String, i64>,
    pub landmines: i64,
}

impl WorkSummary {
    pub fn total_stories(&self) -> i64 {
        self.stories.values().sum()
    }

    pub fn total_defects(&self) -> i64 {
        self.defects.values().sum()
    }

    pub fn story_count(&self, status: StoryStatus) -> i64 {
        self.stories.get(status.as_str()).copied().unwrap_or(0)
    }

    pub fn defect_count(&self, status: DefectStatus) -> i64 {
        self.defects.get(status.as_str()).copied().unwrap_or(0)
    }

    pub fn open_defects(&self, severity: Severity) -> i64 {
        self.open_by_severity
            .get(severity.as_str())
            .copied()
            .unwrap_or(0)
    }
}

fn grouped_counts(tx: &Transaction<'_>, sql: &str) -> Result<BTreeMap<String, i64>> {
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
}

impl MemoryBank {
    /// Unified open stories and defects ordered by priority then age.
    pub fn open_work(&self, limit: usize) -> Result<Vec<OpenWorkItem>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(
                "SELECT kind, id, title, status, priority, assignee, created_at, updated_at
                 FROM v_open_work LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], OpenWorkRow::from_row)?;
            let mut items = Vec::new();
            for row in rows {
                items.push(row?.into_item()?);
            }
            Ok(items)
        })
    }

    /// Every defect joined with its story's title and status, by id.
    pub fn defects_with_stories(&self) -> Result<Vec<DefectWithStory>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(
                "SELECT id, title, severity, status, story_id, story_title, story_status,
                        created_at, resolved_at
                 FROM v_defects_with_stories",
            )?;
            let rows = stmt.query_map([], DefectWithStoryRow::from_row)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?.into_defect_with_story()?);
            }
            Ok(out)
        })
    }

    /// Open critical defects, most recently filed first.
    pub fn critical_open_defects(&self, limit: usize) -> Result<Vec<Defect>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {DEFECT_COLUMNS} FROM defects
                 WHERE severity = 'critical' AND status IN ('open', 'in_progress', 'blocked')
                 ORDER BY id DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], DefectRow::from_row)?;
            let mut defects = Vec::new();
            for row in rows {
                defects.push(row?.into_defect()?);
            }
            Ok(defects)
        })
    }

    pub fn work_summary(&self) -> Result<WorkSummary> {
        self.with_transaction(|tx| {
            Ok(WorkSummary {
                stories: grouped_counts(
                    tx,
                    "SELECT status, COUNT(*) FROM stories GROUP BY status",
                )?,
                defects: grouped_counts(
                    tx,
                    "SELECT status, COUNT(*) FROM defects GROUP BY status",
                )?,
                open_by_severity: grouped_counts(
                    tx,
                    "SELECT severity, COUNT(*) FROM defects
                     WHERE status IN ('open', 'in_progress', 'blocked')
                     GROUP BY severity",
                )?,
                landmines: tx.query_row("SELECT COUNT(*) FROM landmines", [], |row| row.get(0))?,
            })
        })
    }
}

/// Intermediate row struct for `v_open_work` before parsing the kind.
struct OpenWorkRow {
    kind: String,
    id: i64,
    title: String,
    status: String,
    priority: i64,
    assignee: Option<String>,
    created_at: String,
    updated_at: String,
}

impl OpenWorkRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            kind: row.get(0)?,
            id: row.get(1)?,
            title: row.get(2)?,
            status: row.get(3)?,
            priority: row.get(4)?,
            assignee: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_item(self) -> Result<OpenWorkItem> {
        Ok(OpenWorkItem {
            kind: WorkKind::from_str(&self.kind)?,
            id: self.id,
            title: self.title,
            status: self.status,
            priority: self.priority,
            assignee: self.assignee,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Intermediate row struct for `v_defects_with_stories`.
struct DefectWithStoryRow {
    id: i64,
    title: String,
    severity: String,
    status: String,
    story_id: Option<i64>,
    story_title: Option<String>,
    story_status: Option<String>,
    created_at: String,
    resolved_at: Option<String>,
}

impl DefectWithStoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            severity: row.get(2)?,
            status: row.get(3)?,
            story_id: row.get(4)?,
            story_title: row.get(5)?,
            story_status: row.get(6)?,
            created_at: row.get(7)?,
            resolved_at: row.get(8)?,
        })
    }

    fn into_defect_with_story(self) -> Result<DefectWithStory> {
        Ok(DefectWithStory {
            id: self.id,
            title: self.title,
            severity: Severity::from_str(&self.severity)?,
            status: DefectStatus::from_str(&self.status)?,
            story_id: self.story_id,
            story_title: self.story_title,
            story_status: self
                .story_status
                .as_deref()
                .map(StoryStatus::from_str)
                .transpose()?,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MemoryError;
    use crate::memory::db::test_bank;
    use crate::memory::models::{NewDefect, NewLandmine, NewStory};

    #[test]
    fn test_open_work_interleaves_stories_and_defects_by_priority() {
        let (_dir, bank) = test_bank();
        let story_p3 = bank.create_story(NewStory::new("Refactor")).unwrap();
        let minor = bank.create_defect(NewDefect::new("Typo", Severity::Minor)).unwrap();
        let critical = bank
            .create_defect(NewDefect::new("Data loss", Severity::Critical))
            .unwrap();
        let story_p1 = bank.create_story(NewStory::new("Ship").priority(1)).unwrap();

        let work = bank.open_work(50).unwrap();
        let keys: Vec<(WorkKind, i64)> = work.iter().map(|w| (w.kind, w.id)).collect();
        assert_eq!(
            keys,
            vec![
                (WorkKind::Story, story_p1),
                (WorkKind::Defect, critical),
                (WorkKind::Story, story_p3),
                (WorkKind::Defect, minor),
            ]
        );
        assert_eq!(work[1].priority, 1);
        assert!(work[1].assignee.is_none());
    }

    #[test]
    fn test_open_work_excludes_terminal_items_and_respects_limit() {
        let (_dir, bank) = test_bank();
        let fixed = bank.create_defect(NewDefect::new("Fixed", Severity::Major)).unwrap();
        bank.resolve_defect(fixed, "done", DefectStatus::Resolved).unwrap();
        for title in ["a", "b", "c"] {
            bank.create_story(NewStory::new(title)).unwrap();
        }

        let work = bank.open_work(50).unwrap();
        assert_eq!(work.len(), 3);
        assert!(work.iter().all(|w| w.kind == WorkKind::Story));
        assert_eq!(bank.open_work(2).unwrap().len(), 2);
    }

    #[test]
    fn test_defects_with_stories_joins_story_fields() {
        let (_dir, bank) = test_bank();
        let story = bank.create_story(NewStory::new("Checkout")).unwrap();
        let mut linked = NewDefect::new("Wrong total", Severity::Major);
        linked.story_id = Some(story);
        bank.create_defect(linked).unwrap();
        bank.create_defect(NewDefect::new("Unlinked", Severity::Minor))
            .unwrap();

        let rows = bank.defects_with_stories().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].story_title.as_deref(), Some("Checkout"));
        assert_eq!(rows[0].story_status, Some(StoryStatus::Todo));
        assert!(rows[1].story_title.is_none());
        assert!(rows[1].story_status.is_none());
    }

    #[test]
    fn test_open_work_rejects_unknown_kind() {
        let row = OpenWorkRow {
            kind: "epic".into(),
            id: 1,
            title: "Roadmap".into(),
            status: "todo".into(),
            priority: 3,
            assignee: None,
            created_at: "2024-01-01 00:00:00".into(),
            updated_at: "2024-01-01 00:00:00".into(),
        };
        let err = row.into_item().unwrap_err();
        assert!(matches!(err, MemoryError::InvalidWorkKind(ref k) if k == "epic"));
    }

    #[test]
    fn test_critical_open_defects_newest_first() {
        let (_dir, bank) = test_bank();
        let older = bank.create_defect(NewDefect::new("c1", Severity::Critical)).unwrap();
        bank.create_defect(NewDefect::new("m", Severity::Major)).unwrap();
        let newer = bank.create_defect(NewDefect::new("c2", Severity::Critical)).unwrap();
        let closed = bank.create_defect(NewDefect::new("c3", Severity::Critical)).unwrap();
        bank.resolve_defect(closed, "gone", DefectStatus::Closed).unwrap();

        let ids: Vec<i64> = bank
            .critical_open_defects(20)
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
        assert_eq!(bank.critical_open_defects(1).unwrap().len(), 1);
    }

    #[test]
    fn test_work_summary_counts() {
        let (_dir, bank) = test_bank();
        bank.create_story(NewStory::new("a")).unwrap();
        bank.create_story(NewStory::new("b")).unwrap();
        let crit = bank.create_defect(NewDefect::new("c", Severity::Critical)).unwrap();
        bank.create_defect(NewDefect::new("d", Severity::Critical)).unwrap();
        bank.create_defect(NewDefect::new("e", Severity::Minor)).unwrap();
        bank.resolve_defect(crit, "fixed", DefectStatus::Resolved).unwrap();
        bank.create_landmine(NewLandmine::new("trap")).unwrap();

        let summary = bank.work_summary().unwrap();
        assert_eq!(summary.total_stories(), 2);
        assert_eq!(summary.story_count(StoryStatus::Todo), 2);
        assert_eq!(summary.story_count(StoryStatus::Completed), 0);
        assert_eq!(summary.total_defects(), 3);
        assert_eq!(summary.defect_count(DefectStatus::Open), 2);
        assert_eq!(summary.defect_count(DefectStatus::Resolved), 1);
        assert_eq!(summary.open_defects(Severity::Critical), 1);
        assert_eq!(summary.open_defects(Severity::Minor), 1);
        assert_eq!(summary.landmines, 1);
    }

    #[test]
    fn test_empty_store_summary_is_zero() {
        let (_dir, bank) = test_bank();
        assert_eq!(bank.work_summary().unwrap(), WorkSummary::default());
        assert!(bank.open_work(10).unwrap().is_empty());
    }
}
