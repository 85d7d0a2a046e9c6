use std::str::FromStr;

use rusqlite::{OptionalExtension, params};

use super::db::MemoryBank;
use super::models::{Defect, DefectStatus, NewDefect, Severity};
use crate::errors::{MemoryError, Result};

pub(crate) const DEFECT_COLUMNS: &str = "id, title, description, severity, detected_by, story_id, \
     status, resolution, created_at, resolved_at";

/// SQL ordering expression for open defects; mirrors `Severity::display_rank`.
pub(crate) const SEVERITY_RANK_SQL: &str = "CASE severity \
     WHEN 'critical' THEN 1 WHEN 'major' THEN 2 WHEN 'minor' THEN 4 ELSE 3 END";

impl MemoryBank {
    /// Insert a defect with status `open` and return its id.
    ///
    /// A `story_id` that does not reference an existing story is rejected
    /// with a constraint violation.
    pub fn create_defect(&self, defect: NewDefect) -> Result<i64> {
        let id = self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO defects (title, description, severity, detected_by, story_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    defect.title,
                    defect.description,
                    defect.severity.as_str(),
                    defect.detected_by,
                    defect.story_id
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        tracing::debug!(id, severity = %defect.severity, "created defect");
        Ok(id)
    }

    pub fn get_defect(&self, id: i64) -> Result<Option<Defect>> {
        self.with_transaction(|tx| {
            let row = tx
                .query_row(
                    &format!("SELECT {DEFECT_COLUMNS} FROM defects WHERE id = ?1"),
                    params![id],
                    DefectRow::from_row,
                )
                .optional()?;
            row.map(DefectRow::into_defect).transpose()
        })
    }

    /// Non-terminal defects ordered by severity display rank, then oldest first.
    pub fn get_open_defects(&self) -> Result<Vec<Defect>> {
        self.query_defects(&format!(
            "SELECT {DEFECT_COLUMNS} FROM defects
             WHERE status IN ('open', 'in_progress', 'blocked')
             ORDER BY {SEVERITY_RANK_SQL}, created_at ASC, id ASC"
        ))
    }

    /// Every defect, newest first.
    pub fn list_defects(&self) -> Result<Vec<Defect>> {
        self.query_defects(&format!(
            "SELECT {DEFECT_COLUMNS} FROM defects ORDER BY created_at DESC, id DESC"
        ))
    }

    /// Move a defect into a terminal status, record the resolution and stamp
    /// `resolved_at`.
    ///
    /// The update is unconditional: resolving an already resolved defect
    /// overwrites the resolution and the stamp. Callers that must not
    /// re-resolve check the current status first.
    pub fn resolve_defect(&self, id: i64, resolution: &str, status: DefectStatus) -> Result<()> {
        if !status.is_terminal() {
            return Err(MemoryError::InvalidStatus {
                entity: "defect resolution",
                value: status.as_str().to_string(),
            });
        }

        let updated = self.with_transaction(|tx| {
            Ok(tx.execute(
                "UPDATE defects
                 SET status = ?1, resolution = ?2, resolved_at = datetime('now')
                 WHERE id = ?3",
                params![status.as_str(), resolution, id],
            )?)
        })?;

        if updated == 0 {
            return Err(MemoryError::NotFound { entity: "Defect", id });
        }
        tracing::debug!(id, status = status.as_str(), "resolved defect");
        Ok(())
    }

    fn query_defects(&self, sql: &str) -> Result<Vec<Defect>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(sql)?;
            let rows = stmt.query_map([], DefectRow::from_row)?;
            let mut defects = Vec::new();
            for row in rows {
                defects.push(row?.into_defect()?);
            }
            Ok(defects)
        })
    }
}

/// Intermediate row struct for defects before parsing severity and status.
pub(crate) struct DefectRow {
    id: i64,
    title: String,
    description: Option<String>,
    severity: String,
    detected_by: Option<String>,
    story_id: Option<i64>,
    status: String,
    resolution: Option<String>,
    created_at: String,
    resolved_at: Option<String>,
}

impl DefectRow {
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            severity: row.get(3)?,
            detected_by: row.get(4)?,
            story_id: row.get(5)?,
            status: row.get(6)?,
            resolution: row.get(7)?,
            created_at: row.get(8)?,
            resolved_at: row.get(9)?,
        })
    }

    pub(crate) fn into_defect(self) -> Result<Defect> {
        Ok(Defect {
            id: self.id,
            title: self.title,
            description: self.description,
            severity: Severity::from_str(&self.severity)?,
            detected_by: self.detected_by,
            story_id: self.story_id,
            status: DefectStatus::from_str(&self.status)?,
            resolution: self.resolution,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        })
    }
}
