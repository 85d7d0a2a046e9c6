use rusqlite::{OptionalExtension, params};

use super::db::MemoryBank;
use super::models::{Landmine, NewLandmine};
use crate::errors::Result;

const LANDMINE_COLUMNS: &str = "id, summary, cause, impact, detection, remediation, \
     avoidance_rules, tags, solution_verification, created_at, updated_at";

impl MemoryBank {
    pub fn create_landmine(&self, landmine: NewLandmine) -> Result<i64> {
        let id = self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO landmines
                 (summary, cause, impact, detection, remediation, avoidance_rules, tags, solution_verification)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    landmine.summary,
                    landmine.cause,
                    landmine.impact,
                    landmine.detection,
                    landmine.remediation,
                    landmine.avoidance_rules,
                    landmine.tags,
                    landmine.solution_verification
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        tracing::debug!(id, "recorded landmine");
        Ok(id)
    }

    pub fn get_landmine(&self, id: i64) -> Result<Option<Landmine>> {
        self.with_transaction(|tx| {
            Ok(tx
                .query_row(
                    &format!("SELECT {LANDMINE_COLUMNS} FROM landmines WHERE id = ?1"),
                    params![id],
                    landmine_from_row,
                )
                .optional()?)
        })
    }

    /// Most recently updated landmines first. `tag` filters by substring
    /// match against the free-text tags column.
    pub fn recent_landmines(&self, limit: usize, tag: Option<&str>) -> Result<Vec<Landmine>> {
        let limit = limit as i64;
        self.with_transaction(|tx| {
            let mut landmines = Vec::new();
            match tag.filter(|t| !t.is_empty()) {
                Some(tag) => {
                    let mut stmt = tx.prepare(&format!(
                        "SELECT {LANDMINE_COLUMNS} FROM landmines
                         WHERE tags LIKE ?1
                         ORDER BY updated_at DESC, id DESC LIMIT ?2"
                    ))?;
                    let pattern = format!("%{}%", tag);
                    for row in stmt.query_map(params![pattern, limit], landmine_from_row)? {
                        landmines.push(row?);
                    }
                }
                None => {
                    let mut stmt = tx.prepare(&format!(
                        "SELECT {LANDMINE_COLUMNS} FROM landmines
                         ORDER BY updated_at DESC, id DESC LIMIT ?1"
                    ))?;
                    for row in stmt.query_map(params![limit], landmine_from_row)? {
                        landmines.push(row?);
                    }
                }
            }
            Ok(landmines)
        })
    }

    pub fn count_landmines(&self) -> Result<i64> {
        self.with_transaction(|tx| {
            Ok(tx.query_row("SELECT COUNT(*) FROM landmines", [], |row| row.get(0))?)
        })
    }
}

fn landmine_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Landmine> {
    Ok(Landmine {
        id: row.get(0)?,
        summary: row.get(1)?,
        cause: row.get(2)?,
        impact: row.get(3)?,
        detection: row.get(4)?,
        remediation: row.get(5)?,
        avoidance_rules: row.get(6)?,
        tags: row.get(7)?,
        solution_verification: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
