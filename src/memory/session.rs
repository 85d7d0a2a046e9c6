//! Session action log.
//!
//! A session is identified by a trace id generated once per invocation and
//! threaded through every [`MemoryBank::log_action`] call. `log_action` and
//! `end_action` are separate transactions: an entry whose `ended_at` stays
//! null records an action that never completed.

use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use super::db::MemoryBank;
use super::models::{AgentAction, NewAction};
use crate::errors::{MemoryError, Result};

const ACTION_COLUMNS: &str = "id, agent, action, details, trace_id, parent_id, started_at, ended_at";

/// A fresh random (v4) trace id in canonical hyphenated form.
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

impl MemoryBank {
    /// Record the start of an action and return the entry id.
    pub fn log_action(&self, action: NewAction) -> Result<i64> {
        let id = self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO agents_log (agent, action, details, trace_id, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    action.agent,
                    action.action,
                    action.details,
                    action.trace_id,
                    action.parent_id
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        tracing::debug!(
            id,
            agent = %action.agent,
            action = %action.action,
            trace_id = action.trace_id.as_deref().unwrap_or("-"),
            "action logged"
        );
        Ok(id)
    }

    /// Stamp `ended_at` on a logged action.
    pub fn end_action(&self, id: i64) -> Result<()> {
        let updated = self.with_transaction(|tx| {
            Ok(tx.execute(
                "UPDATE agents_log SET ended_at = datetime('now') WHERE id = ?1",
                params![id],
            )?)
        })?;
        if updated == 0 {
            return Err(MemoryError::NotFound { entity: "Action", id });
        }
        Ok(())
    }

    pub fn get_action(&self, id: i64) -> Result<Option<AgentAction>> {
        self.with_transaction(|tx| {
            Ok(tx
                .query_row(
                    &format!("SELECT {ACTION_COLUMNS} FROM agents_log WHERE id = ?1"),
                    params![id],
                    action_from_row,
                )
                .optional()?)
        })
    }

    /// Latest actions first, optionally limited to one agent.
    pub fn recent_actions(&self, limit: usize, agent: Option<&str>) -> Result<Vec<AgentAction>> {
        let limit = limit as i64;
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {ACTION_COLUMNS} FROM agents_log
                 WHERE (?1 IS NULL OR agent = ?1)
                 ORDER BY started_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![agent, limit], action_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Every action of one session, in the order they were logged.
    pub fn actions_for_trace(&self, trace_id: &str) -> Result<Vec<AgentAction>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {ACTION_COLUMNS} FROM agents_log WHERE trace_id = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![trace_id], action_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}

fn action_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AgentAction> {
    Ok(AgentAction {
        id: row.get(0)?,
        agent: row.get(1)?,
        action: row.get(2)?,
        details: row.get(3)?,
        trace_id: row.get(4)?,
        parent_id: row.get(5)?,
        started_at: row.get(6)?,
        ended_at: row.get(7)?,
    })
}
