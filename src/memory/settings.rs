//! Scoped key-value configuration entries stored in the `configuration` table.

use rusqlite::{OptionalExtension, params};

use super::db::MemoryBank;
use super::models::ConfigEntry;
use crate::errors::Result;

pub const GLOBAL_SCOPE: &str = "global";

const ENTRY_COLUMNS: &str = "scope, name, value, source, notes, updated_at";

impl MemoryBank {
    /// Upsert keyed by `(scope, name)`: an existing entry has its value,
    /// source and notes overwritten and `updated_at` refreshed.
    pub fn set_config(
        &self,
        scope: &str,
        name: &str,
        value: &str,
        source: &str,
        notes: Option<&str>,
    ) -> Result<()> {
        self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO configuration (scope, name, value, source, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(scope, name) DO UPDATE SET
                     value = excluded.value,
                     source = excluded.source,
                     notes = excluded.notes,
                     updated_at = datetime('now')",
                params![scope, name, value, source, notes],
            )?;
            Ok(())
        })?;
        tracing::debug!(scope, name, "configuration set");
        Ok(())
    }

    /// Entries in one scope, ordered by name.
    pub fn get_config(&self, scope: &str) -> Result<Vec<ConfigEntry>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM configuration WHERE scope = ?1 ORDER BY name"
            ))?;
            let rows = stmt.query_map(params![scope], entry_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    pub fn get_config_entry(&self, scope: &str, name: &str) -> Result<Option<ConfigEntry>> {
        self.with_transaction(|tx| {
            Ok(tx
                .query_row(
                    &format!(
                        "SELECT {ENTRY_COLUMNS} FROM configuration WHERE scope = ?1 AND name = ?2"
                    ),
                    params![scope, name],
                    entry_from_row,
                )
                .optional()?)
        })
    }

    /// Every entry across all scopes, ordered by scope then name.
    pub fn list_all_config(&self) -> Result<Vec<ConfigEntry>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM configuration ORDER BY scope, name"
            ))?;
            let rows = stmt.query_map([], entry_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Returns `false` when no entry matched.
    pub fn delete_config(&self, scope: &str, name: &str) -> Result<bool> {
        let deleted = self.with_transaction(|tx| {
            Ok(tx.execute(
                "DELETE FROM configuration WHERE scope = ?1 AND name = ?2",
                params![scope, name],
            )?)
        })?;
        Ok(deleted > 0)
    }
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConfigEntry> {
    Ok(ConfigEntry {
        scope: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        source: row.get(3)?,
        notes: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
