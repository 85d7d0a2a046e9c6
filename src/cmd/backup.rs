//! Store backup (`clide backup`).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clide::memory::MemoryBank;
use clide::ui;

use super::Session;

/// `memory_bank_backup_YYYYMMDD_HHMMSS.db` in the working directory.
fn default_backup_path() -> PathBuf {
    PathBuf::from(format!(
        "memory_bank_backup_{}.db",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn cmd_backup(session: &Session<'_>, output: Option<PathBuf>) -> Result<()> {
    session.require_store().context("Nothing to back up")?;
    let config = session.config;

    let output = output.unwrap_or_else(default_backup_path);
    ui::info(&format!("Creating backup: {}", output.display()));

    let bank = MemoryBank::new(config.db_path());
    if !bank.backup(&output) {
        bail!("Backup failed");
    }
    ui::success(&format!("Backup created successfully: {}", output.display()));

    session.record(
        &bank,
        "backup",
        format!("Created backup: {}", output.display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backup_name_shape() {
        let name = default_backup_path().display().to_string();
        assert!(name.starts_with("memory_bank_backup_"));
        assert!(name.ends_with(".db"));
        // memory_bank_backup_ + YYYYMMDD_HHMMSS + .db
        assert_eq!(name.len(), "memory_bank_backup_".len() + 15 + 3);
    }
}
