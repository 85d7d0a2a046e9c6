//! Memory bank initialization (`clide init`).

use anyhow::{Context, Result, bail};
use clide::memory::MemoryBank;
use clide::ui;

use super::Session;

pub fn cmd_init(session: &Session<'_>, force: bool) -> Result<()> {
    let path = session.config.db_path();

    if path.exists() {
        if !force {
            ui::info("Use --force to re-initialize (this will destroy existing data)");
            bail!("Database already exists at {}", path.display());
        }
        ui::info(&format!("Removing existing database at {}", path.display()));
    }

    let bank = MemoryBank::new(path);
    if force {
        bank.remove().context("Failed to remove existing database")?;
    }

    ui::info(&format!("Initializing database at {}", path.display()));
    let applied = bank.migrate().context("Failed to initialize database")?;
    tracing::debug!(applied, "schema migrations applied");

    ui::success("Database initialized successfully");
    ui::info("Run 'clide boot' to load context");
    ui::info("Run 'clide dashboard' to launch web UI");

    session.record(&bank, "init", "Database initialized")?;
    Ok(())
}
