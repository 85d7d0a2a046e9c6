//! Scoped configuration entries (`clide config`).

use anyhow::{Result, bail};
use clide::ui;

use super::Session;

pub struct ConfigArgs {
    pub key: Option<String>,
    pub value: Option<String>,
    pub scope: String,
    pub delete: bool,
    pub list: bool,
    pub notes: Option<String>,
}

pub fn cmd_config(session: &Session<'_>, args: ConfigArgs) -> Result<()> {
    let bank = session.bank()?;

    if args.list {
        let entries = bank.list_all_config()?;
        if entries.is_empty() {
            ui::info("No configuration found");
        } else {
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.scope.clone(),
                        e.name.clone(),
                        ui::truncate(&e.value, 50),
                        e.source.clone(),
                    ]
                })
                .collect();
            ui::print_table("Configuration", &["Scope", "Name", "Value", "Source"], &rows);
        }
        return session.record(&bank, "config", "Listed configuration");
    }

    let Some(key) = args.key.as_deref() else {
        bail!("A configuration KEY is required unless --list is given");
    };
    let scope = args.scope.as_str();

    if args.delete {
        if !bank.delete_config(scope, key)? {
            bail!("Configuration '{}' not found in scope '{}'", key, scope);
        }
        ui::success(&format!("Deleted configuration '{}' from scope '{}'", key, scope));
        return session.record(&bank, "config", format!("Deleted {}.{}", scope, key));
    }

    match args.value.as_deref() {
        None => {
            let Some(entry) = bank.get_config_entry(scope, key)? else {
                bail!("Configuration '{}' not found in scope '{}'", key, scope);
            };
            ui::info(&format!("{}.{} = {}", entry.scope, entry.name, entry.value));
            if let Some(notes) = entry.notes.as_deref() {
                ui::info(&format!("Notes: {}", notes));
            }
            session.record(&bank, "config", format!("Read {}.{}", scope, key))
        }
        Some(value) => {
            bank.set_config(scope, key, value, "user", args.notes.as_deref())?;
            ui::success(&format!("Set {}.{} = {}", scope, key, value));
            session.record(&bank, "config", format!("Set {}.{}", scope, key))
        }
    }
}
