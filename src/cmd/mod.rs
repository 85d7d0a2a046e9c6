//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                                   |
//! |-------------|----------------------------------------------------|
//! | `init`      | `Init`                                             |
//! | `boot`      | `Boot`                                             |
//! | `save`      | `Save`                                             |
//! | `status`    | `Status`                                           |
//! | `fix`       | `Fix`                                              |
//! | `work`      | `Story`, `Defect`, `Landmine`                      |
//! | `report`    | `Report`                                           |
//! | `dashboard` | `Dashboard`                                        |
//! | `config`    | `Config`                                           |
//! | `backup`    | `Backup`                                           |
//! | `log`       | `Log`                                              |

pub mod backup;
pub mod boot;
pub mod config;
pub mod dashboard;
pub mod fix;
pub mod init;
pub mod log;
pub mod report;
pub mod save;
pub mod status;
pub mod work;

pub use backup::cmd_backup;
pub use boot::cmd_boot;
pub use config::{ConfigArgs, cmd_config};
pub use dashboard::cmd_dashboard;
pub use fix::cmd_fix;
pub use init::cmd_init;
pub use log::cmd_log;
pub use report::cmd_report;
pub use save::cmd_save;
pub use status::cmd_status;
pub use work::{DefectArgs, LandmineArgs, StoryArgs, cmd_defect, cmd_landmine, cmd_story};

use anyhow::{Context, Result, bail};
use clide::Config;
use clide::memory::{MemoryBank, NewAction, generate_trace_id};

/// Actor name recorded for every command-initiated log entry.
pub const AGENT: &str = "Clide";

/// Per-invocation context: resolved configuration plus the trace id that
/// groups every log entry this invocation writes.
pub struct Session<'a> {
    pub config: &'a Config,
    pub trace_id: String,
}

impl<'a> Session<'a> {
    /// Use `trace_id` when supplied, otherwise generate a fresh one.
    pub fn new(config: &'a Config, trace_id: Option<String>) -> Self {
        let trace_id = trace_id
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(generate_trace_id);
        Self { config, trace_id }
    }

    /// Open the configured store, failing with a hint when it is missing.
    pub fn bank(&self) -> Result<MemoryBank> {
        MemoryBank::open(self.config.db_path()).context("Failed to open memory bank")
    }

    /// Fail when the configuration does not point at an existing store.
    pub fn require_store(&self) -> Result<()> {
        let problems = self.config.validate();
        if !problems.is_empty() {
            bail!("{}", problems.join("; "));
        }
        Ok(())
    }

    /// Start a log entry for this invocation; pair with `MemoryBank::end_action`.
    pub fn start(&self, bank: &MemoryBank, action: &str, details: impl Into<String>) -> Result<i64> {
        bank.log_action(
            NewAction::new(AGENT, action)
                .details(details)
                .trace_id(&self.trace_id),
        )
        .with_context(|| format!("Failed to log '{}' action", action))
    }

    /// Log a completed action in one step.
    pub fn record(&self, bank: &MemoryBank, action: &str, details: impl Into<String>) -> Result<()> {
        let id = self.start(bank, action, details)?;
        bank.end_action(id)
            .with_context(|| format!("Failed to close '{}' action", action))
    }
}
