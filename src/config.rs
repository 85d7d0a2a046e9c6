use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

pub const DEFAULT_DB_PATH: &str = "memory_bank.db";
pub const DEFAULT_DASHBOARD_HOST: &str = "127.0.0.1";
pub const DEFAULT_DASHBOARD_PORT: u16 = 5000;
pub const DEFAULT_JOURNAL_PATH: &str = "agents_log.md";

/// Process configuration, built once at startup and passed to every command.
///
/// Values are layered: built-in defaults, then environment variables
/// (optionally seeded from a `.env` file), then CLI flags applied by the
/// caller through the `with_*` helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub dashboard_host: String,
    pub dashboard_port: u16,
    pub verbose: bool,
    /// Markdown session journal appended to by `clide save`.
    pub journal_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            dashboard_host: DEFAULT_DASHBOARD_HOST.to_string(),
            dashboard_port: DEFAULT_DASHBOARD_PORT,
            verbose: false,
            journal_path: PathBuf::from(DEFAULT_JOURNAL_PATH),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(db) = lookup("CLIDE_DB").filter(|v| !v.is_empty()) {
            config.db_path = PathBuf::from(db);
        }
        if let Some(host) = lookup("CLIDE_DASHBOARD_HOST").filter(|v| !v.is_empty()) {
            config.dashboard_host = host;
        }
        if let Some(port) = lookup("CLIDE_DASHBOARD_PORT") {
            config.dashboard_port = port.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: "CLIDE_DASHBOARD_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(verbose) = lookup("CLIDE_VERBOSE") {
            config.verbose = parse_bool("CLIDE_VERBOSE", &verbose)?;
        }
        if let Some(journal) = lookup("CLIDE_AGENTS_LOG").filter(|v| !v.is_empty()) {
            config.journal_path = PathBuf::from(journal);
        }

        Ok(config)
    }

    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }

    /// A `--verbose` flag can only turn verbosity on, never off.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = self.verbose || verbose;
        self
    }

    pub fn db_exists(&self) -> bool {
        self.db_path.exists()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Check the configuration against the filesystem; returns the list of problems.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.db_exists() {
            errors.push(format!(
                "Database not found at '{}'. Run 'clide init' to create it.",
                self.db_path.display()
            ));
        }
        errors
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}
