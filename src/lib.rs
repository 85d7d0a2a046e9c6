//! Clide: a project memory bank for agent-assisted development.
//!
//! Stories, defects, landmines, scoped configuration and a traced action
//! log live in one SQLite file managed by [`MemoryBank`]. The binary wraps
//! it in a CLI, report exporters, a session journal and a read-only web
//! dashboard.

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod journal;
pub mod memory;
pub mod report;
pub mod ui;

pub use config::Config;
pub use errors::{ConfigError, MemoryError};
pub use memory::MemoryBank;
