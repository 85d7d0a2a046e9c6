//! Memory bank: the persistent project memory behind every command.
//!
//! ## Overview
//!
//! A single SQLite file holds stories, defects, landmines, scoped
//! configuration and the agent action log. [`MemoryBank`] is a path handle;
//! every operation opens its own connection, runs inside one transaction and
//! closes the connection again, so nothing is shared between calls and
//! handles can be cloned freely into request handlers.
//!
//! ```text
//! cmd/*  dashboard/*  report
//!    │         │        │
//!    └─────────┴────────┘
//!              │  MemoryBank::{create_story, get_open_defects, log_action, …}
//!              v
//!   db.rs  with_transaction(|tx| …)   foreign_keys=ON, busy_timeout=5s
//!              │
//!              v
//!   schema.rs  MIGRATIONS → PRAGMA user_version
//! ```
//!
//! ## Module Map
//!
//! | Module      | Responsibility                                          |
//! |-------------|---------------------------------------------------------|
//! | `schema`    | Ordered migrations, tracked in `user_version`           |
//! | `db`        | `MemoryBank`: connection scope, migrate, backup, reads  |
//! | `models`    | Typed rows and enums: `Story`, `Defect`, `Severity`, …  |
//! | `stories`   | Story create / get / open / list                        |
//! | `defects`   | Defect create / get / open / list / resolve             |
//! | `landmines` | Landmine create / get / recent / count                  |
//! | `settings`  | Scoped key-value configuration upsert and lookups       |
//! | `session`   | Trace ids and the `agents_log` start/end model          |
//! | `views`     | Open work, defects with stories, critical defects       |

pub mod db;
pub mod defects;
pub mod landmines;
pub mod models;
pub mod schema;
pub mod session;
pub mod settings;
pub mod stories;
pub mod views;

pub use db::{MemoryBank, Row};
pub use models::{
    AgentAction, ConfigEntry, Defect, DefectStatus, DefectWithStory, Landmine, NewAction,
    NewDefect, NewLandmine, NewStory, OpenWorkItem, Severity, Story, StoryStatus, WorkKind,
};
pub use session::generate_trace_id;
pub use settings::GLOBAL_SCOPE;
pub use views::WorkSummary;
