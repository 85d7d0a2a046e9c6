//! Versioned schema migrations.
//!
//! Migrations are applied in order by [`apply_migrations`]. The highest applied
//! version is recorded in `PRAGMA user_version`; each migration runs in its own
//! transaction together with the version bump, and its SQL only uses
//! `IF NOT EXISTS` statements so re-running it against a current schema is a
//! no-op.

use rusqlite::Connection;

use crate::errors::{MemoryError, Result};

pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "core_tables",
        sql: CORE_TABLES,
    },
    Migration {
        version: 2,
        name: "tracking_tables",
        sql: TRACKING_TABLES,
    },
    Migration {
        version: 3,
        name: "views_and_indexes",
        sql: VIEWS_AND_INDEXES,
    },
];

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Apply every migration newer than the store's recorded version.
/// Returns the number of migrations applied.
pub fn apply_migrations(conn: &mut Connection) -> Result<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|source| MemoryError::Migration {
                version: migration.version,
                source,
            })?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied schema migration"
        );
        applied += 1;
    }

    Ok(applied)
}

const CORE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS stories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    priority INTEGER NOT NULL DEFAULT 3 CHECK (priority BETWEEN 1 AND 5),
    assignee TEXT,
    labels TEXT,
    acceptance_criteria TEXT,
    status TEXT NOT NULL DEFAULT 'todo'
        CHECK (status IN ('todo', 'in_progress', 'blocked', 'completed')),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS defects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    severity TEXT NOT NULL
        CHECK (severity IN ('critical', 'major', 'minor', 'trivial')),
    detected_by TEXT,
    story_id INTEGER REFERENCES stories(id) ON DELETE RESTRICT,
    status TEXT NOT NULL DEFAULT 'open'
        CHECK (status IN ('open', 'in_progress', 'blocked', 'resolved', 'closed')),
    resolution TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    resolved_at TEXT
);

CREATE TABLE IF NOT EXISTS landmines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    summary TEXT NOT NULL,
    cause TEXT,
    impact TEXT,
    detection TEXT,
    remediation TEXT,
    avoidance_rules TEXT,
    tags TEXT,
    solution_verification TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS configuration (
    scope TEXT NOT NULL DEFAULT 'global',
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    source TEXT NOT NULL DEFAULT 'user',
    notes TEXT,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope, name)
);

CREATE TABLE IF NOT EXISTS agents_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    agent TEXT NOT NULL,
    action TEXT NOT NULL,
    details TEXT,
    trace_id TEXT,
    parent_id INTEGER REFERENCES agents_log(id) ON DELETE RESTRICT,
    started_at TEXT NOT NULL DEFAULT (datetime('now')),
    ended_at TEXT
);
";

const TRACKING_TABLES: &str = "
CREATE TABLE IF NOT EXISTS milestones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'planned',
    achieved_at TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS testing (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    story_id INTEGER REFERENCES stories(id) ON DELETE RESTRICT,
    suite TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    details TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS deployment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    environment TEXT NOT NULL,
    version TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    deployed_at TEXT
);
";

const VIEWS_AND_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_stories_status ON stories(status);
CREATE INDEX IF NOT EXISTS idx_defects_status ON defects(status);
CREATE INDEX IF NOT EXISTS idx_defects_story ON defects(story_id);
CREATE INDEX IF NOT EXISTS idx_landmines_updated ON landmines(updated_at);
CREATE INDEX IF NOT EXISTS idx_agents_log_trace ON agents_log(trace_id);
CREATE INDEX IF NOT EXISTS idx_agents_log_started ON agents_log(started_at);
CREATE INDEX IF NOT EXISTS idx_testing_story ON testing(story_id);

CREATE VIEW IF NOT EXISTS v_open_work AS
SELECT kind, id, title, status, priority, assignee, created_at, updated_at
FROM (
    SELECT 'story' AS kind, id, title, status, priority, assignee,
           created_at, updated_at
    FROM stories
    WHERE status IN ('todo', 'in_progress', 'blocked')
    UNION ALL
    SELECT 'defect' AS kind, id, title, status,
           CASE severity
               WHEN 'critical' THEN 1
               WHEN 'major' THEN 2
               WHEN 'minor' THEN 4
               ELSE 3
           END AS priority,
           NULL AS assignee, created_at, created_at AS updated_at
    FROM defects
    WHERE status IN ('open', 'in_progress', 'blocked')
)
ORDER BY priority ASC, created_at ASC, kind DESC, id ASC;

CREATE VIEW IF NOT EXISTS v_defects_with_stories AS
SELECT d.id, d.title, d.severity, d.status, d.story_id,
       s.title AS story_title, s.status AS story_status,
       d.created_at, d.resolved_at
FROM defects d
LEFT JOIN stories s ON s.id = d.story_id
ORDER BY d.id ASC;
";
