use std::str::FromStr;

use rusqlite::{OptionalExtension, params};

use super::db::MemoryBank;
use super::models::{DEFAULT_STORY_PRIORITY, NewStory, Story, StoryStatus};
use crate::errors::{MemoryError, Result};

const STORY_COLUMNS: &str = "id, title, description, priority, assignee, labels, \
     acceptance_criteria, status, created_at, updated_at";

impl MemoryBank {
    /// Insert a story and return its id. Priority defaults to 3 and must be 1-5.
    pub fn create_story(&self, story: NewStory) -> Result<i64> {
        let priority = story.priority.unwrap_or(DEFAULT_STORY_PRIORITY);
        if !(1..=5).contains(&priority) {
            return Err(MemoryError::InvalidPriority(priority));
        }

        let id = self.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO stories (title, description, priority, assignee, labels, acceptance_criteria)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    story.title,
                    story.description,
                    priority,
                    story.assignee,
                    story.labels,
                    story.acceptance_criteria
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        tracing::debug!(id, priority, "created story");
        Ok(id)
    }

    pub fn get_story(&self, id: i64) -> Result<Option<Story>> {
        self.with_transaction(|tx| {
            let row = tx
                .query_row(
                    &format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = ?1"),
                    params![id],
                    StoryRow::from_row,
                )
                .optional()?;
            row.map(StoryRow::into_story).transpose()
        })
    }

    /// Stories not yet completed, most urgent first, oldest first within a priority.
    pub fn get_open_stories(&self) -> Result<Vec<Story>> {
        self.query_stories(&format!(
            "SELECT {STORY_COLUMNS} FROM stories
             WHERE status IN ('todo', 'in_progress', 'blocked')
             ORDER BY priority ASC, created_at ASC, id ASC"
        ))
    }

    /// Every story, newest first.
    pub fn list_stories(&self) -> Result<Vec<Story>> {
        self.query_stories(&format!(
            "SELECT {STORY_COLUMNS} FROM stories ORDER BY created_at DESC, id DESC"
        ))
    }

    fn query_stories(&self, sql: &str) -> Result<Vec<Story>> {
        self.with_transaction(|tx| {
            let mut stmt = tx.prepare(sql)?;
            let rows = stmt.query_map([], StoryRow::from_row)?;
            let mut stories = Vec::new();
            for row in rows {
                stories.push(row?.into_story()?);
            }
            Ok(stories)
        })
    }
}

/// Intermediate row struct for reading stories before parsing the status column.
struct StoryRow {
    id: i64,
    title: String,
    description: Option<String>,
    priority: i64,
    assignee: Option<String>,
    labels: Option<String>,
    acceptance_criteria: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl StoryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            priority: row.get(3)?,
            assignee: row.get(4)?,
            labels: row.get(5)?,
            acceptance_criteria: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_story(self) -> Result<Story> {
        Ok(Story {
            id: self.id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            assignee: self.assignee,
            labels: self.labels,
            acceptance_criteria: self.acceptance_criteria,
            status: StoryStatus::from_str(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
