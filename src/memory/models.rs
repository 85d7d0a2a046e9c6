use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MemoryError;

pub const DEFAULT_STORY_PRIORITY: i64 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Todo,
    InProgress,
    Blocked,
    Completed,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Completed => "completed",
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl FromStr for StoryStatus {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "completed" => Ok(Self::Completed),
            _ => Err(MemoryError::InvalidStatus {
                entity: "story",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Trivial,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Trivial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        }
    }

    /// Display-priority bucket used to order open defects.
    ///
    /// `trivial` shares the default bucket (3) and therefore sorts ahead of
    /// `minor` (4). This is a display order, not a severity ordinal; it must
    /// agree with the `CASE` expression in the open-defect queries.
    pub fn display_rank(&self) -> i64 {
        match self {
            Self::Critical => 1,
            Self::Major => 2,
            Self::Minor => 4,
            Self::Trivial => 3,
        }
    }
}

impl FromStr for Severity {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "trivial" => Ok(Self::Trivial),
            _ => Err(MemoryError::InvalidSeverity(s.to_string())),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DefectStatus {
    Open,
    InProgress,
    Blocked,
    Resolved,
    Closed,
}

impl DefectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Resolved and closed defects carry a `resolved_at` stamp and leave open work.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl FromStr for DefectStatus {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(MemoryError::InvalidStatus {
                entity: "defect",
                value: s.to_string(),
            }),
        }
    }
}

// ── Stories ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: i64,
    pub assignee: Option<String>,
    pub labels: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub status: StoryStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewStory {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to 3 when unset.
    pub priority: Option<i64>,
    pub assignee: Option<String>,
    pub labels: Option<String>,
    pub acceptance_criteria: Option<String>,
}

impl NewStory {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

// ── Defects ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defect {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub detected_by: Option<String>,
    pub story_id: Option<i64>,
    pub status: DefectStatus,
    pub resolution: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDefect {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub detected_by: Option<String>,
    pub story_id: Option<i64>,
}

impl NewDefect {
    pub fn new(title: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: None,
            severity,
            detected_by: None,
            story_id: None,
        }
    }
}

/// A defect row left-joined to its linked story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectWithStory {
    pub id: i64,
    pub title: String,
    pub severity: Severity,
    pub status: DefectStatus,
    pub story_id: Option<i64>,
    pub story_title: Option<String>,
    pub story_status: Option<StoryStatus>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

// ── Landmines ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Landmine {
    pub id: i64,
    pub summary: String,
    pub cause: Option<String>,
    pub impact: Option<String>,
    pub detection: Option<String>,
    pub remediation: Option<String>,
    pub avoidance_rules: Option<String>,
    pub tags: Option<String>,
    pub solution_verification: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewLandmine {
    pub summary: String,
    pub cause: Option<String>,
    pub impact: Option<String>,
    pub detection: Option<String>,
    pub remediation: Option<String>,
    pub avoidance_rules: Option<String>,
    pub tags: Option<String>,
    pub solution_verification: Option<String>,
}

impl NewLandmine {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }
}

// ── Configuration ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigEntry {
    pub scope: String,
    pub name: String,
    pub value: String,
    pub source: String,
    pub notes: Option<String>,
    pub updated_at: String,
}

// ── Agent log ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAction {
    pub id: i64,
    pub agent: String,
    pub action: String,
    pub details: Option<String>,
    pub trace_id: Option<String>,
    pub parent_id: Option<i64>,
    pub started_at: String,
    /// `None` means the action never completed.
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAction {
    pub agent: String,
    pub action: String,
    pub details: Option<String>,
    pub trace_id: Option<String>,
    pub parent_id: Option<i64>,
}

impl NewAction {
    pub fn new(agent: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

// ── Views ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    Story,
    Defect,
}

impl WorkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Defect => "defect",
        }
    }
}

impl FromStr for WorkKind {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "story" => Ok(Self::Story),
            "defect" => Ok(Self::Defect),
            _ => Err(MemoryError::InvalidWorkKind(s.to_string())),
        }
    }
}

/// One row of the open-work union. For defects `priority` holds the
/// severity display rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWorkItem {
    pub kind: WorkKind,
    pub id: i64,
    pub title: String,
    pub status: String,
    pub priority: i64,
    pub assignee: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_round_trips_through_strings() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_str(severity.as_str()).unwrap(), severity);
        }
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let err = Severity::from_str("blocker").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidSeverity(ref s) if s == "blocker"));
    }

    #[test]
    fn test_trivial_ranks_between_major_and_minor() {
        let mut ranked = Severity::ALL.to_vec();
        ranked.sort_by_key(|s| s.display_rank());
        assert_eq!(
            ranked,
            vec![
                Severity::Critical,
                Severity::Major,
                Severity::Trivial,
                Severity::Minor
            ]
        );
    }

    #[test]
    fn test_defect_terminal_states() {
        assert!(DefectStatus::Resolved.is_terminal());
        assert!(DefectStatus::Closed.is_terminal());
        assert!(!DefectStatus::Open.is_terminal());
        assert!(!DefectStatus::InProgress.is_terminal());
        assert!(!DefectStatus::Blocked.is_terminal());
    }

    #[test]
    fn test_story_status_parsing() {
        assert_eq!(StoryStatus::from_str("in_progress").unwrap(), StoryStatus::InProgress);
        assert!(StoryStatus::from_str("done").is_err());
        assert!(!StoryStatus::Completed.is_open());
        assert!(StoryStatus::Blocked.is_open());
    }

    #[test]
    fn test_work_kind_parsing() {
        assert_eq!(WorkKind::from_str("story").unwrap(), WorkKind::Story);
        assert_eq!(WorkKind::from_str("defect").unwrap(), WorkKind::Defect);
        let err = WorkKind::from_str("epic").unwrap_err();
        assert!(matches!(err, MemoryError::InvalidWorkKind(ref k) if k == "epic"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&DefectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_new_action_builder() {
        let action = NewAction::new("Clide", "boot")
            .details("Loading context")
            .trace_id("abc")
            .parent(7);
        assert_eq!(action.agent, "Clide");
        assert_eq!(action.details.as_deref(), Some("Loading context"));
        assert_eq!(action.trace_id.as_deref(), Some("abc"));
        assert_eq!(action.parent_id, Some(7));
    }
}
