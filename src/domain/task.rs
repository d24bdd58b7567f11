//! Task domain model
//!
//! Tasks are the units of work tracked by a [`TaskGraph`](super::TaskGraph).
//! They are only ever created and mutated through the graph, so the
//! fields here are crate-private and exposed through read-only accessors.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::error::GraphError;
use super::id::TaskId;

/// Task priority, ordered `Low < Medium < High`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Scheduling rank: lower ranks are scheduled first (`High` = 0)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(GraphError::InvalidArgument(format!(
                "unknown priority '{}' (expected low, medium or high)",
                other
            ))),
        }
    }
}

/// Status of a task
///
/// ```text
/// pending ──> in_progress ──> done
///    │  ^          │
///    v  │          │
///   blocked <──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Blocked,
    Done,
}

impl TaskStatus {
    /// Board column order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    /// Returns true if this status represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Returns true if `self -> next` is an allowed transition
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (InProgress, Done)
                | (Pending, Blocked)
                | (InProgress, Blocked)
                | (Blocked, Pending)
        )
    }

    /// Returns true if entering this status requires every dependency to be done
    pub fn requires_dependencies_done(&self) -> bool {
        matches!(self, TaskStatus::InProgress | TaskStatus::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" | "todo" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" => Ok(TaskStatus::Done),
            other => Err(GraphError::InvalidArgument(format!(
                "unknown status '{}' (expected pending, in_progress, blocked or done)",
                other
            ))),
        }
    }
}

/// A unit of work owned by a task graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) title: String,
    pub(crate) assignee: String,
    pub(crate) priority: Priority,
    pub(crate) deadline: NaiveDateTime,
    pub(crate) status: TaskStatus,

    /// Ids of tasks that must be done first
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub(crate) dependencies: BTreeSet<TaskId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,

    /// Story-point estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) points: Option<u32>,

    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        title: String,
        assignee: String,
        priority: Priority,
        deadline: NaiveDateTime,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            assignee,
            priority,
            deadline,
            status: TaskStatus::Pending,
            dependencies: BTreeSet::new(),
            description: None,
            points: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Empty when unassigned
    pub fn assignee(&self) -> &str {
        &self.assignee
    }

    pub fn is_assigned(&self) -> bool {
        !self.assignee.is_empty()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn deadline(&self) -> NaiveDateTime {
        self.deadline
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn dependencies(&self) -> &BTreeSet<TaskId> {
        &self.dependencies
    }

    pub fn depends_on(&self, other: TaskId) -> bool {
        self.dependencies.contains(&other)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn points(&self) -> Option<u32> {
        self.points
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Key used to break scheduling ties: priority rank, then id
    pub(crate) fn schedule_key(&self) -> (u8, TaskId) {
        (self.priority.rank(), self.id)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        if status.is_complete() {
            self.completed_at = Some(Utc::now());
        }
        self.touch();
    }
}

/// A partial edit of a task's descriptive fields
///
/// Fields left as `None` are kept as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub points: Option<u32>,
}

impl TaskUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    /// Returns true if the update changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks the update before anything is written
    pub(crate) fn validate(&self) -> Result<(), GraphError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(points) = self.points {
            task.points = Some(points);
        }
        task.touch();
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), GraphError> {
    if title.trim().is_empty() {
        return Err(GraphError::InvalidArgument(
            "task title must not be empty".to_string(),
        ));
    }
    Ok(())
}
