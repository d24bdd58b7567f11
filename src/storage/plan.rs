//! Plan files
//!
//! A plan is a read-only TOML or YAML description of tasks, their
//! dependencies and the status each should be in. Loading a plan replays
//! it against a fresh [`TaskGraph`] through the public graph API, so a
//! plan that would break a graph invariant is rejected with the same
//! error the API returns.
//!
//! ```toml
//! [[tasks]]
//! key = "db"
//! title = "Setup Database"
//! assignee = "John"
//! priority = "high"
//! deadline = "2024-04-01"
//!
//! [[tasks]]
//! key = "api"
//! title = "Create API"
//! deadline = "2024-04-15T09:00"
//! depends_on = ["db"]
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{GraphError, Priority, TaskGraph, TaskId, TaskStatus, TaskUpdate};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to read plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse plan: {0}")]
    Parse(String),

    #[error("Task at position {0} has an empty key")]
    EmptyKey(usize),

    #[error("Duplicate task key: {0}")]
    DuplicateKey(String),

    #[error("Task '{task}' depends on unknown key '{key}'")]
    UnknownKey { task: String, key: String },

    #[error("Task '{key}' has an invalid deadline '{value}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])")]
    InvalidDeadline { key: String, value: String },

    #[error("Task '{key}': {source}")]
    Task {
        key: String,
        #[source]
        source: GraphError,
    },
}

/// One `[[tasks]]` entry as written in the file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlanTask {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub priority: Option<String>,
    pub deadline: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
}

/// Parsed, not yet validated plan file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
}

impl PlanFile {
    /// Parses TOML plan text
    pub fn from_toml(content: &str) -> Result<Self, PlanError> {
        toml::from_str(content).map_err(|e| PlanError::Parse(e.to_string()))
    }

    /// Parses YAML plan text
    pub fn from_yaml(content: &str) -> Result<Self, PlanError> {
        serde_yaml::from_str(content).map_err(|e| PlanError::Parse(e.to_string()))
    }

    /// Reads a plan file, picking the format from the extension
    /// (`.yaml`/`.yml` for YAML, anything else TOML)
    pub fn read(path: &Path) -> Result<Self, PlanError> {
        let content = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_toml(&content)
        }
    }
}

/// A task graph built from a plan, with the plan's keys
#[derive(Debug, Clone)]
pub struct Plan {
    graph: TaskGraph,
    ids: BTreeMap<String, TaskId>,
    keys: HashMap<TaskId, String>,
}

impl Plan {
    /// Reads and builds a plan file
    pub fn load(path: &Path, default_priority: Priority) -> Result<Self, PlanError> {
        let file = PlanFile::read(path)?;
        debug!(path = %path.display(), tasks = file.tasks.len(), "read plan");
        Self::build(file, default_priority)
    }

    /// Replays a plan against a fresh graph
    ///
    /// Tasks are created in file order, then edges are added, then each
    /// task is driven to its target status in dependency order.
    pub fn build(file: PlanFile, default_priority: Priority) -> Result<Self, PlanError> {
        let mut graph = TaskGraph::new();
        let mut ids: BTreeMap<String, TaskId> = BTreeMap::new();
        let mut keys: HashMap<TaskId, String> = HashMap::new();
        let mut targets: HashMap<TaskId, TaskStatus> = HashMap::new();

        for (index, entry) in file.tasks.iter().enumerate() {
            let key = entry.key.trim();
            if key.is_empty() {
                return Err(PlanError::EmptyKey(index + 1));
            }
            if ids.contains_key(key) {
                return Err(PlanError::DuplicateKey(key.to_string()));
            }

            let task_err = |source: GraphError| PlanError::Task {
                key: key.to_string(),
                source,
            };

            let priority = match &entry.priority {
                Some(p) => p.parse::<Priority>().map_err(task_err)?,
                None => default_priority,
            };
            let status = match &entry.status {
                Some(s) => s.parse::<TaskStatus>().map_err(task_err)?,
                None => TaskStatus::Pending,
            };
            let deadline =
                parse_deadline(&entry.deadline).ok_or_else(|| PlanError::InvalidDeadline {
                    key: key.to_string(),
                    value: entry.deadline.clone(),
                })?;

            let id = graph
                .create_task(&entry.title, &entry.assignee, priority, deadline)
                .map_err(task_err)?;

            let mut update = TaskUpdate::new();
            update.description = entry.description.clone();
            update.points = entry.points;
            if !update.is_empty() {
                graph.update_task(id, update).map_err(task_err)?;
            }

            ids.insert(key.to_string(), id);
            keys.insert(id, key.to_string());
            targets.insert(id, status);
        }

        for entry in &file.tasks {
            let key = entry.key.trim();
            let Some(&id) = ids.get(key) else {
                continue;
            };
            for dep_key in &entry.depends_on {
                let dep_id = *ids.get(dep_key.trim()).ok_or_else(|| PlanError::UnknownKey {
                    task: key.to_string(),
                    key: dep_key.clone(),
                })?;
                graph
                    .add_dependency(id, dep_id)
                    .map_err(|source| PlanError::Task {
                        key: key.to_string(),
                        source,
                    })?;
            }
        }

        for id in graph.topological_order() {
            let target = targets.get(&id).copied().unwrap_or_default();
            let steps: &[TaskStatus] = match target {
                TaskStatus::Pending => &[],
                TaskStatus::InProgress => &[TaskStatus::InProgress],
                TaskStatus::Blocked => &[TaskStatus::Blocked],
                TaskStatus::Done => &[TaskStatus::InProgress, TaskStatus::Done],
            };
            for step in steps {
                graph.set_status(id, *step).map_err(|source| PlanError::Task {
                    key: keys.get(&id).cloned().unwrap_or_else(|| id.to_string()),
                    source,
                })?;
            }
        }

        Ok(Self { graph, ids, keys })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Returns the id created for a plan key
    pub fn id_of(&self, key: &str) -> Option<TaskId> {
        self.ids.get(key).copied()
    }

    /// Returns the plan key of a task
    pub fn key_of(&self, id: TaskId) -> Option<&str> {
        self.keys.get(&id).map(String::as_str)
    }

    /// Resolves a plan key, or failing that a task id (`t-3`)
    pub fn resolve(&self, key_or_id: &str) -> Option<TaskId> {
        self.id_of(key_or_id.trim()).or_else(|| {
            key_or_id
                .parse::<TaskId>()
                .ok()
                .filter(|id| self.graph.contains(*id))
        })
    }
}

/// Parses `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS`
/// (a space may replace the `T`)
pub fn parse_deadline(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
