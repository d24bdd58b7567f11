//! Thread-safe handle around a [`TaskGraph`]
//!
//! Queries take the shared lock and mutations take the exclusive lock, so
//! the cycle check in `add_dependency` and the pruning in `remove_task`
//! always run against a consistent edge set.

use chrono::NaiveDateTime;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::error::GraphError;
use super::graph::TaskGraph;
use super::id::TaskId;
use super::task::{Priority, Task, TaskStatus, TaskUpdate};

/// Cloneable handle; every clone refers to the same graph
#[derive(Debug, Clone, Default)]
pub struct SharedTaskGraph {
    inner: Arc<RwLock<TaskGraph>>,
}

impl SharedTaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing graph
    pub fn from_graph(graph: TaskGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    // Graph mutations validate before writing; a poisoned graph is consistent.
    fn read(&self) -> RwLockReadGuard<'_, TaskGraph> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskGraph> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_task(
        &self,
        title: impl Into<String>,
        assignee: impl Into<String>,
        priority: Priority,
        deadline: NaiveDateTime,
    ) -> Result<TaskId, GraphError> {
        self.write().create_task(title, assignee, priority, deadline)
    }

    pub fn update_task(&self, task_id: TaskId, update: TaskUpdate) -> Result<(), GraphError> {
        self.write().update_task(task_id, update)
    }

    pub fn add_dependency(&self, task_id: TaskId, dependency_id: TaskId) -> Result<(), GraphError> {
        self.write().add_dependency(task_id, dependency_id)
    }

    pub fn remove_dependency(
        &self,
        task_id: TaskId,
        dependency_id: TaskId,
    ) -> Result<bool, GraphError> {
        self.write().remove_dependency(task_id, dependency_id)
    }

    pub fn remove_task(&self, task_id: TaskId) -> Result<Task, GraphError> {
        self.write().remove_task(task_id)
    }

    pub fn set_status(&self, task_id: TaskId, new_status: TaskStatus) -> Result<(), GraphError> {
        self.write().set_status(task_id, new_status)
    }

    pub fn topological_order(&self) -> Vec<TaskId> {
        self.read().topological_order()
    }

    pub fn ready_tasks(&self) -> Vec<TaskId> {
        self.read().ready_tasks()
    }

    /// Returns a copy of the task, never a reference into the locked graph
    pub fn get_task(&self, task_id: TaskId) -> Option<Task> {
        self.read().get_task(task_id).cloned()
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.read().list_tasks().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Runs a read-only closure against a consistent view of the graph
    pub fn with_graph<R>(&self, f: impl FnOnce(&TaskGraph) -> R) -> R {
        let graph = self.read();
        f(&*graph)
    }

    /// Takes a point-in-time copy of the whole graph
    pub fn snapshot(&self) -> TaskGraph {
        self.read().clone()
    }
}
