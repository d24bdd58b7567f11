//! Errors returned by task graph operations
//!
//! Every mutating operation either succeeds completely or returns one of
//! these variants with the graph left untouched.

use thiserror::Error;

use super::id::TaskId;
use super::task::TaskStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(TaskId),

    #[error("Adding dependency would create a cycle: {task} -> {dependency}")]
    CycleDetected { task: TaskId, dependency: TaskId },

    #[error("Invalid status transition for {task}: {from} -> {to}")]
    InvalidTransition {
        task: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Dependencies of {task} are not done: {}", format_ids(.unmet))]
    DependenciesUnmet { task: TaskId, unmet: Vec<TaskId> },
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
