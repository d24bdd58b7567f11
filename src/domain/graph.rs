//! Dependency graph for tasks
//!
//! [`TaskGraph`] owns every task and every dependency edge. Edges are
//! stored id-to-id, both on the dependent task and in a petgraph edge
//! index used for reachability (cycle detection) and dependents lookup.
//!
//! Edge direction in the index is `dependency -> dependent`, meaning
//! "dependency must be done before dependent".
//!
//! Invariants held after every call:
//! - every dependency id refers to a task in the graph
//! - the dependency relation is acyclic
//! - ids are never reused
//! - a failed call leaves the graph exactly as it was

use chrono::{DateTime, NaiveDateTime, Utc};
use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use tracing::debug;

use super::error::GraphError;
use super::id::TaskId;
use super::task::{validate_title, Priority, Task, TaskStatus, TaskUpdate};

/// One kanban column: every task currently in `status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<TaskId>,
}

/// Completed work rolled up for one assignee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeSummary {
    pub assignee: String,
    /// Story points over done tasks; tasks without an estimate count 0
    pub points: u32,
    pub completed: usize,
    pub assigned: usize,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl AssigneeSummary {
    fn new(assignee: &str) -> Self {
        Self {
            assignee: assignee.to_string(),
            points: 0,
            completed: 0,
            assigned: 0,
            last_completed_at: None,
        }
    }
}

/// The task store and its dependency edges
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskId, Task>,

    /// Edge index: dependency -> dependent
    edges: DiGraphMap<TaskId, ()>,

    /// Next sequence to hand out
    next_id: u64,
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGraph {
    /// Creates an empty task graph
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            edges: DiGraphMap::new(),
            next_id: 1,
        }
    }

    /// Creates a pending task with no dependencies and returns its id
    pub fn create_task(
        &mut self,
        title: impl Into<String>,
        assignee: impl Into<String>,
        priority: Priority,
        deadline: NaiveDateTime,
    ) -> Result<TaskId, GraphError> {
        let title = title.into();
        validate_title(&title)?;

        let id = TaskId::from_sequence(self.next_id);
        self.next_id += 1;

        let task = Task::new(
            id,
            title.trim().to_string(),
            assignee.into(),
            priority,
            deadline,
        );
        debug!(task = %id, title = %task.title, %priority, "created task");

        self.edges.add_node(id);
        self.tasks.insert(id, task);
        Ok(id)
    }

    /// Edits a task's descriptive fields
    pub fn update_task(&mut self, task_id: TaskId, update: TaskUpdate) -> Result<(), GraphError> {
        update.validate()?;
        let task = self.task_mut(task_id)?;
        update.apply(task);
        debug!(task = %task_id, "updated task");
        Ok(())
    }

    /// Declares that `task_id` depends on `dependency_id`
    ///
    /// Re-adding an existing edge is a no-op. Fails without touching the
    /// graph if either task is unknown, if the ids are equal, or if
    /// `task_id` is already reachable from `dependency_id` through
    /// existing dependencies (the new edge would close a cycle).
    pub fn add_dependency(
        &mut self,
        task_id: TaskId,
        dependency_id: TaskId,
    ) -> Result<(), GraphError> {
        self.ensure_exists(task_id)?;
        self.ensure_exists(dependency_id)?;

        if task_id == dependency_id {
            return Err(GraphError::SelfDependency(task_id));
        }

        if self.edges.contains_edge(dependency_id, task_id) {
            return Ok(());
        }

        // A path task -> ... -> dependency in the index means the
        // dependency already (transitively) waits on the task.
        if has_path_connecting(&self.edges, task_id, dependency_id, None) {
            debug!(task = %task_id, dependency = %dependency_id, "rejected cyclic dependency");
            return Err(GraphError::CycleDetected {
                task: task_id,
                dependency: dependency_id,
            });
        }

        let task = self.task_mut(task_id)?;
        task.dependencies.insert(dependency_id);
        task.touch();
        self.edges.add_edge(dependency_id, task_id, ());

        debug!(task = %task_id, dependency = %dependency_id, "added dependency");
        Ok(())
    }

    /// Removes a dependency edge, returning whether it existed
    pub fn remove_dependency(
        &mut self,
        task_id: TaskId,
        dependency_id: TaskId,
    ) -> Result<bool, GraphError> {
        self.ensure_exists(task_id)?;
        self.ensure_exists(dependency_id)?;

        if self.edges.remove_edge(dependency_id, task_id).is_none() {
            return Ok(false);
        }

        let task = self.task_mut(task_id)?;
        task.dependencies.remove(&dependency_id);
        task.touch();

        debug!(task = %task_id, dependency = %dependency_id, "removed dependency");
        Ok(true)
    }

    /// Removes a task and strips it from every dependent's dependency set
    pub fn remove_task(&mut self, task_id: TaskId) -> Result<Task, GraphError> {
        let task = self
            .tasks
            .remove(&task_id)
            .ok_or(GraphError::UnknownTask(task_id))?;

        let dependents: Vec<TaskId> = self
            .edges
            .neighbors_directed(task_id, Direction::Outgoing)
            .collect();

        for dependent in &dependents {
            if let Some(other) = self.tasks.get_mut(dependent) {
                other.dependencies.remove(&task_id);
                other.touch();
            }
        }
        self.edges.remove_node(task_id);

        debug!(task = %task_id, pruned = dependents.len(), "removed task");
        Ok(task)
    }

    /// Moves a task to `new_status`
    ///
    /// The transition must be allowed by [`TaskStatus::can_transition_to`];
    /// entering `in_progress` or `done` also requires every dependency to
    /// be `done`.
    pub fn set_status(&mut self, task_id: TaskId, new_status: TaskStatus) -> Result<(), GraphError> {
        let task = self.get_task(task_id).ok_or(GraphError::UnknownTask(task_id))?;
        let from = task.status;

        if !from.can_transition_to(new_status) {
            return Err(GraphError::InvalidTransition {
                task: task_id,
                from,
                to: new_status,
            });
        }

        if new_status.requires_dependencies_done() {
            let unmet = self.unmet_dependencies(task);
            if !unmet.is_empty() {
                return Err(GraphError::DependenciesUnmet {
                    task: task_id,
                    unmet,
                });
            }
        }

        self.task_mut(task_id)?.set_status(new_status);
        debug!(task = %task_id, %from, to = %new_status, "status changed");
        Ok(())
    }

    /// Returns every task id ordered so that each task follows all of its
    /// dependencies
    ///
    /// Among tasks whose dependencies are all scheduled, higher priority
    /// goes first, then lower id.
    pub fn topological_order(&self) -> Vec<TaskId> {
        let mut remaining: HashMap<TaskId, usize> = self
            .tasks
            .values()
            .map(|task| (task.id, task.dependencies.len()))
            .collect();

        let mut ready: BinaryHeap<Reverse<(u8, TaskId)>> = self
            .tasks
            .values()
            .filter(|task| task.dependencies.is_empty())
            .map(|task| Reverse(task.schedule_key()))
            .collect();

        let mut order = Vec::with_capacity(self.tasks.len());
        while let Some(Reverse((_, task_id))) = ready.pop() {
            order.push(task_id);

            for dependent in self.edges.neighbors_directed(task_id, Direction::Outgoing) {
                let Some(count) = remaining.get_mut(&dependent) else {
                    continue;
                };
                *count -= 1;
                if *count == 0 {
                    if let Some(task) = self.tasks.get(&dependent) {
                        ready.push(Reverse(task.schedule_key()));
                    }
                }
            }
        }

        debug_assert_eq!(order.len(), self.tasks.len(), "dependency graph has a cycle");
        order
    }

    /// Pending tasks whose dependencies are all done, in schedule order
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        self.topological_order()
            .into_iter()
            .filter(|id| {
                self.tasks.get(id).is_some_and(|task| {
                    task.status == TaskStatus::Pending && self.unmet_dependencies(task).is_empty()
                })
            })
            .collect()
    }

    /// Unfinished tasks with at least one dependency not yet done, paired
    /// with those dependencies, in schedule order
    pub fn blocked_tasks(&self) -> Vec<(TaskId, Vec<TaskId>)> {
        self.topological_order()
            .into_iter()
            .filter_map(|id| {
                let task = self.tasks.get(&id)?;
                if task.status.is_complete() {
                    return None;
                }
                let unmet = self.unmet_dependencies(task);
                (!unmet.is_empty()).then_some((id, unmet))
            })
            .collect()
    }

    /// Groups tasks by status, one column per status
    ///
    /// Columns come in `pending, in_progress, blocked, done` order; tasks
    /// within a column are sorted by priority (high first), then id.
    pub fn board(&self) -> Vec<Column> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| {
                let mut tasks: Vec<&Task> =
                    self.tasks.values().filter(|t| t.status == status).collect();
                tasks.sort_by_key(|t| t.schedule_key());
                Column {
                    status,
                    tasks: tasks.into_iter().map(|t| t.id).collect(),
                }
            })
            .collect()
    }

    /// Per-assignee KPIs, ordered by assignee
    ///
    /// Every assignee with at least one task gets an entry, even with
    /// nothing done yet. Unassigned tasks are left out.
    pub fn assignee_summary(&self) -> Vec<AssigneeSummary> {
        let mut summaries: BTreeMap<&str, AssigneeSummary> = BTreeMap::new();
        for task in self.tasks.values().filter(|t| t.is_assigned()) {
            let summary = summaries
                .entry(task.assignee.as_str())
                .or_insert_with(|| AssigneeSummary::new(&task.assignee));
            summary.assigned += 1;
            if !task.status.is_complete() {
                continue;
            }
            summary.completed += 1;
            summary.points = summary.points.saturating_add(task.points.unwrap_or(0));
            summary.last_completed_at = summary.last_completed_at.max(task.completed_at);
        }
        summaries.into_values().collect()
    }

    /// Returns the direct dependencies of a task
    pub fn dependencies(&self, task_id: TaskId) -> Vec<TaskId> {
        self.tasks
            .get(&task_id)
            .map(|task| task.dependencies.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the direct dependents of a task (tasks that depend on it)
    pub fn dependents(&self, task_id: TaskId) -> Vec<TaskId> {
        if !self.edges.contains_node(task_id) {
            return vec![];
        }
        let mut dependents: Vec<TaskId> = self
            .edges
            .neighbors_directed(task_id, Direction::Outgoing)
            .collect();
        dependents.sort();
        dependents
    }

    pub fn get_task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// Iterates over all tasks in ascending id order
    pub fn list_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.tasks.contains_key(&task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    fn unmet_dependencies(&self, task: &Task) -> Vec<TaskId> {
        task.dependencies
            .iter()
            .copied()
            .filter(|dep| {
                !self
                    .tasks
                    .get(dep)
                    .is_some_and(|dep_task| dep_task.status.is_complete())
            })
            .collect()
    }

    fn ensure_exists(&self, task_id: TaskId) -> Result<(), GraphError> {
        if self.tasks.contains_key(&task_id) {
            Ok(())
        } else {
            Err(GraphError::UnknownTask(task_id))
        }
    }

    fn task_mut(&mut self, task_id: TaskId) -> Result<&mut Task, GraphError> {
        self.tasks
            .get_mut(&task_id)
            .ok_or(GraphError::UnknownTask(task_id))
    }
}
